use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{Listing, ListingId, UserId};
use super::error::{AuthorizationError, ContactPrecondition, ListingError};
use super::repository::{ContactAttemptLog, ListingRepository};
use super::visibility::resolve;
use crate::config::ContactConfig;

/// External messaging application a handoff deep-links into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagingChannel {
    #[default]
    #[serde(alias = "whats_app")]
    WhatsApp,
    Sms,
}

impl MessagingChannel {
    pub const fn label(self) -> &'static str {
        match self {
            MessagingChannel::WhatsApp => "whatsapp",
            MessagingChannel::Sms => "sms",
        }
    }

    /// Channel address for an already-normalized phone number.
    pub fn deep_link(self, target: &str, message: &str) -> String {
        let encoded = urlencoding::encode(message);
        match self {
            MessagingChannel::WhatsApp => format!("https://wa.me/{target}?text={encoded}"),
            MessagingChannel::Sms => format!("sms:+{target}?body={encoded}"),
        }
    }
}

impl fmt::Display for MessagingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MessagingChannel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "whatsapp" | "whats_app" => Ok(Self::WhatsApp),
            "sms" => Ok(Self::Sms),
            other => Err(format!("unknown messaging channel '{other}'")),
        }
    }
}

/// Audit record of a prepared (not delivered) outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageAttempt {
    pub id: String,
    pub listing_id: ListingId,
    pub listing_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    pub channel: MessagingChannel,
    pub target: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Payload the UI opens in the external messaging app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactHandoffResult {
    pub attempt_id: String,
    pub channel: MessagingChannel,
    pub target: String,
    pub message: String,
    pub deep_link: String,
}

/// Digits only, which is what channel addresses expect.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn render_message(listing_title: &str, platform_name: &str) -> String {
    format!(
        "Hi! I'm interested in your listing \"{listing_title}\". I found it on {platform_name}. Can we discuss the details?"
    )
}

/// Prepares outbound contact payloads and records each successful attempt.
pub struct ContactHandoff<L, M> {
    listings: Arc<L>,
    log: Arc<M>,
    config: ContactConfig,
}

impl<L, M> ContactHandoff<L, M>
where
    L: ListingRepository + 'static,
    M: ContactAttemptLog + 'static,
{
    pub fn new(listings: Arc<L>, log: Arc<M>, config: ContactConfig) -> Self {
        Self {
            listings,
            log,
            config,
        }
    }

    pub fn initiate(
        &self,
        listing: &Listing,
        viewer: Option<&UserId>,
        channel: Option<MessagingChannel>,
    ) -> Result<ContactHandoffResult, ListingError> {
        let contact = resolve(listing, viewer);
        if !contact.can_message {
            warn!(listing_id = %listing.id, "contact refused: messaging disabled");
            return Err(ContactPrecondition::MessagingDisabled(listing.id.clone()).into());
        }

        let target = listing
            .lister
            .phone
            .as_deref()
            .map(normalize_phone)
            .filter(|digits| !digits.is_empty())
            .ok_or_else(|| {
                warn!(listing_id = %listing.id, "contact refused: no phone on file");
                ContactPrecondition::MissingPhone(listing.id.clone())
            })?;

        let channel = channel.unwrap_or(self.config.default_channel);
        let message = render_message(&listing.title, &self.config.platform_name);
        let deep_link = channel.deep_link(&target, &message);

        let attempt = ContactMessageAttempt {
            id: uuid::Uuid::new_v4().to_string(),
            listing_id: listing.id.clone(),
            listing_title: listing.title.clone(),
            sender_id: viewer.cloned(),
            channel,
            target: target.clone(),
            message: message.clone(),
            sent_at: Utc::now(),
        };
        let attempt_id = attempt.id.clone();
        self.log.record_attempt(attempt)?;
        info!(listing_id = %listing.id, %channel, "contact handoff prepared");

        Ok(ContactHandoffResult {
            attempt_id,
            channel,
            target,
            message,
            deep_link,
        })
    }

    pub fn initiate_for(
        &self,
        listing_id: &ListingId,
        viewer: Option<&UserId>,
        channel: Option<MessagingChannel>,
    ) -> Result<ContactHandoffResult, ListingError> {
        let listing = self.fetch(listing_id)?;
        self.initiate(&listing, viewer, channel)
    }

    /// Past attempts for a listing, newest first. Only the owner may read them.
    pub fn history(
        &self,
        caller: Option<&UserId>,
        listing_id: &ListingId,
    ) -> Result<Vec<ContactMessageAttempt>, ListingError> {
        let caller = caller.ok_or(AuthorizationError::Anonymous {
            action: "view contact history",
        })?;
        let listing = self.fetch(listing_id)?;
        if listing.user_id != *caller {
            return Err(AuthorizationError::NotOwner {
                listing_id: listing_id.clone(),
                action: "view contact history of",
            }
            .into());
        }
        Ok(self.log.attempts_for_listing(listing_id)?)
    }

    fn fetch(&self, listing_id: &ListingId) -> Result<Listing, ListingError> {
        self.listings
            .fetch(listing_id)?
            .ok_or_else(|| ListingError::NotFound(listing_id.clone()))
    }
}
