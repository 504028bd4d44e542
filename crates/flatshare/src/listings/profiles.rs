use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ContactVisibility, GenderPreference, ListerContact, UserId};
use super::error::{AuthorizationError, ListingError};
use super::filter::ListingFilter;
use super::repository::ProfileRepository;

/// Self-described gender on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer-not-to-say",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            "prefer-not-to-say" => Ok(Self::PreferNotToSay),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profession {
    Student,
    Professional,
    SelfEmployed,
    Other,
}

impl Profession {
    pub const fn label(self) -> &'static str {
        match self {
            Profession::Student => "student",
            Profession::Professional => "professional",
            Profession::SelfEmployed => "self-employed",
            Profession::Other => "other",
        }
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Profession {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "student" => Ok(Self::Student),
            "professional" => Ok(Self::Professional),
            "self-employed" => Ok(Self::SelfEmployed),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown profession '{other}'")),
        }
    }
}

/// What a seeker is looking for. Seeds their default search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<GenderPreference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rent: Option<u32>,
}

impl SearchPreferences {
    pub fn to_filter(&self) -> ListingFilter {
        ListingFilter {
            gender_preference: self.gender_preference,
            max_rent: self.max_rent.filter(|rent| *rent > 0),
            ..ListingFilter::default()
        }
    }
}

/// Global profile of a marketplace user, including their contact privacy switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<Profession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub contact_visibility: ContactVisibility,
    #[serde(default)]
    pub preferences: SearchPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Copy of the fields a listing carries about its lister.
    pub fn contact_snapshot(&self) -> ListerContact {
        let name = if self.name.trim().is_empty() {
            ListerContact::ANONYMOUS_NAME.to_string()
        } else {
            self.name.clone()
        };

        ListerContact {
            name,
            phone: self.phone.clone(),
            email: self.email.clone(),
            visibility: self.contact_visibility,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub profession: Option<Profession>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub contact_visibility: Option<ContactVisibility>,
    #[serde(default)]
    pub preferences: Option<SearchPreferences>,
}

/// Reads and edits user profiles. Edits never touch published listings; see
/// `ListingStore::resync_contact`.
pub struct ProfileDirectory<P> {
    profiles: Arc<P>,
}

impl<P> ProfileDirectory<P>
where
    P: ProfileRepository + 'static,
{
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, user_id: &UserId) -> Result<UserProfile, ListingError> {
        self.profiles
            .fetch_profile(user_id)?
            .ok_or_else(|| ListingError::UserNotFound(user_id.clone()))
    }

    /// Create or update the caller's own profile.
    pub fn upsert(
        &self,
        caller: Option<&UserId>,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, ListingError> {
        let caller = caller.ok_or(AuthorizationError::Anonymous {
            action: "edit a profile",
        })?;
        if caller != user_id {
            return Err(AuthorizationError::ForeignProfile(user_id.clone()).into());
        }

        let now = Utc::now();
        let mut profile = match self.profiles.fetch_profile(user_id)? {
            Some(existing) => existing,
            None => UserProfile {
                id: user_id.clone(),
                name: ListerContact::ANONYMOUS_NAME.to_string(),
                email: None,
                phone: None,
                gender: None,
                profession: None,
                bio: None,
                contact_visibility: ContactVisibility::default(),
                preferences: SearchPreferences::default(),
                created_at: now,
                updated_at: now,
            },
        };

        let ProfileUpdate {
            name,
            email,
            phone,
            gender,
            profession,
            bio,
            contact_visibility,
            preferences,
        } = update;
        if let Some(name) = name {
            profile.name = name;
        }
        if let Some(email) = email {
            profile.email = Some(email).filter(|value| !value.trim().is_empty());
        }
        if let Some(phone) = phone {
            profile.phone = Some(phone).filter(|value| !value.trim().is_empty());
        }
        if let Some(gender) = gender {
            profile.gender = Some(gender);
        }
        if let Some(profession) = profession {
            profile.profession = Some(profession);
        }
        if let Some(bio) = bio {
            profile.bio = Some(bio).filter(|value| !value.trim().is_empty());
        }
        if let Some(visibility) = contact_visibility {
            profile.contact_visibility = visibility;
        }
        if let Some(preferences) = preferences {
            profile.preferences = preferences;
        }
        profile.updated_at = now;

        let stored = self.profiles.upsert_profile(profile)?;
        info!(user_id = %stored.id, "profile updated");
        Ok(stored)
    }

    /// Snapshot for a new or re-synced listing. Users without a profile publish
    /// anonymously with every channel visible.
    pub fn contact_snapshot(&self, user_id: &UserId) -> Result<ListerContact, ListingError> {
        Ok(self
            .profiles
            .fetch_profile(user_id)?
            .map(|profile| profile.contact_snapshot())
            .unwrap_or_else(ListerContact::anonymous))
    }

    /// Search seeded from the user's saved preferences; users without a profile
    /// start from an unrestricted filter.
    pub fn default_filter(&self, user_id: &UserId) -> Result<ListingFilter, ListingError> {
        Ok(self
            .profiles
            .fetch_profile(user_id)?
            .map(|profile| profile.preferences.to_filter())
            .unwrap_or_default())
    }
}
