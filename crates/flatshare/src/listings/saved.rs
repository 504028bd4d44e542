use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{Listing, ListingId, UserId};
use super::error::ListingError;
use super::repository::{ListingRepository, RepositoryError, SavedListingRepository};

/// Bookmark edge between a user and a listing they saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedListing {
    pub user_id: UserId,
    pub listing_id: ListingId,
    pub saved_at: DateTime<Utc>,
}

/// Many-to-many bookmarks between users and listings.
pub struct SavedListingRegistry<L, S> {
    listings: Arc<L>,
    saved: Arc<S>,
}

impl<L, S> SavedListingRegistry<L, S>
where
    L: ListingRepository + 'static,
    S: SavedListingRepository + 'static,
{
    pub fn new(listings: Arc<L>, saved: Arc<S>) -> Self {
        Self { listings, saved }
    }

    /// Idempotent; saving twice leaves a single edge.
    pub fn save(&self, user_id: &UserId, listing_id: &ListingId) -> Result<(), ListingError> {
        if self.listings.fetch(listing_id)?.is_none() {
            return Err(ListingError::NotFound(listing_id.clone()));
        }

        let created = self
            .saved
            .save_edge(SavedListing {
                user_id: user_id.clone(),
                listing_id: listing_id.clone(),
                saved_at: Utc::now(),
            })
            .map_err(|err| match err {
                RepositoryError::NotFound => ListingError::NotFound(listing_id.clone()),
                other => other.into(),
            })?;
        if created {
            info!(user_id = %user_id, listing_id = %listing_id, "listing saved");
        } else {
            debug!(user_id = %user_id, listing_id = %listing_id, "listing already saved");
        }
        Ok(())
    }

    /// Idempotent; unsaving something that was never saved succeeds.
    pub fn unsave(&self, user_id: &UserId, listing_id: &ListingId) -> Result<(), ListingError> {
        if self.saved.remove_edge(user_id, listing_id)? {
            info!(user_id = %user_id, listing_id = %listing_id, "listing unsaved");
        }
        Ok(())
    }

    /// False for edges whose listing has gone away, matching what `list` returns.
    pub fn is_saved(&self, user_id: &UserId, listing_id: &ListingId) -> Result<bool, ListingError> {
        let has_edge = self
            .saved
            .edges_for_user(user_id)?
            .iter()
            .any(|edge| edge.listing_id == *listing_id);
        if !has_edge {
            return Ok(false);
        }
        Ok(self.listings.fetch(listing_id)?.is_some())
    }

    /// Current listing records for the user's bookmarks, most recently saved first.
    /// Edges whose listing has gone away are skipped.
    pub fn list(&self, user_id: &UserId) -> Result<Vec<Listing>, ListingError> {
        let mut edges = self.saved.edges_for_user(user_id)?;
        edges.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));

        let mut listings = Vec::with_capacity(edges.len());
        for edge in edges {
            match self.listings.fetch(&edge.listing_id)? {
                Some(listing) => listings.push(listing),
                None => warn!(
                    user_id = %user_id,
                    listing_id = %edge.listing_id,
                    "skipping saved edge for deleted listing"
                ),
            }
        }
        Ok(listings)
    }
}
