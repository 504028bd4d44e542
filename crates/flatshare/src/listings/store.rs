use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{Listing, ListingId, ListingPatch, NewListing, UserId};
use super::error::{AuthorizationError, ListingError};
use super::filter::{filter_listings, sort_listings, ListingQuery};
use super::profiles::ProfileDirectory;
use super::repository::{ListingRepository, ProfileRepository, SavedListingRepository};
use super::validation::{validate_new_listing, validate_patch};
use crate::config::ListingConfig;

/// Owner-checked CRUD over listings plus filtered search.
pub struct ListingStore<L, S, P> {
    listings: Arc<L>,
    saved: Arc<S>,
    profiles: ProfileDirectory<P>,
    config: ListingConfig,
}

impl<L, S, P> ListingStore<L, S, P>
where
    L: ListingRepository + 'static,
    S: SavedListingRepository + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(listings: Arc<L>, saved: Arc<S>, profiles: Arc<P>, config: ListingConfig) -> Self {
        Self {
            listings,
            saved,
            profiles: ProfileDirectory::new(profiles),
            config,
        }
    }

    /// Publish a listing owned by `caller`, snapshotting their current contact profile.
    pub fn create(
        &self,
        caller: Option<&UserId>,
        input: NewListing,
    ) -> Result<Listing, ListingError> {
        let owner = caller.ok_or(AuthorizationError::Anonymous {
            action: "publish a listing",
        })?;
        validate_new_listing(&input)?;

        let lister = self.profiles.contact_snapshot(owner)?;
        let now = Utc::now();
        let NewListing {
            title,
            description,
            location,
            rent_amount,
            number_of_flatmates,
            gender_preference,
            amenities,
            is_available,
        } = input;

        let listing = Listing {
            id: ListingId::generate(),
            user_id: owner.clone(),
            lister,
            title,
            description,
            location,
            rent_amount,
            number_of_flatmates,
            gender_preference,
            amenities,
            is_available,
            created_at: now,
            updated_at: now,
        };

        let stored = self.listings.insert(listing)?;
        info!(listing_id = %stored.id, owner = %stored.user_id, "listing published");
        Ok(stored)
    }

    pub fn get(&self, id: &ListingId) -> Result<Listing, ListingError> {
        self.listings
            .fetch(id)?
            .ok_or_else(|| ListingError::NotFound(id.clone()))
    }

    /// Merge the supplied fields into an owned listing. Last write wins.
    pub fn update(
        &self,
        caller: Option<&UserId>,
        id: &ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, ListingError> {
        self.require_caller(caller, "edit a listing")?;
        validate_patch(&patch)?;

        let mut listing = self.owned_listing(caller, id, "edit")?;
        patch.apply(&mut listing);
        listing.updated_at = Utc::now();

        let stored = self.listings.update(listing)?;
        info!(listing_id = %stored.id, "listing updated");
        Ok(stored)
    }

    pub fn set_availability(
        &self,
        caller: Option<&UserId>,
        id: &ListingId,
        is_available: bool,
    ) -> Result<Listing, ListingError> {
        self.require_caller(caller, "change availability")?;

        let mut listing = self.owned_listing(caller, id, "change availability of")?;
        listing.is_available = is_available;
        listing.updated_at = Utc::now();

        let stored = self.listings.update(listing)?;
        info!(listing_id = %stored.id, is_available, "listing availability changed");
        Ok(stored)
    }

    /// Re-copy the owner's current profile onto the listing's contact snapshot.
    pub fn resync_contact(
        &self,
        caller: Option<&UserId>,
        id: &ListingId,
    ) -> Result<Listing, ListingError> {
        self.require_caller(caller, "re-sync contact details")?;

        let mut listing = self.owned_listing(caller, id, "re-sync contact details of")?;
        listing.lister = self.profiles.contact_snapshot(&listing.user_id)?;
        listing.updated_at = Utc::now();

        let stored = self.listings.update(listing)?;
        info!(listing_id = %stored.id, "listing contact snapshot re-synced");
        Ok(stored)
    }

    /// Owner-only delete that also drops every saved edge pointing at the listing.
    /// Deleting a listing that no longer exists is a no-op.
    pub fn delete(&self, caller: Option<&UserId>, id: &ListingId) -> Result<(), ListingError> {
        self.require_caller(caller, "delete a listing")?;

        let listing = match self.listings.fetch(id)? {
            Some(listing) => listing,
            None => {
                debug!(listing_id = %id, "delete requested for missing listing");
                return Ok(());
            }
        };
        if !listing.is_owned_by(caller) {
            return Err(AuthorizationError::NotOwner {
                listing_id: id.clone(),
                action: "delete",
            }
            .into());
        }

        self.listings.delete(id)?;
        let removed_edges = self.saved.remove_edges_for_listing(id)?;
        info!(listing_id = %id, removed_edges, "listing deleted");
        Ok(())
    }

    pub fn list(&self, query: &ListingQuery) -> Result<Vec<Listing>, ListingError> {
        let mut listings = filter_listings(self.listings.all()?, &query.filter);
        sort_listings(&mut listings, query.order);
        listings.truncate(self.effective_limit(query.limit));
        debug!(results = listings.len(), "listing search evaluated");
        Ok(listings)
    }

    pub fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, ListingError> {
        Ok(self.listings.by_owner(user_id)?)
    }

    fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size)
    }

    fn require_caller(
        &self,
        caller: Option<&UserId>,
        action: &'static str,
    ) -> Result<(), ListingError> {
        match caller {
            Some(_) => Ok(()),
            None => Err(AuthorizationError::Anonymous { action }.into()),
        }
    }

    fn owned_listing(
        &self,
        caller: Option<&UserId>,
        id: &ListingId,
        action: &'static str,
    ) -> Result<Listing, ListingError> {
        let listing = self.get(id)?;
        if !listing.is_owned_by(caller) {
            return Err(AuthorizationError::NotOwner {
                listing_id: id.clone(),
                action,
            }
            .into());
        }
        Ok(listing)
    }
}
