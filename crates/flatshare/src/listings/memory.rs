use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Listing, ListingId, UserId};
use super::handoff::ContactMessageAttempt;
use super::profiles::UserProfile;
use super::repository::{
    ContactAttemptLog, ListingRepository, ProfileRepository, RepositoryError,
    SavedListingRepository,
};
use super::saved::SavedListing;
use super::schema::{ContactMessageRow, ListingRow, ProfileRow, SavedListingRow};

/// Process-local storage collaborator. Records are kept as physical rows in insertion
/// order, and each operation runs inside one critical section.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    listings: Vec<ListingRow>,
    saved: Vec<SavedListingRow>,
    messages: Vec<ContactMessageRow>,
    profiles: HashMap<String, ProfileRow>,
}

impl InMemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn saved_edge_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.saved.len())
    }
}

impl ListingRepository for InMemoryStore {
    fn insert(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        let mut state = self.lock()?;
        if state.listings.iter().any(|row| row.id == listing.id.0) {
            return Err(RepositoryError::Conflict);
        }
        state.listings.push(ListingRow::from(&listing));
        Ok(listing)
    }

    fn update(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        let mut state = self.lock()?;
        let slot = state
            .listings
            .iter_mut()
            .find(|row| row.id == listing.id.0)
            .ok_or(RepositoryError::NotFound)?;
        *slot = ListingRow::from(&listing);
        Ok(listing)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let state = self.lock()?;
        state
            .listings
            .iter()
            .find(|row| row.id == id.0)
            .map(|row| Listing::try_from(row.clone()).map_err(RepositoryError::from))
            .transpose()
    }

    fn delete(&self, id: &ListingId) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        let before = state.listings.len();
        state.listings.retain(|row| row.id != id.0);
        Ok(state.listings.len() != before)
    }

    fn all(&self) -> Result<Vec<Listing>, RepositoryError> {
        let state = self.lock()?;
        state
            .listings
            .iter()
            .rev()
            .map(|row| Listing::try_from(row.clone()).map_err(RepositoryError::from))
            .collect()
    }

    fn by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, RepositoryError> {
        let state = self.lock()?;
        state
            .listings
            .iter()
            .rev()
            .filter(|row| row.user_id == user_id.0)
            .map(|row| Listing::try_from(row.clone()).map_err(RepositoryError::from))
            .collect()
    }
}

impl SavedListingRepository for InMemoryStore {
    fn save_edge(&self, edge: SavedListing) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        if !state.listings.iter().any(|row| row.id == edge.listing_id.0) {
            return Err(RepositoryError::NotFound);
        }
        let exists = state
            .saved
            .iter()
            .any(|row| row.user_id == edge.user_id.0 && row.listing_id == edge.listing_id.0);
        if exists {
            return Ok(false);
        }
        state.saved.push(SavedListingRow::from(&edge));
        Ok(true)
    }

    fn remove_edge(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        let before = state.saved.len();
        state
            .saved
            .retain(|row| !(row.user_id == user_id.0 && row.listing_id == listing_id.0));
        Ok(state.saved.len() != before)
    }

    fn remove_edges_for_listing(&self, listing_id: &ListingId) -> Result<usize, RepositoryError> {
        let mut state = self.lock()?;
        let before = state.saved.len();
        state.saved.retain(|row| row.listing_id != listing_id.0);
        Ok(before - state.saved.len())
    }

    fn edges_for_user(&self, user_id: &UserId) -> Result<Vec<SavedListing>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .saved
            .iter()
            .rev()
            .filter(|row| row.user_id == user_id.0)
            .cloned()
            .map(SavedListing::from)
            .collect())
    }
}

impl ContactAttemptLog for InMemoryStore {
    fn record_attempt(&self, attempt: ContactMessageAttempt) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        state.messages.push(ContactMessageRow::from(&attempt));
        Ok(())
    }

    fn attempts_for_listing(
        &self,
        listing_id: &ListingId,
    ) -> Result<Vec<ContactMessageAttempt>, RepositoryError> {
        let state = self.lock()?;
        state
            .messages
            .iter()
            .rev()
            .filter(|row| row.listing_id == listing_id.0)
            .map(|row| ContactMessageAttempt::try_from(row.clone()).map_err(RepositoryError::from))
            .collect()
    }
}

impl ProfileRepository for InMemoryStore {
    fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let state = self.lock()?;
        state
            .profiles
            .get(&user_id.0)
            .cloned()
            .map(UserProfile::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn upsert_profile(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut state = self.lock()?;
        state
            .profiles
            .insert(profile.id.0.clone(), ProfileRow::from(&profile));
        Ok(profile)
    }
}
