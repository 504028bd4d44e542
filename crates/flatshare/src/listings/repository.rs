use super::domain::{Listing, ListingId, UserId};
use super::handoff::ContactMessageAttempt;
use super::profiles::UserProfile;
use super::saved::SavedListing;
use super::schema::RowMappingError;

/// Listing persistence so the store service can be exercised in isolation.
pub trait ListingRepository: Send + Sync {
    fn insert(&self, listing: Listing) -> Result<Listing, RepositoryError>;
    /// Replace an existing record; `NotFound` when the id is unknown.
    fn update(&self, listing: Listing) -> Result<Listing, RepositoryError>;
    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError>;
    /// Returns whether a record was removed.
    fn delete(&self, id: &ListingId) -> Result<bool, RepositoryError>;
    /// Every listing, newest first.
    fn all(&self) -> Result<Vec<Listing>, RepositoryError>;
    /// Listings owned by `user_id`, newest first.
    fn by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, RepositoryError>;
}

/// Bookmark edges. The (user, listing) pair is unique and the store enforces it.
pub trait SavedListingRepository: Send + Sync {
    /// Returns `false` when the edge already existed and `NotFound` when the listing
    /// is gone. Both checks and the insert happen atomically with listing deletes.
    fn save_edge(&self, edge: SavedListing) -> Result<bool, RepositoryError>;
    /// Returns `false` when there was nothing to remove.
    fn remove_edge(&self, user_id: &UserId, listing_id: &ListingId)
        -> Result<bool, RepositoryError>;
    fn remove_edges_for_listing(&self, listing_id: &ListingId) -> Result<usize, RepositoryError>;
    /// Edges belonging to `user_id`, most recently saved first.
    fn edges_for_user(&self, user_id: &UserId) -> Result<Vec<SavedListing>, RepositoryError>;
}

/// Append-only audit trail of contact handoffs.
pub trait ContactAttemptLog: Send + Sync {
    fn record_attempt(&self, attempt: ContactMessageAttempt) -> Result<(), RepositoryError>;
    /// Attempts for a listing, newest first.
    fn attempts_for_listing(
        &self,
        listing_id: &ListingId,
    ) -> Result<Vec<ContactMessageAttempt>, RepositoryError>;
}

pub trait ProfileRepository: Send + Sync {
    fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;
    fn upsert_profile(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError>;
}

/// Error enumeration for storage collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stored record is malformed: {0}")]
    Corrupt(#[from] RowMappingError),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
