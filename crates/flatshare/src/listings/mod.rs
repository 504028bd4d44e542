//! Flatmate listings: publishing, searching, bookmarking, and contacting listers.
//!
//! Services are generic over the repository traits in [`repository`] so the storage
//! collaborator can be swapped; [`InMemoryStore`] is the process-local implementation.

pub mod domain;
pub mod error;
pub mod filter;
pub mod handoff;
pub mod import;
pub mod memory;
pub mod profiles;
pub mod repository;
pub mod router;
pub mod saved;
pub mod schema;
pub mod service;
pub mod store;
pub(crate) mod validation;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use domain::{
    Amenities, Amenity, ContactVisibility, GenderPreference, ListerContact, Listing, ListingId,
    ListingOrder, ListingPatch, Location, NewListing, UserId,
};
pub use error::{AuthorizationError, ContactPrecondition, ListingError};
pub use filter::{matches, ListingFilter, ListingQuery};
pub use handoff::{
    normalize_phone, render_message, ContactHandoff, ContactHandoffResult, ContactMessageAttempt,
    MessagingChannel,
};
pub use import::{ListingImportError, ListingImporter};
pub use memory::InMemoryStore;
pub use profiles::{
    Gender, Profession, ProfileDirectory, ProfileUpdate, SearchPreferences, UserProfile,
};
pub use repository::{
    ContactAttemptLog, ListingRepository, ProfileRepository, RepositoryError,
    SavedListingRepository,
};
pub use router::{listing_router, USER_ID_HEADER};
pub use saved::{SavedListing, SavedListingRegistry};
pub use service::{MarketplaceService, MarketplaceStore};
pub use store::ListingStore;
pub use validation::ValidationError;
pub use visibility::{resolve, ListingView, VisibleContact};
