use std::sync::Arc;

use super::handoff::ContactHandoff;
use super::profiles::ProfileDirectory;
use super::repository::{
    ContactAttemptLog, ListingRepository, ProfileRepository, SavedListingRepository,
};
use super::saved::SavedListingRegistry;
use super::store::ListingStore;
use crate::config::{ContactConfig, ListingConfig};

/// Everything the storage collaborator has to provide for the marketplace.
pub trait MarketplaceStore:
    ListingRepository + SavedListingRepository + ContactAttemptLog + ProfileRepository
{
}

impl<T> MarketplaceStore for T where
    T: ListingRepository + SavedListingRepository + ContactAttemptLog + ProfileRepository
{
}

/// Facade wiring the listing services over one shared store.
pub struct MarketplaceService<S> {
    pub listings: ListingStore<S, S, S>,
    pub saved: SavedListingRegistry<S, S>,
    pub contact: ContactHandoff<S, S>,
    pub profiles: ProfileDirectory<S>,
}

impl<S> MarketplaceService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, listing_config: ListingConfig, contact_config: ContactConfig) -> Self {
        Self {
            listings: ListingStore::new(
                store.clone(),
                store.clone(),
                store.clone(),
                listing_config,
            ),
            saved: SavedListingRegistry::new(store.clone(), store.clone()),
            contact: ContactHandoff::new(store.clone(), store.clone(), contact_config),
            profiles: ProfileDirectory::new(store),
        }
    }
}
