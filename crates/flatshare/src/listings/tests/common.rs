use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::config::{ContactConfig, ListingConfig};
use crate::listings::domain::{
    Amenities, Amenity, ContactVisibility, GenderPreference, ListerContact, Listing, ListingId,
    Location, NewListing, UserId,
};
use crate::listings::handoff::ContactMessageAttempt;
use crate::listings::profiles::{ProfileUpdate, UserProfile};
use crate::listings::repository::{
    ContactAttemptLog, ListingRepository, ProfileRepository, RepositoryError,
    SavedListingRepository,
};
use crate::listings::saved::SavedListing;
use crate::listings::{InMemoryStore, MarketplaceService};

pub(super) const OWNER_PHONE: &str = "+91 98765-43210";

pub(super) fn owner() -> UserId {
    UserId::from("user-owner")
}

pub(super) fn stranger() -> UserId {
    UserId::from("user-stranger")
}

pub(super) fn location(city: &str) -> Location {
    Location {
        address: "123, 5th Cross".to_string(),
        city: city.to_string(),
        state: "Karnataka".to_string(),
        postal_code: "560034".to_string(),
        latitude: None,
        longitude: None,
    }
}

pub(super) fn amenities(flags: &[(Amenity, bool)]) -> Amenities {
    flags.iter().copied().collect()
}

pub(super) fn new_listing(title: &str, rent: u32, gender: GenderPreference) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: "Spacious apartment close to the metro".to_string(),
        location: location("Bengaluru"),
        rent_amount: rent,
        number_of_flatmates: 2,
        gender_preference: gender,
        amenities: amenities(&[(Amenity::Wifi, true), (Amenity::Kitchen, true)]),
        is_available: true,
    }
}

/// Listing built directly, for pure filter and visibility checks.
pub(super) fn listing(rent: u32, gender: GenderPreference) -> Listing {
    let stamp = Utc
        .with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    Listing {
        id: ListingId("lst-fixture".to_string()),
        user_id: owner(),
        lister: ListerContact {
            name: "Priya".to_string(),
            phone: Some(OWNER_PHONE.to_string()),
            email: Some("priya@example.com".to_string()),
            visibility: ContactVisibility::default(),
        },
        title: "Room in Koramangala".to_string(),
        description: "Bright room with balcony".to_string(),
        location: location("Bengaluru"),
        rent_amount: rent,
        number_of_flatmates: 2,
        gender_preference: gender,
        amenities: amenities(&[(Amenity::Wifi, true), (Amenity::Parking, false)]),
        is_available: true,
        created_at: stamp,
        updated_at: stamp,
    }
}

pub(super) fn visibility(phone: bool, email: bool, messaging: bool) -> ContactVisibility {
    ContactVisibility {
        show_phone: phone,
        show_email: email,
        show_messaging: messaging,
    }
}

pub(super) fn build_service() -> (MarketplaceService<InMemoryStore>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    let service = MarketplaceService::new(
        store.clone(),
        ListingConfig::default(),
        ContactConfig::default(),
    );
    (service, store)
}

/// Register the owner's profile with the given privacy switches.
pub(super) fn register_owner(
    service: &MarketplaceService<InMemoryStore>,
    visibility: ContactVisibility,
) -> UserProfile {
    let owner = owner();
    service
        .profiles
        .upsert(
            Some(&owner),
            &owner,
            ProfileUpdate {
                name: Some("Priya".to_string()),
                email: Some("priya@example.com".to_string()),
                phone: Some(OWNER_PHONE.to_string()),
                contact_visibility: Some(visibility),
                ..ProfileUpdate::default()
            },
        )
        .expect("profile saved")
}

pub(super) fn publish(
    service: &MarketplaceService<InMemoryStore>,
    title: &str,
    rent: u32,
    gender: GenderPreference,
) -> Listing {
    service
        .listings
        .create(Some(&owner()), new_listing(title, rent, gender))
        .expect("listing published")
}

/// Listing repository that deletes a listing as soon as it has been read, so a
/// delete lands between a caller's existence check and its next write.
pub(super) struct DeletingOnFetch {
    pub(super) store: Arc<InMemoryStore>,
}

impl ListingRepository for DeletingOnFetch {
    fn insert(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        self.store.insert(listing)
    }

    fn update(&self, listing: Listing) -> Result<Listing, RepositoryError> {
        self.store.update(listing)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        let found = self.store.fetch(id)?;
        self.store.delete(id)?;
        Ok(found)
    }

    fn delete(&self, id: &ListingId) -> Result<bool, RepositoryError> {
        self.store.delete(id)
    }

    fn all(&self) -> Result<Vec<Listing>, RepositoryError> {
        self.store.all()
    }

    fn by_owner(&self, user_id: &UserId) -> Result<Vec<Listing>, RepositoryError> {
        self.store.by_owner(user_id)
    }
}

pub(super) struct UnavailableRepository;

impl ListingRepository for UnavailableRepository {
    fn insert(&self, _listing: Listing) -> Result<Listing, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _listing: Listing) -> Result<Listing, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ListingId) -> Result<Option<Listing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &ListingId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Listing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_owner(&self, _user_id: &UserId) -> Result<Vec<Listing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl SavedListingRepository for UnavailableRepository {
    fn save_edge(&self, _edge: SavedListing) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove_edge(
        &self,
        _user_id: &UserId,
        _listing_id: &ListingId,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove_edges_for_listing(&self, _listing_id: &ListingId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn edges_for_user(&self, _user_id: &UserId) -> Result<Vec<SavedListing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl ContactAttemptLog for UnavailableRepository {
    fn record_attempt(&self, _attempt: ContactMessageAttempt) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn attempts_for_listing(
        &self,
        _listing_id: &ListingId,
    ) -> Result<Vec<ContactMessageAttempt>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl ProfileRepository for UnavailableRepository {
    fn fetch_profile(&self, _user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_profile(&self, _profile: UserProfile) -> Result<UserProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
