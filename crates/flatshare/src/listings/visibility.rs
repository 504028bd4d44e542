use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Amenities, GenderPreference, Listing, ListingId, Location, UserId};

/// Contact fields a particular viewer is allowed to see. Masked fields are absent,
/// never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleContact {
    pub listing_id: ListingId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub can_message: bool,
    pub is_owner: bool,
}

/// Owners see their full record; everyone else sees what the listing's visibility
/// snapshot permits.
pub fn resolve(listing: &Listing, viewer: Option<&UserId>) -> VisibleContact {
    let lister = &listing.lister;

    if listing.is_owned_by(viewer) {
        return VisibleContact {
            listing_id: listing.id.clone(),
            name: lister.name.clone(),
            phone: lister.phone.clone(),
            email: lister.email.clone(),
            can_message: true,
            is_owner: true,
        };
    }

    let visibility = lister.visibility;
    VisibleContact {
        listing_id: listing.id.clone(),
        name: lister.name.clone(),
        phone: lister.phone.clone().filter(|_| visibility.show_phone),
        email: lister.email.clone().filter(|_| visibility.show_email),
        can_message: visibility.show_messaging,
        is_owner: false,
    }
}

/// Listing as rendered to a viewer: the raw contact snapshot is replaced by the
/// fields that viewer may see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: ListingId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub rent_amount: u32,
    pub number_of_flatmates: u16,
    pub gender_preference: GenderPreference,
    pub amenities: Amenities,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub contact: VisibleContact,
}

impl ListingView {
    pub fn new(listing: Listing, viewer: Option<&UserId>) -> Self {
        let contact = resolve(&listing, viewer);
        let Listing {
            id,
            user_id,
            lister: _,
            title,
            description,
            location,
            rent_amount,
            number_of_flatmates,
            gender_preference,
            amenities,
            is_available,
            created_at,
            updated_at,
        } = listing;

        Self {
            id,
            user_id,
            title,
            description,
            location,
            rent_amount,
            number_of_flatmates,
            gender_preference,
            amenities,
            is_available,
            created_at,
            updated_at,
            contact,
        }
    }

    pub fn many(listings: Vec<Listing>, viewer: Option<&UserId>) -> Vec<Self> {
        listings
            .into_iter()
            .map(|listing| Self::new(listing, viewer))
            .collect()
    }
}
