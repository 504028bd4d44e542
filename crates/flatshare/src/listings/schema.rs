//! Physical record shapes used by the storage collaborator.
//!
//! Column names follow the snake_case table layout (`listings`, `saved_listings`,
//! `messages`, `profiles`). Every column maps onto a domain field and back; rows that
//! cannot be mapped surface as [`RowMappingError`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Amenities, Amenity, ContactVisibility, GenderPreference, ListerContact, Listing, ListingId,
    Location, UserId,
};
use super::handoff::{ContactMessageAttempt, MessagingChannel};
use super::profiles::{Gender, Profession, SearchPreferences, UserProfile};
use super::saved::SavedListing;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowMappingError {
    #[error("column {column} holds unexpected value '{value}'")]
    InvalidValue { column: &'static str, value: String },
    #[error("column {column} must be positive (found {value})")]
    OutOfRange { column: &'static str, value: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_phone: Option<String>,
    pub user_email: Option<String>,
    pub user_contact_visibility: Option<ContactVisibilityRow>,
    pub title: String,
    pub description: String,
    pub location: LocationRow,
    pub rent_amount: i64,
    pub number_of_flatmates: i64,
    pub gender_preference: String,
    pub amenities: BTreeMap<String, bool>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactVisibilityRow {
    pub show_phone: bool,
    pub show_email: bool,
    pub show_whatsapp: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedListingRow {
    pub user_id: String,
    pub listing_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessageRow {
    pub id: String,
    pub to: String,
    pub message: String,
    pub listing_id: String,
    pub listing_title: String,
    pub sender_id: Option<String>,
    pub channel: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub contact_visibility: Option<ContactVisibilityRow>,
    #[serde(default)]
    pub preferences: Option<PreferencesRow>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesRow {
    pub gender_preference: Option<String>,
    pub max_rent: Option<i64>,
}

impl From<ContactVisibility> for ContactVisibilityRow {
    fn from(value: ContactVisibility) -> Self {
        Self {
            show_phone: value.show_phone,
            show_email: value.show_email,
            show_whatsapp: value.show_messaging,
        }
    }
}

impl From<ContactVisibilityRow> for ContactVisibility {
    fn from(row: ContactVisibilityRow) -> Self {
        Self {
            show_phone: row.show_phone,
            show_email: row.show_email,
            show_messaging: row.show_whatsapp,
        }
    }
}

impl From<&Location> for LocationRow {
    fn from(location: &Location) -> Self {
        Self {
            address: location.address.clone(),
            city: location.city.clone(),
            state: location.state.clone(),
            postal_code: location.postal_code.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            address: row.address,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

impl From<&Listing> for ListingRow {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.0.clone(),
            user_id: listing.user_id.0.clone(),
            user_name: listing.lister.name.clone(),
            user_phone: listing.lister.phone.clone(),
            user_email: listing.lister.email.clone(),
            user_contact_visibility: Some(listing.lister.visibility.into()),
            title: listing.title.clone(),
            description: listing.description.clone(),
            location: LocationRow::from(&listing.location),
            rent_amount: i64::from(listing.rent_amount),
            number_of_flatmates: i64::from(listing.number_of_flatmates),
            gender_preference: listing.gender_preference.label().to_string(),
            amenities: listing
                .amenities
                .iter()
                .map(|(amenity, present)| (amenity.key().to_string(), present))
                .collect(),
            is_available: listing.is_available,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

impl TryFrom<ListingRow> for Listing {
    type Error = RowMappingError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let rent_amount = positive(row.rent_amount, "rent_amount")?;
        let number_of_flatmates = positive(row.number_of_flatmates, "number_of_flatmates")?;
        let gender_preference = row
            .gender_preference
            .parse::<GenderPreference>()
            .map_err(|_| RowMappingError::InvalidValue {
                column: "gender_preference",
                value: row.gender_preference.clone(),
            })?;
        let amenities = row
            .amenities
            .into_iter()
            .map(|(key, present)| {
                key.parse::<Amenity>()
                    .map(|amenity| (amenity, present))
                    .map_err(|_| RowMappingError::InvalidValue {
                        column: "amenities",
                        value: key,
                    })
            })
            .collect::<Result<Amenities, _>>()?;

        Ok(Listing {
            id: ListingId(row.id),
            user_id: UserId(row.user_id),
            lister: ListerContact {
                name: row.user_name,
                phone: row.user_phone,
                email: row.user_email,
                visibility: row
                    .user_contact_visibility
                    .map(ContactVisibility::from)
                    .unwrap_or_default(),
            },
            title: row.title,
            description: row.description,
            location: row.location.into(),
            rent_amount,
            number_of_flatmates,
            gender_preference,
            amenities,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&SavedListing> for SavedListingRow {
    fn from(edge: &SavedListing) -> Self {
        Self {
            user_id: edge.user_id.0.clone(),
            listing_id: edge.listing_id.0.clone(),
            created_at: edge.saved_at,
        }
    }
}

impl From<SavedListingRow> for SavedListing {
    fn from(row: SavedListingRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            listing_id: ListingId(row.listing_id),
            saved_at: row.created_at,
        }
    }
}

impl From<&ContactMessageAttempt> for ContactMessageRow {
    fn from(attempt: &ContactMessageAttempt) -> Self {
        Self {
            id: attempt.id.clone(),
            to: attempt.target.clone(),
            message: attempt.message.clone(),
            listing_id: attempt.listing_id.0.clone(),
            listing_title: attempt.listing_title.clone(),
            sender_id: attempt.sender_id.as_ref().map(|id| id.0.clone()),
            channel: attempt.channel.label().to_string(),
            sent_at: attempt.sent_at,
        }
    }
}

impl TryFrom<ContactMessageRow> for ContactMessageAttempt {
    type Error = RowMappingError;

    fn try_from(row: ContactMessageRow) -> Result<Self, Self::Error> {
        let channel = row
            .channel
            .parse::<MessagingChannel>()
            .map_err(|_| RowMappingError::InvalidValue {
                column: "channel",
                value: row.channel.clone(),
            })?;

        Ok(ContactMessageAttempt {
            id: row.id,
            listing_id: ListingId(row.listing_id),
            listing_title: row.listing_title,
            sender_id: row.sender_id.map(UserId),
            channel,
            target: row.to,
            message: row.message,
            sent_at: row.sent_at,
        })
    }
}

impl From<&UserProfile> for ProfileRow {
    fn from(profile: &UserProfile) -> Self {
        let preferences = &profile.preferences;
        Self {
            id: profile.id.0.clone(),
            name: Some(profile.name.clone()),
            email: profile.email.clone(),
            phone_number: profile.phone.clone(),
            gender: profile.gender.map(|gender| gender.label().to_string()),
            profession: profile
                .profession
                .map(|profession| profession.label().to_string()),
            bio: profile.bio.clone(),
            contact_visibility: Some(profile.contact_visibility.into()),
            preferences: Some(PreferencesRow {
                gender_preference: preferences
                    .gender_preference
                    .map(|preference| preference.label().to_string()),
                max_rent: preferences.max_rent.map(i64::from),
            }),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = RowMappingError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .map(|value| {
                value
                    .parse::<Gender>()
                    .map_err(|_| RowMappingError::InvalidValue {
                        column: "gender",
                        value,
                    })
            })
            .transpose()?;
        let profession = row
            .profession
            .map(|value| {
                value
                    .parse::<Profession>()
                    .map_err(|_| RowMappingError::InvalidValue {
                        column: "profession",
                        value,
                    })
            })
            .transpose()?;
        let preferences = row
            .preferences
            .map(SearchPreferences::try_from)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            id: UserId(row.id),
            name: row
                .name
                .unwrap_or_else(|| ListerContact::ANONYMOUS_NAME.to_string()),
            email: row.email,
            phone: row.phone_number,
            gender,
            profession,
            bio: row.bio,
            contact_visibility: row
                .contact_visibility
                .map(ContactVisibility::from)
                .unwrap_or_default(),
            preferences,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<PreferencesRow> for SearchPreferences {
    type Error = RowMappingError;

    fn try_from(row: PreferencesRow) -> Result<Self, Self::Error> {
        let gender_preference = row
            .gender_preference
            .map(|value| {
                value
                    .parse::<GenderPreference>()
                    .map_err(|_| RowMappingError::InvalidValue {
                        column: "preferences.gender_preference",
                        value,
                    })
            })
            .transpose()?;
        let max_rent = row
            .max_rent
            .map(|value| positive::<u32>(value, "preferences.max_rent"))
            .transpose()?;
        Ok(Self {
            gender_preference,
            max_rent,
        })
    }
}

fn positive<T>(value: i64, column: &'static str) -> Result<T, RowMappingError>
where
    T: TryFrom<i64>,
{
    if value <= 0 {
        return Err(RowMappingError::OutOfRange { column, value });
    }
    T::try_from(value).map_err(|_| RowMappingError::OutOfRange { column, value })
}
