use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Opaque identifier assigned to a listing when it is published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque user identifier handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Flatmate gender the lister is looking for. `Any` is a wildcard on both sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    Male,
    Female,
    Any,
}

impl GenderPreference {
    pub const fn label(self) -> &'static str {
        match self {
            GenderPreference::Male => "male",
            GenderPreference::Female => "female",
            GenderPreference::Any => "any",
        }
    }

    /// Reciprocal wildcard: `any` on either side accepts the counterpart.
    pub fn accepts(self, other: GenderPreference) -> bool {
        matches!(self, GenderPreference::Any) || matches!(other, GenderPreference::Any) || self == other
    }
}

impl FromStr for GenderPreference {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "any" => Ok(Self::Any),
            _ => Err(ValidationError::GenderPreference(value.to_string())),
        }
    }
}

/// Amenity keys a listing can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Wifi,
    #[serde(rename = "ac", alias = "air_conditioning")]
    AirConditioning,
    Kitchen,
    Laundry,
    Parking,
    Furnished,
    Heating,
    Balcony,
    Security,
    Gym,
    Pool,
}

impl Amenity {
    pub const ALL: [Amenity; 11] = [
        Amenity::Wifi,
        Amenity::AirConditioning,
        Amenity::Kitchen,
        Amenity::Laundry,
        Amenity::Parking,
        Amenity::Furnished,
        Amenity::Heating,
        Amenity::Balcony,
        Amenity::Security,
        Amenity::Gym,
        Amenity::Pool,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Amenity::Wifi => "wifi",
            Amenity::AirConditioning => "ac",
            Amenity::Kitchen => "kitchen",
            Amenity::Laundry => "laundry",
            Amenity::Parking => "parking",
            Amenity::Furnished => "furnished",
            Amenity::Heating => "heating",
            Amenity::Balcony => "balcony",
            Amenity::Security => "security",
            Amenity::Gym => "gym",
            Amenity::Pool => "pool",
        }
    }
}

impl FromStr for Amenity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        if normalized == "air_conditioning" {
            return Ok(Amenity::AirConditioning);
        }

        Amenity::ALL
            .into_iter()
            .find(|amenity| amenity.key() == normalized)
            .ok_or_else(|| ValidationError::Amenity(value.to_string()))
    }
}

/// Presence flags per amenity. Keys that were never set read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amenities(BTreeMap<Amenity, bool>);

impl Amenities {
    pub fn has(&self, amenity: Amenity) -> bool {
        self.0.get(&amenity).copied().unwrap_or(false)
    }

    pub fn set(&mut self, amenity: Amenity, present: bool) {
        self.0.insert(amenity, present);
    }

    /// Overlay the flags supplied in `other`, leaving the rest untouched.
    pub fn merge(&mut self, other: &Amenities) {
        for (amenity, present) in &other.0 {
            self.0.insert(*amenity, *present);
        }
    }

    /// Amenities flagged `true`.
    pub fn required(&self) -> impl Iterator<Item = Amenity> + '_ {
        self.0
            .iter()
            .filter(|(_, present)| **present)
            .map(|(amenity, _)| *amenity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Amenity, bool)> + '_ {
        self.0.iter().map(|(amenity, present)| (*amenity, *present))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Amenity, bool)> for Amenities {
    fn from_iter<I: IntoIterator<Item = (Amenity, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Street-level location of the room or flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Per-channel switches controlling what non-owners may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactVisibility {
    pub show_phone: bool,
    pub show_email: bool,
    #[serde(alias = "showWhatsApp")]
    pub show_messaging: bool,
}

impl Default for ContactVisibility {
    fn default() -> Self {
        Self {
            show_phone: true,
            show_email: true,
            show_messaging: true,
        }
    }
}

/// Lister contact details copied onto a listing when it is published or re-synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListerContact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub visibility: ContactVisibility,
}

impl ListerContact {
    pub const ANONYMOUS_NAME: &'static str = "Anonymous User";

    pub fn anonymous() -> Self {
        Self {
            name: Self::ANONYMOUS_NAME.to_string(),
            phone: None,
            email: None,
            visibility: ContactVisibility::default(),
        }
    }
}

/// A published room or flat-share opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub user_id: UserId,
    pub lister: ListerContact,
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
}

impl Listing {
    pub fn is_owned_by(&self, viewer: Option<&UserId>) -> bool {
        viewer.is_some_and(|viewer| *viewer == self.user_id)
    }
}

/// Caller-supplied fields for a new listing. Identity, timestamps, and the contact
/// snapshot are filled in by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Location,
    pub rent_amount: u32,
    pub number_of_flatmates: u16,
    pub gender_preference: GenderPreference,
    #[serde(default)]
    pub amenities: Amenities,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// Partial update; only supplied fields are merged. Amenity flags are merged key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub rent_amount: Option<u32>,
    #[serde(default)]
    pub number_of_flatmates: Option<u16>,
    #[serde(default)]
    pub gender_preference: Option<GenderPreference>,
    #[serde(default)]
    pub amenities: Option<Amenities>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl ListingPatch {
    pub(crate) fn apply(self, listing: &mut Listing) {
        let ListingPatch {
            title,
            description,
            location,
            rent_amount,
            number_of_flatmates,
            gender_preference,
            amenities,
            is_available,
        } = self;

        if let Some(title) = title {
            listing.title = title;
        }
        if let Some(description) = description {
            listing.description = description;
        }
        if let Some(location) = location {
            listing.location = location;
        }
        if let Some(rent_amount) = rent_amount {
            listing.rent_amount = rent_amount;
        }
        if let Some(number_of_flatmates) = number_of_flatmates {
            listing.number_of_flatmates = number_of_flatmates;
        }
        if let Some(gender_preference) = gender_preference {
            listing.gender_preference = gender_preference;
        }
        if let Some(amenities) = amenities {
            listing.amenities.merge(&amenities);
        }
        if let Some(is_available) = is_available {
            listing.is_available = is_available;
        }
    }
}

/// Sort orders accepted by listing queries. Newest first unless overridden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingOrder {
    #[default]
    Newest,
    Oldest,
    RentAsc,
    RentDesc,
}

impl FromStr for ListingOrder {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "rent_asc" => Ok(Self::RentAsc),
            "rent_desc" => Ok(Self::RentDesc),
            _ => Err(ValidationError::Order(value.to_string())),
        }
    }
}
