//! Pure predicate evaluation over listings.
//!
//! Every filter field is optional and an absent field never excludes a listing. The
//! predicates that are present are AND-combined.

use serde::{Deserialize, Serialize};

use super::domain::{Amenities, GenderPreference, Listing, ListingOrder};

/// Ephemeral search criteria. The default value matches every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilter {
    #[serde(default)]
    pub min_rent: Option<u32>,
    #[serde(default)]
    pub max_rent: Option<u32>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub gender_preference: Option<GenderPreference>,
    #[serde(default)]
    pub number_of_flatmates: Option<u16>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub amenities: Amenities,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        matches(listing, self)
    }
}

/// Filter plus paging and ordering for a listing search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub filter: ListingFilter,
    pub limit: Option<usize>,
    pub order: ListingOrder,
}

impl ListingQuery {
    pub fn with_filter(filter: ListingFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

pub fn matches(listing: &Listing, filter: &ListingFilter) -> bool {
    rent_in_range(listing, filter)
        && city_matches(listing, filter)
        && gender_matches(listing, filter)
        && flatmates_match(listing, filter)
        && availability_matches(listing, filter)
        && amenities_match(listing, filter)
}

/// Keep the listings that satisfy `filter`, preserving their incoming order.
pub fn filter_listings<I>(listings: I, filter: &ListingFilter) -> Vec<Listing>
where
    I: IntoIterator<Item = Listing>,
{
    listings
        .into_iter()
        .filter(|listing| matches(listing, filter))
        .collect()
}

/// Stable sort; callers hand in listings newest-first so ties keep that order,
/// except `Oldest`, where ties fall back to insertion order.
pub(crate) fn sort_listings(listings: &mut [Listing], order: ListingOrder) {
    match order {
        ListingOrder::Newest => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ListingOrder::Oldest => {
            listings.reverse();
            listings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        ListingOrder::RentAsc => listings.sort_by_key(|listing| listing.rent_amount),
        ListingOrder::RentDesc => listings.sort_by(|a, b| b.rent_amount.cmp(&a.rent_amount)),
    }
}

fn rent_in_range(listing: &Listing, filter: &ListingFilter) -> bool {
    let above_min = filter
        .min_rent
        .map_or(true, |min| listing.rent_amount >= min);
    let below_max = filter
        .max_rent
        .map_or(true, |max| listing.rent_amount <= max);
    above_min && below_max
}

fn city_matches(listing: &Listing, filter: &ListingFilter) -> bool {
    let needle = match filter.city.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => needle.to_lowercase(),
        _ => return true,
    };
    listing.location.city.to_lowercase().contains(&needle)
}

fn gender_matches(listing: &Listing, filter: &ListingFilter) -> bool {
    filter
        .gender_preference
        .map_or(true, |wanted| wanted.accepts(listing.gender_preference))
}

fn flatmates_match(listing: &Listing, filter: &ListingFilter) -> bool {
    filter
        .number_of_flatmates
        .map_or(true, |count| listing.number_of_flatmates == count)
}

fn availability_matches(listing: &Listing, filter: &ListingFilter) -> bool {
    match filter.is_available {
        Some(true) => listing.is_available,
        _ => true,
    }
}

fn amenities_match(listing: &Listing, filter: &ListingFilter) -> bool {
    filter
        .amenities
        .required()
        .all(|amenity| listing.amenities.has(amenity))
}
