use super::domain::{ListingPatch, Location, NewListing};

/// Malformed listing input, raised before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("rent amount must be greater than zero")]
    NonPositiveRent,
    #[error("number of flatmates must be at least 1")]
    NoFlatmates,
    #[error("unknown gender preference '{0}' (expected male, female, or any)")]
    GenderPreference(String),
    #[error("unknown amenity '{0}'")]
    Amenity(String),
    #[error("unknown sort order '{0}' (expected newest, oldest, rent_asc, or rent_desc)")]
    Order(String),
    #[error("title must not be blank")]
    BlankTitle,
    #[error("location city must not be blank")]
    BlankCity,
}

pub(crate) fn validate_new_listing(input: &NewListing) -> Result<(), ValidationError> {
    check_title(&input.title)?;
    check_location(&input.location)?;
    check_rent(input.rent_amount)?;
    check_flatmates(input.number_of_flatmates)
}

pub(crate) fn validate_patch(patch: &ListingPatch) -> Result<(), ValidationError> {
    if let Some(title) = &patch.title {
        check_title(title)?;
    }
    if let Some(location) = &patch.location {
        check_location(location)?;
    }
    if let Some(rent) = patch.rent_amount {
        check_rent(rent)?;
    }
    if let Some(flatmates) = patch.number_of_flatmates {
        check_flatmates(flatmates)?;
    }
    Ok(())
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    Ok(())
}

fn check_location(location: &Location) -> Result<(), ValidationError> {
    if location.city.trim().is_empty() {
        return Err(ValidationError::BlankCity);
    }
    Ok(())
}

fn check_rent(rent: u32) -> Result<(), ValidationError> {
    if rent == 0 {
        return Err(ValidationError::NonPositiveRent);
    }
    Ok(())
}

fn check_flatmates(count: u16) -> Result<(), ValidationError> {
    if count < 1 {
        return Err(ValidationError::NoFlatmates);
    }
    Ok(())
}
