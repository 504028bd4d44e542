use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{Amenities, Amenity, GenderPreference, Location, NewListing};
use super::validation::{validate_new_listing, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ListingImportError {
    #[error("failed to read listing CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listing CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: ValidationError,
    },
}

/// Reads listing drafts from a CSV export so they can be published in bulk.
pub struct ListingImporter;

impl ListingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<NewListing>, ListingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<NewListing>, ListingImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut drafts = Vec::new();

        for (index, record) in csv_reader.deserialize::<ListingCsvRow>().enumerate() {
            // header occupies line 1
            let line = index + 2;
            let row = record?;
            let draft = row
                .into_new_listing()
                .and_then(|draft| validate_new_listing(&draft).map(|_| draft))
                .map_err(|source| ListingImportError::Invalid { line, source })?;
            drafts.push(draft);
        }

        Ok(drafts)
    }
}

#[derive(Debug, Deserialize)]
struct ListingCsvRow {
    title: String,
    #[serde(default)]
    description: String,
    address: String,
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    postal_code: String,
    rent_amount: u32,
    number_of_flatmates: u16,
    gender_preference: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amenities: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_available: Option<String>,
}

impl ListingCsvRow {
    fn into_new_listing(self) -> Result<NewListing, ValidationError> {
        let gender_preference = self.gender_preference.parse::<GenderPreference>()?;
        let amenities = parse_amenities(self.amenities.as_deref())?;
        let is_available = self
            .is_available
            .as_deref()
            .map_or(true, |raw| !matches!(raw.to_ascii_lowercase().as_str(), "false" | "no" | "0"));

        Ok(NewListing {
            title: self.title,
            description: self.description,
            location: Location {
                address: self.address,
                city: self.city,
                state: self.state,
                postal_code: self.postal_code,
                latitude: None,
                longitude: None,
            },
            rent_amount: self.rent_amount,
            number_of_flatmates: self.number_of_flatmates,
            gender_preference,
            amenities,
            is_available,
        })
    }
}

/// `;`-separated amenity keys; listed keys are present, the rest are left unset.
fn parse_amenities(raw: Option<&str>) -> Result<Amenities, ValidationError> {
    let Some(raw) = raw else {
        return Ok(Amenities::default());
    };

    raw.split(';')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| key.parse::<Amenity>().map(|amenity| (amenity, true)))
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
