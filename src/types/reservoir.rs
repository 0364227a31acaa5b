//! Defines the data structures describing monitored reservoirs: the immutable
//! reference records used for resolution, and the looser entries returned by
//! the registry listing feed.

use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are decimal degrees.
///
/// # Examples
///
/// ```
/// use reservoir_monitor::LatLon;
///
/// let sao_paulo = LatLon(-23.55, -46.63);
/// assert_eq!(sao_paulo.0, -23.55); // Latitude
/// assert_eq!(sao_paulo.1, -46.63); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// A monitored reservoir that can be selected as the reference for a city.
///
/// Records are reference data: they are built once (from the built-in table in
/// [`crate::reference`], a configuration file, or the downloaded catalog) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirRecord {
    /// Unique human-readable name, e.g. `"Sistema Cantareira (SP)"`.
    pub name: String,
    /// Opaque identifier used by the telemetry feed (e.g. `"12456"`).
    pub external_id: String,
    /// Location of the dam or reference point of the reservoir.
    pub location: LatLon,
    /// Two-letter state abbreviation (e.g. `"SP"`, `"CE"`).
    pub state_code: String,
}

impl ReservoirRecord {
    pub fn new(
        name: impl Into<String>,
        external_id: impl Into<String>,
        location: LatLon,
        state_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            external_id: external_id.into(),
            location,
            state_code: state_code.into(),
        }
    }
}

/// One entry of the full reservoir registry published by the listing feed.
///
/// The listing does not always carry coordinates, so unlike [`ReservoirRecord`]
/// the location is optional. Entries with a location can be promoted to a
/// record with [`ReservoirRecord::try_from`] and used as resolver candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub external_id: String,
    pub municipality: Option<String>,
    pub state_code: Option<String>,
    pub location: Option<LatLon>,
}

impl TryFrom<CatalogEntry> for ReservoirRecord {
    type Error = CatalogEntry;

    /// Fails (handing the entry back) when the entry has no coordinates.
    fn try_from(entry: CatalogEntry) -> Result<Self, Self::Error> {
        let Some(location) = entry.location else {
            return Err(entry);
        };
        Ok(ReservoirRecord {
            name: entry.name,
            external_id: entry.external_id,
            location,
            state_code: entry.state_code.unwrap_or_default(),
        })
    }
}
