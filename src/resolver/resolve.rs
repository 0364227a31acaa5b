//! Selects the reference reservoir for a city: curated override first, nearest
//! monitored reservoir second.

use crate::resolver::error::ResolveError;
use crate::types::reservoir::{LatLon, ReservoirRecord};
use geo::{Distance, Geodesic, Point};
use haversine::{distance, Location as HaversineLocation, Units};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the reference reservoir was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionMethod {
    /// Taken from the curated city override table.
    Override,
    /// Closest candidate to the city's coordinates.
    Nearest,
}

/// The outcome of a single resolution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub reservoir: ReservoirRecord,
    pub method: ResolutionMethod,
    /// Distance from the city to the reservoir in kilometres. Always `0.0` for
    /// [`ResolutionMethod::Override`].
    pub distance_km: f64,
}

/// Earth model used to measure city → reservoir distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceModel {
    /// Geodesic distance on the WGS-84 ellipsoid.
    #[default]
    Geodesic,
    /// Great-circle distance on a sphere.
    Haversine,
}

impl DistanceModel {
    /// Distance between two coordinates in kilometres.
    pub fn distance_km(&self, from: LatLon, to: LatLon) -> f64 {
        match self {
            DistanceModel::Geodesic => {
                // geo points are (x = longitude, y = latitude)
                let a = Point::new(from.longitude(), from.latitude());
                let b = Point::new(to.longitude(), to.latitude());
                Geodesic::distance(a, b) / 1000.0
            }
            DistanceModel::Haversine => distance(
                HaversineLocation {
                    latitude: from.latitude(),
                    longitude: from.longitude(),
                },
                HaversineLocation {
                    latitude: to.latitude(),
                    longitude: to.longitude(),
                },
                Units::Kilometers,
            ),
        }
    }
}

/// Normalises raw user input into an override-table key.
///
/// Lowercases and trims surrounding whitespace. Diacritics are kept, so
/// `"Brasília"` and `"Brasilia"` remain distinct keys.
pub fn city_key(city_name: &str) -> String {
    city_name.trim().to_lowercase()
}

/// Resolves the reference reservoir for a city with the default
/// [`DistanceModel::Geodesic`] model.
///
/// `city_key` must already be normalised (see [`city_key`]).
///
/// # Errors
///
/// Returns [`ResolveError::NoCandidates`] if `candidates` is empty.
///
/// # Examples
///
/// ```
/// use reservoir_monitor::{resolve, LatLon, ReservoirRecord, ResolutionMethod};
/// use std::collections::HashMap;
///
/// let candidates = vec![
///     ReservoirRecord::new("A", "1", LatLon(-23.0, -46.0), "SP"),
///     ReservoirRecord::new("B", "2", LatLon(-9.0, -38.0), "PE"),
/// ];
/// let result = resolve("guarulhos", LatLon(-23.1, -46.1), &candidates, &HashMap::new()).unwrap();
/// assert_eq!(result.reservoir.name, "A");
/// assert_eq!(result.method, ResolutionMethod::Nearest);
/// ```
pub fn resolve(
    city_key: &str,
    location: LatLon,
    candidates: &[ReservoirRecord],
    overrides: &HashMap<String, String>,
) -> Result<ResolutionResult, ResolveError> {
    resolve_with_model(
        city_key,
        location,
        candidates,
        overrides,
        DistanceModel::default(),
    )
}

/// Same as [`resolve`], measuring distances with the given `model`.
pub fn resolve_with_model(
    city_key: &str,
    location: LatLon,
    candidates: &[ReservoirRecord],
    overrides: &HashMap<String, String>,
    model: DistanceModel,
) -> Result<ResolutionResult, ResolveError> {
    if candidates.is_empty() {
        return Err(ResolveError::NoCandidates {
            city_key: city_key.to_string(),
        });
    }

    if let Some(target) = overrides.get(city_key) {
        match candidates.iter().find(|r| &r.name == target) {
            Some(reservoir) => {
                debug!("'{}' resolved to '{}' by override", city_key, reservoir.name);
                return Ok(ResolutionResult {
                    reservoir: reservoir.clone(),
                    method: ResolutionMethod::Override,
                    distance_km: 0.0,
                });
            }
            None => {
                warn!(
                    "Override for '{}' points to '{}', which is not a candidate. Falling back to nearest reservoir.",
                    city_key, target
                );
            }
        }
    }

    let (reservoir, distance_km) = nearest(location, candidates, model)
        .ok_or_else(|| ResolveError::NoCandidates {
            city_key: city_key.to_string(),
        })?;
    debug!(
        "'{}' resolved to '{}' by proximity ({:.1} km)",
        city_key, reservoir.name, distance_km
    );
    Ok(ResolutionResult {
        reservoir: reservoir.clone(),
        method: ResolutionMethod::Nearest,
        distance_km,
    })
}

/// Full scan over `candidates`; the first of equally distant candidates wins.
fn nearest(
    location: LatLon,
    candidates: &[ReservoirRecord],
    model: DistanceModel,
) -> Option<(&ReservoirRecord, f64)> {
    let mut best: Option<(&ReservoirRecord, f64)> = None;
    for candidate in candidates {
        let d = model.distance_km(location, candidate.location);
        // A NaN distance never beats a real one.
        let closer = match best {
            None => true,
            Some((_, best_d)) => d < best_d || (best_d.is_nan() && !d.is_nan()),
        };
        if closer {
            best = Some((candidate, d));
        }
    }
    best
}

/// A resolver holding its own candidate set and override table.
#[derive(Debug, Clone)]
pub struct ReservoirResolver {
    candidates: Vec<ReservoirRecord>,
    overrides: HashMap<String, String>,
    model: DistanceModel,
}

impl ReservoirResolver {
    pub fn new(candidates: Vec<ReservoirRecord>, overrides: HashMap<String, String>) -> Self {
        Self {
            candidates,
            overrides,
            model: DistanceModel::default(),
        }
    }

    pub fn with_distance_model(mut self, model: DistanceModel) -> Self {
        self.model = model;
        self
    }

    pub fn candidates(&self) -> &[ReservoirRecord] {
        &self.candidates
    }

    pub fn overrides(&self) -> &HashMap<String, String> {
        &self.overrides
    }

    /// Resolves raw city input: the name is normalised with [`city_key`] first.
    pub fn resolve(
        &self,
        city_name: &str,
        location: LatLon,
    ) -> Result<ResolutionResult, ResolveError> {
        resolve_with_model(
            &city_key(city_name),
            location,
            &self.candidates,
            &self.overrides,
            self.model,
        )
    }
}
