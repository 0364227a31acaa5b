//! City name → coordinates, through a Nominatim-compatible search API.

use crate::types::reservoir::LatLon;
use log::{debug, warn};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
/// Nominatim's usage policy asks for an identifying user agent.
pub const GEOCODER_USER_AGENT: &str = "reservoir_monitor/0.1";
pub const DEFAULT_COUNTRY_HINT: &str = "Brazil";
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse geocoder JSON")]
    JsonParse(#[from] serde_json::Error),

    #[error("Geocoder returned an unusable coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// A place found by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub location: LatLon,
    /// Full display address, e.g. `"Campina Grande, Paraíba, Região Nordeste, Brasil"`.
    pub address: String,
}

// Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    user_agent: String,
    country_hint: String,
    timeout: Duration,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_NOMINATIM_URL)
    }
}

impl NominatimGeocoder {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            user_agent: GEOCODER_USER_AGENT.to_string(),
            country_hint: DEFAULT_COUNTRY_HINT.to_string(),
            timeout: DEFAULT_GEOCODE_TIMEOUT,
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn country_hint(mut self, country: impl Into<String>) -> Self {
        self.country_hint = country.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Looks up `place` (restricted by the country hint).
    ///
    /// Returns `Ok(None)` when the service knows no such place.
    pub async fn geocode(&self, place: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let query = format!("{}, {}", place.trim(), self.country_hint);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GeocodeError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    GeocodeError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    GeocodeError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| GeocodeError::NetworkRequest(url.clone(), e))?;
        let found = parse_search_response(&body)?;
        match &found {
            Some(p) => debug!("Geocoded '{}' to {:?} ({})", query, p.location, p.address),
            None => debug!("Geocoder found nothing for '{}'", query),
        }
        Ok(found)
    }
}

fn parse_search_response(body: &[u8]) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let places: Vec<NominatimPlace> = serde_json::from_slice(body)?;
    let Some(first) = places.into_iter().next() else {
        return Ok(None);
    };
    let coordinate = |text: &str| {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GeocodeError::InvalidCoordinate(text.to_string()))
    };
    Ok(Some(GeocodedPlace {
        location: LatLon(coordinate(&first.lat)?, coordinate(&first.lon)?),
        address: first.display_name,
    }))
}
