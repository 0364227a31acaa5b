use crate::catalog::disk_cache::CatalogCache;
use crate::catalog::error::CatalogError;
use crate::feed::config::{FeedConfig, CATALOG_ENDPOINT};
use crate::feed::xml::{extract_records, FeedXmlError, XmlRecord};
use crate::telemetry::parser::parse_decimal;
use crate::types::reservoir::{CatalogEntry, LatLon};
use log::{info, warn};
use reqwest::header::USER_AGENT;
use reqwest::Client;

/// Downloads the full reservoir registry from the SAR listing endpoint.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    client: Client,
    config: FeedConfig,
}

impl CatalogLoader {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Downloads and parses the registry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NetworkRequest`], [`CatalogError::HttpStatus`] or
    /// [`CatalogError::MalformedResponse`] if the listing cannot be obtained.
    pub async fn try_load_full_catalog(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let url = self.config.endpoint(CATALOG_ENDPOINT);
        info!("Downloading reservoir catalog from {}", url);

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.config.user_agent)
            .timeout(self.config.catalog_timeout)
            .send()
            .await
            .map_err(|e| CatalogError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    CatalogError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    CatalogError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::NetworkRequest(url.clone(), e))?;
        let entries = parse_catalog(&body)
            .map_err(|source| CatalogError::MalformedResponse { url, source })?;
        info!("Parsed {} reservoirs from the catalog", entries.len());
        Ok(entries)
    }

    /// Downloads the registry, returning an empty list on any failure.
    ///
    /// An empty result means "catalog unavailable", not "no reservoirs exist".
    pub async fn load_full_catalog(&self) -> Vec<CatalogEntry> {
        match self.try_load_full_catalog().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Reservoir catalog unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Serves the registry from `cache` while it is fresh, downloading and
    /// storing it otherwise. A failed download leaves the cache untouched.
    pub async fn load_full_catalog_cached(&self, cache: &CatalogCache) -> Vec<CatalogEntry> {
        match cache.load_fresh().await {
            Ok(Some(entries)) => return entries,
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable catalog cache: {}", e),
        }

        let entries = self.load_full_catalog().await;
        if !entries.is_empty() {
            if let Err(e) = cache.store(&entries).await {
                warn!("Could not cache the reservoir catalog: {}", e);
            }
        }
        entries
    }
}

/// Parses the listing response. Entries without a name or an identifier are
/// dropped.
pub fn parse_catalog(body: &str) -> Result<Vec<CatalogEntry>, FeedXmlError> {
    Ok(extract_records(body, None)?
        .iter()
        .filter_map(entry_from_record)
        .collect())
}

fn entry_from_record(record: &XmlRecord) -> Option<CatalogEntry> {
    let name = record.non_empty("NomeReservatorio")?;
    let external_id = record.non_empty("Codigo")?;

    // Coordinates are not part of every listing; use them when both parse.
    let location = record
        .non_empty("Latitude")
        .and_then(parse_decimal)
        .zip(record.non_empty("Longitude").and_then(parse_decimal))
        .map(|(lat, lon)| LatLon(lat, lon));

    Some(CatalogEntry {
        name: name.to_string(),
        external_id: external_id.to_string(),
        municipality: record.non_empty("Municipio").map(str::to_string),
        state_code: record.non_empty("Estado").map(str::to_string),
        location,
    })
}
