//! This module provides the main entry point: a monitor that resolves a city to
//! its reference reservoir and reports that reservoir's latest fill level.

use crate::catalog::disk_cache::CatalogCache;
use crate::catalog::loader::CatalogLoader;
use crate::error::MonitorError;
use crate::feed::config::{FeedConfig, DEFAULT_DETAIL_LOOKBACK_DAYS};
use crate::geocode::{GeocodedPlace, NominatimGeocoder};
use crate::reference::{city_overrides, strategic_reservoirs};
use crate::resolver::resolve::{DistanceModel, ReservoirResolver, ResolutionResult};
use crate::survey::{survey_reservoirs, NationalPanorama, SurveyOptions};
use crate::telemetry::cached::{ReadingCache, DEFAULT_READING_TTL};
use crate::telemetry::error::TelemetryError;
use crate::telemetry::fetcher::TelemetryFetcher;
use crate::types::reading::TelemetryReading;
use crate::types::reservoir::{CatalogEntry, LatLon, ReservoirRecord};
use crate::types::status::{is_low, FillStatus};
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the city view shows for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityReport {
    /// The city as typed by the user.
    pub city: String,
    pub place: GeocodedPlace,
    pub resolution: ResolutionResult,
    /// `None` when the feed is unreachable or has no usable record in the window.
    pub reading: Option<TelemetryReading>,
}

impl CityReport {
    pub fn reservoir(&self) -> &ReservoirRecord {
        &self.resolution.reservoir
    }

    pub fn status(&self) -> Option<FillStatus> {
        self.reading
            .as_ref()
            .map(|r| FillStatus::classify(r.volume_percent))
    }

    /// `false` when there is no reading.
    pub fn is_low(&self, threshold: f64) -> bool {
        self.reading
            .as_ref()
            .is_some_and(|r| is_low(r.volume_percent, threshold))
    }
}

enum ReadingSource {
    Direct(TelemetryFetcher),
    Cached(ReadingCache),
}

impl ReadingSource {
    fn fetcher(&self) -> &TelemetryFetcher {
        match self {
            ReadingSource::Direct(fetcher) => fetcher,
            ReadingSource::Cached(cache) => cache.fetcher(),
        }
    }

    async fn fetch(
        &self,
        external_id: &str,
        lookback_days: u32,
        now: NaiveDate,
    ) -> Result<Option<TelemetryReading>, TelemetryError> {
        match self {
            ReadingSource::Direct(fetcher) => {
                fetcher
                    .fetch_latest_reading(external_id, lookback_days, now)
                    .await
            }
            ReadingSource::Cached(cache) => {
                cache
                    .fetch_latest_reading(external_id, lookback_days, now)
                    .await
            }
        }
    }
}

/// The main client for reservoir lookups.
///
/// Holds the reference tables, the feed clients and the optional caches. Build
/// one with [`ReservoirMonitor::builder()`]; every setting has a default, so
/// `ReservoirMonitor::builder().build().await?` gives a monitor over the
/// built-in strategic reservoirs talking to the public ANA and Nominatim services.
///
/// # Examples
///
/// ```rust
/// # use reservoir_monitor::{LatLon, MonitorError, ReservoirMonitor, ResolutionMethod};
/// # #[tokio::main]
/// # async fn main() -> Result<(), MonitorError> {
/// let monitor = ReservoirMonitor::builder().build().await?;
///
/// // Resolution is local: no request is made.
/// let result = monitor.resolve("Fortaleza", LatLon(-3.73, -38.52))?;
/// assert_eq!(result.reservoir.name, "Castanhão (CE)");
/// assert_eq!(result.method, ResolutionMethod::Override);
/// # Ok(())
/// # }
/// ```
pub struct ReservoirMonitor {
    resolver: ReservoirResolver,
    readings: ReadingSource,
    catalog: CatalogLoader,
    catalog_cache: Option<CatalogCache>,
    geocoder: NominatimGeocoder,
    lookback_days: u32,
    survey_options: SurveyOptions,
}

#[bon]
impl ReservoirMonitor {
    /// Creates a monitor.
    ///
    /// # Arguments
    ///
    /// * `.reservoirs(Vec<ReservoirRecord>)`: Optional. Resolution candidates. Defaults to the built-in strategic reservoirs.
    /// * `.overrides(HashMap<String, String>)`: Optional. City key → reservoir name. Defaults to the built-in table.
    /// * `.distance_model(DistanceModel)`: Optional. Defaults to [`DistanceModel::Geodesic`].
    /// * `.feed(FeedConfig)`: Optional. SAR endpoints, user agent and timeouts.
    /// * `.geocoder(NominatimGeocoder)`: Optional. Defaults to the public Nominatim service.
    /// * `.reading_ttl(Duration)`: Optional. How long readings are reused. Defaults to one hour; `Duration::ZERO` disables the reading cache.
    /// * `.cache_folder(PathBuf)`: Optional. Where the downloaded catalog is kept. Without it the catalog is downloaded on every call.
    /// * `.lookback_days(u32)`: Optional. Window for single-reservoir lookups. Defaults to 365 days.
    /// * `.survey_options(SurveyOptions)`: Optional. Settings for [`ReservoirMonitor::survey`].
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::CacheDirCreation`] if the cache folder cannot be created.
    #[builder]
    pub async fn new(
        reservoirs: Option<Vec<ReservoirRecord>>,
        overrides: Option<HashMap<String, String>>,
        distance_model: Option<DistanceModel>,
        feed: Option<FeedConfig>,
        geocoder: Option<NominatimGeocoder>,
        reading_ttl: Option<Duration>,
        cache_folder: Option<PathBuf>,
        lookback_days: Option<u32>,
        survey_options: Option<SurveyOptions>,
    ) -> Result<Self, MonitorError> {
        let feed = feed.unwrap_or_default();
        let reading_ttl = reading_ttl.unwrap_or(DEFAULT_READING_TTL);

        let catalog_cache = match cache_folder {
            Some(folder) => {
                ensure_cache_dir_exists(&folder)
                    .await
                    .map_err(|e| MonitorError::CacheDirCreation(folder.clone(), e))?;
                Some(CatalogCache::new(&folder))
            }
            None => None,
        };

        let fetcher = TelemetryFetcher::new(feed.clone());
        let readings = if reading_ttl.is_zero() {
            ReadingSource::Direct(fetcher)
        } else {
            ReadingSource::Cached(ReadingCache::new(fetcher, reading_ttl))
        };

        let resolver = ReservoirResolver::new(
            reservoirs.unwrap_or_else(strategic_reservoirs),
            overrides.unwrap_or_else(city_overrides),
        )
        .with_distance_model(distance_model.unwrap_or_default());
        info!(
            "Monitoring {} reservoirs with {} city overrides",
            resolver.candidates().len(),
            resolver.overrides().len()
        );

        Ok(Self {
            resolver,
            readings,
            catalog: CatalogLoader::new(feed),
            catalog_cache,
            geocoder: geocoder.unwrap_or_default(),
            lookback_days: lookback_days.unwrap_or(DEFAULT_DETAIL_LOOKBACK_DAYS),
            survey_options: survey_options.unwrap_or_default(),
        })
    }

    /// A monitor with default settings that keeps the catalog in the per-user
    /// cache directory (e.g. `~/.cache/reservoir_monitor_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::CacheDirResolution`] if the default cache directory cannot be found.
    /// Returns [`MonitorError::CacheDirCreation`] if it cannot be created.
    pub async fn with_default_cache() -> Result<Self, MonitorError> {
        let cache_folder = get_cache_dir().map_err(MonitorError::CacheDirResolution)?;
        Self::builder().cache_folder(cache_folder).build().await
    }

    pub fn resolver(&self) -> &ReservoirResolver {
        &self.resolver
    }

    pub fn reservoirs(&self) -> &[ReservoirRecord] {
        self.resolver.candidates()
    }

    /// Picks the reference reservoir for a city.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Resolve`] when the monitor has no reservoirs.
    pub fn resolve(
        &self,
        city_name: &str,
        location: LatLon,
    ) -> Result<ResolutionResult, MonitorError> {
        Ok(self.resolver.resolve(city_name, location)?)
    }

    /// Latest usable reading of `reservoir`, or `None` when it is unavailable.
    ///
    /// Failures are logged and reported as `None`.
    ///
    /// # Arguments
    ///
    /// * `.reservoir(&ReservoirRecord)`: **Required.**
    /// * `.lookback_days(u32)`: Optional. Defaults to the monitor's look-back.
    /// * `.as_of(NaiveDate)`: Optional. End of the window. Defaults to today (local time).
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use reservoir_monitor::{MonitorError, ReservoirMonitor};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), MonitorError> {
    /// let monitor = ReservoirMonitor::builder().build().await?;
    /// let cantareira = &monitor.reservoirs()[0];
    /// let reading = monitor
    ///     .latest_reading()
    ///     .reservoir(cantareira)
    ///     .lookback_days(30)
    ///     .call()
    ///     .await;
    /// if let Some(reading) = reading {
    ///     println!("{}: {}", cantareira.name, reading);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn latest_reading(
        &self,
        reservoir: &ReservoirRecord,
        lookback_days: Option<u32>,
        as_of: Option<NaiveDate>,
    ) -> Option<TelemetryReading> {
        let lookback_days = lookback_days.unwrap_or(self.lookback_days);
        let now = as_of.unwrap_or_else(today);
        match self
            .readings
            .fetch(&reservoir.external_id, lookback_days, now)
            .await
        {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Telemetry unavailable for '{}': {}", reservoir.name, e);
                None
            }
        }
    }

    /// Resolves an already geocoded city and fetches its reservoir's reading.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Resolve`] when the monitor has no reservoirs. An
    /// unavailable reading is not an error.
    pub async fn report_for_place(
        &self,
        city_name: &str,
        place: &GeocodedPlace,
    ) -> Result<CityReport, MonitorError> {
        let resolution = self.resolve(city_name, place.location)?;
        let reading = self
            .latest_reading()
            .reservoir(&resolution.reservoir)
            .call()
            .await;
        Ok(CityReport {
            city: city_name.trim().to_string(),
            place: place.clone(),
            resolution,
            reading,
        })
    }

    /// Geocodes `city_name` and builds its report. `Ok(None)` means the city
    /// was not found.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Geocode`] when the geocoding service fails and
    /// [`MonitorError::Resolve`] when the monitor has no reservoirs.
    pub async fn report_for_city(
        &self,
        city_name: &str,
    ) -> Result<Option<CityReport>, MonitorError> {
        let Some(place) = self.geocoder.geocode(city_name).await? else {
            info!("City '{}' not found", city_name.trim());
            return Ok(None);
        };
        self.report_for_place(city_name, &place).await.map(Some)
    }

    /// Latest readings of every monitored reservoir, for the national map.
    pub async fn survey(&self) -> NationalPanorama {
        survey_reservoirs(
            self.readings.fetcher(),
            self.resolver.candidates(),
            today(),
            &self.survey_options,
        )
        .await
    }

    /// The full reservoir registry; empty when it cannot be downloaded and no
    /// fresh copy is cached.
    pub async fn full_catalog(&self) -> Vec<CatalogEntry> {
        match &self.catalog_cache {
            Some(cache) => self.catalog.load_full_catalog_cached(cache).await,
            None => self.catalog.load_full_catalog().await,
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
