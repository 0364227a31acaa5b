mod catalog;
mod error;
mod feed;
mod geocode;
mod monitor;
mod reference;
mod resolver;
mod survey;
mod telemetry;
mod types;
mod utils;

pub use error::MonitorError;
pub use monitor::*;

pub use resolver::error::ResolveError;
pub use resolver::resolve::*;

pub use telemetry::cached::{ReadingCache, DEFAULT_READING_TTL};
pub use telemetry::error::TelemetryError;
pub use telemetry::fetcher::TelemetryFetcher;
pub use telemetry::parser::{
    latest_valid_reading, parse_measurement_date, parse_readings_response,
    parse_volume_percent, reading_from_record, RecordDefect,
};

pub use catalog::disk_cache::{CatalogCache, CATALOG_CACHE_FILE_NAME, DEFAULT_CATALOG_TTL};
pub use catalog::error::CatalogError;
pub use catalog::loader::{parse_catalog, CatalogLoader};

pub use feed::config::*;
pub use feed::xml::{extract_records, FeedXmlError, XmlRecord};

pub use geocode::*;
pub use reference::{city_overrides, strategic_reservoirs};
pub use survey::*;

pub use types::reading::*;
pub use types::reservoir::*;
pub use types::status::*;

pub use utils::get_cache_dir;
