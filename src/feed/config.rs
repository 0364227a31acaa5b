//! Connection settings shared by the telemetry and catalog clients.

use std::time::Duration;

/// Base URL of the ANA SAR web service.
pub const DEFAULT_SAR_BASE_URL: &str = "http://sarws.ana.gov.br/SarService.asmx";

/// The SAR service rejects default HTTP client identifiers.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Bulletin group of the national interconnected system (`boletim=sin`).
pub const SIN_BULLETIN: &str = "sin";

pub const HISTORICAL_READINGS_ENDPOINT: &str = "DadosHistoricos";
pub const CATALOG_ENDPOINT: &str = "ListaReservatorios";

/// Timeout for a single-reservoir detail lookup.
pub const DEFAULT_DETAIL_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout per reservoir while surveying many of them.
pub const DEFAULT_SURVEY_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Look-back for detail lookups. Semi-arid stations can go months without reporting.
pub const DEFAULT_DETAIL_LOOKBACK_DAYS: u32 = 365;
pub const DEFAULT_SURVEY_LOOKBACK_DAYS: u32 = 90;

/// Where and how to reach the SAR feeds.
///
/// # Examples
///
/// ```
/// use reservoir_monitor::FeedConfig;
/// use std::time::Duration;
///
/// let config = FeedConfig {
///     detail_timeout: Duration::from_secs(30),
///     ..FeedConfig::default()
/// };
/// assert_eq!(
///     config.endpoint("DadosHistoricos"),
///     "http://sarws.ana.gov.br/SarService.asmx/DadosHistoricos"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Opaque `boletim` query parameter.
    pub bulletin: String,
    pub detail_timeout: Duration,
    pub catalog_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SAR_BASE_URL.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            bulletin: SIN_BULLETIN.to_string(),
            detail_timeout: DEFAULT_DETAIL_TIMEOUT,
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
        }
    }
}

impl FeedConfig {
    /// Default settings pointed at another host, e.g. a mirror or a local stub.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}
