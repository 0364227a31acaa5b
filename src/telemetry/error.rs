use crate::feed::xml::FeedXmlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed telemetry response from {url}")]
    MalformedResponse {
        url: String,
        #[source]
        source: FeedXmlError,
    },
}

impl TelemetryError {
    pub fn is_timeout(&self) -> bool {
        match self {
            TelemetryError::NetworkRequest(_, e) => e.is_timeout(),
            _ => false,
        }
    }
}
