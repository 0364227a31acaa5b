use crate::feed::config::{FeedConfig, HISTORICAL_READINGS_ENDPOINT};
use crate::telemetry::error::TelemetryError;
use crate::telemetry::parser::parse_readings_response;
use crate::types::reading::{ReadingWindow, TelemetryReading};
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;

/// Looks up the latest fill level of a reservoir in the SAR historical feed.
///
/// Each call issues exactly one request; nothing is retried or cached here.
/// Wrap the fetcher in a [`crate::ReadingCache`] to reuse recent answers.
#[derive(Debug, Clone)]
pub struct TelemetryFetcher {
    client: Client,
    config: FeedConfig,
}

impl TelemetryFetcher {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Fetches the most recent usable reading in `[now - lookback_days, now]`,
    /// using the configured detail timeout.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(reading))` for the newest record with both a numeric volume
    ///   and a valid date.
    /// * `Ok(None)` when the feed answered but no record in the window is
    ///   usable (including an empty answer).
    ///
    /// # Errors
    ///
    /// [`TelemetryError`] for connection failures and timeouts, non-success
    /// HTTP statuses, and bodies that are not a well-formed XML document.
    pub async fn fetch_latest_reading(
        &self,
        external_id: &str,
        lookback_days: u32,
        now: NaiveDate,
    ) -> Result<Option<TelemetryReading>, TelemetryError> {
        self.fetch_latest_reading_with_timeout(
            external_id,
            lookback_days,
            now,
            self.config.detail_timeout,
        )
        .await
    }

    /// Same as [`TelemetryFetcher::fetch_latest_reading`] with an explicit timeout.
    pub async fn fetch_latest_reading_with_timeout(
        &self,
        external_id: &str,
        lookback_days: u32,
        now: NaiveDate,
        timeout: Duration,
    ) -> Result<Option<TelemetryReading>, TelemetryError> {
        let window = ReadingWindow::ending_at(now, lookback_days);
        let (url, body) = self.download(external_id, &window, timeout).await?;

        let reading = parse_readings_response(&body, &window)
            .map_err(|source| TelemetryError::MalformedResponse { url, source })?;
        match &reading {
            Some(r) => info!("Reservoir {}: {}", external_id, r),
            None => info!(
                "Reservoir {}: no usable reading in the last {} days",
                external_id, lookback_days
            ),
        }
        Ok(reading)
    }

    /// Fetches the latest reading and collapses every failure into `None`.
    ///
    /// Unreachable feed, malformed answer and "no data in the window" all look
    /// the same to the caller; the cause is logged.
    pub async fn latest_reading_or_unavailable(
        &self,
        external_id: &str,
        lookback_days: u32,
        now: NaiveDate,
    ) -> Option<TelemetryReading> {
        match self
            .fetch_latest_reading(external_id, lookback_days, now)
            .await
        {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Telemetry unavailable for reservoir {}: {}", external_id, e);
                None
            }
        }
    }

    /// Requests the window and returns the final URL with the response body.
    async fn download(
        &self,
        external_id: &str,
        window: &ReadingWindow,
        timeout: Duration,
    ) -> Result<(String, String), TelemetryError> {
        let endpoint = self.config.endpoint(HISTORICAL_READINGS_ENDPOINT);
        let (start, end) = window.query_dates();

        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("boletim", self.config.bulletin.as_str()),
                ("reservatorio", external_id),
                ("dataInicial", start.as_str()),
                ("dataFinal", end.as_str()),
            ])
            .header(USER_AGENT, &self.config.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TelemetryError::NetworkRequest(endpoint.clone(), e))?;
        let url = response.url().to_string();

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    TelemetryError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    TelemetryError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| TelemetryError::NetworkRequest(url.clone(), e))?;
        Ok((url, body))
    }
}
