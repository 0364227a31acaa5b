//! National panorama: the latest reading of every reservoir in a set, with
//! risk bands and aggregate figures for a map view.

use crate::feed::config::{DEFAULT_SURVEY_LOOKBACK_DAYS, DEFAULT_SURVEY_TIMEOUT};
use crate::telemetry::fetcher::TelemetryFetcher;
use crate::types::reading::TelemetryReading;
use crate::types::reservoir::ReservoirRecord;
use crate::types::status::{RiskLevel, RiskThresholds};
use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a survey queries the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyOptions {
    pub lookback_days: u32,
    /// Timeout for each reservoir's request.
    pub timeout: Duration,
    /// Maximum number of requests in flight.
    pub concurrency: usize,
    pub thresholds: RiskThresholds,
}

impl Default for SurveyOptions {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_SURVEY_LOOKBACK_DAYS,
            timeout: DEFAULT_SURVEY_TIMEOUT,
            concurrency: 4,
            thresholds: RiskThresholds::default(),
        }
    }
}

/// One reservoir with a reading, ready to be plotted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirSnapshot {
    pub reservoir: ReservoirRecord,
    pub reading: TelemetryReading,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalPanorama {
    /// Reservoirs that returned a reading, in the order they were surveyed.
    pub snapshots: Vec<ReservoirSnapshot>,
    /// Number of reservoirs queried, with or without a reading.
    pub surveyed: usize,
}

impl NationalPanorama {
    /// Number of reservoirs with a reading.
    pub fn monitored(&self) -> usize {
        self.snapshots.len()
    }

    pub fn unavailable(&self) -> usize {
        self.surveyed.saturating_sub(self.snapshots.len())
    }

    pub fn critical_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|s| s.risk == RiskLevel::Critical)
            .count()
    }

    /// Mean fill level across reservoirs with a reading.
    pub fn mean_volume(&self) -> Option<f64> {
        if self.snapshots.is_empty() {
            return None;
        }
        let total: f64 = self
            .snapshots
            .iter()
            .map(|s| s.reading.volume_percent)
            .sum();
        Some(total / self.snapshots.len() as f64)
    }
}

/// Fetches the latest reading of each reservoir; reservoirs without one are
/// left out of the panorama.
pub async fn survey_reservoirs(
    fetcher: &TelemetryFetcher,
    reservoirs: &[ReservoirRecord],
    now: NaiveDate,
    options: &SurveyOptions,
) -> NationalPanorama {
    let snapshots: Vec<Option<ReservoirSnapshot>> = stream::iter(reservoirs)
        .map(|reservoir| async move {
            let outcome = fetcher
                .fetch_latest_reading_with_timeout(
                    &reservoir.external_id,
                    options.lookback_days,
                    now,
                    options.timeout,
                )
                .await;
            match outcome {
                Ok(Some(reading)) => Some(ReservoirSnapshot {
                    risk: options.thresholds.classify(reading.volume_percent),
                    reservoir: reservoir.clone(),
                    reading,
                }),
                Ok(None) => None,
                Err(e) => {
                    warn!("Skipping '{}' in survey: {}", reservoir.name, e);
                    None
                }
            }
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let panorama = NationalPanorama {
        snapshots: snapshots.into_iter().flatten().collect(),
        surveyed: reservoirs.len(),
    };
    info!(
        "Surveyed {} reservoirs: {} with readings, {} critical",
        panorama.surveyed,
        panorama.monitored(),
        panorama.critical_count()
    );
    panorama
}
