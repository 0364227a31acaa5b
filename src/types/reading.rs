//! Telemetry values produced per request: the reading itself and the date
//! window it was looked up in.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day/month/year, the format the SAR feed uses for both query parameters and
/// the dates it reports.
pub const FEED_DATE_FORMAT: &str = "%d/%m/%Y";

/// The latest usable fill-level reading of a reservoir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    /// Percentage of useful storage. Usually 0–100, but values outside that
    /// range are kept exactly as reported.
    pub volume_percent: f64,
    /// Day the measurement refers to.
    pub measured_on: NaiveDate,
}

impl TelemetryReading {
    /// The measurement date formatted as `dd/mm/yyyy`.
    pub fn measurement_date(&self) -> String {
        self.measured_on.format(FEED_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for TelemetryReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}% on {}",
            self.volume_percent,
            self.measurement_date()
        )
    }
}

/// Inclusive date range sent to the historical-readings endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReadingWindow {
    /// The window `[now - lookback_days, now]`.
    ///
    /// Saturates at the earliest representable date instead of failing for
    /// absurdly large look-backs.
    pub fn ending_at(now: NaiveDate, lookback_days: u32) -> Self {
        let start = now
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: now }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `(dataInicial, dataFinal)` as the feed expects them.
    pub fn query_dates(&self) -> (String, String) {
        (
            self.start.format(FEED_DATE_FORMAT).to_string(),
            self.end.format(FEED_DATE_FORMAT).to_string(),
        )
    }
}
