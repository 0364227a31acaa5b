//! Tolerant parsing of the historical-readings response.
//!
//! Gaps are the norm in this feed: on any given day the volume or the date may
//! be missing, empty, or written with a comma decimal separator. Each record
//! is turned into either a [`TelemetryReading`] or a [`RecordDefect`], and the
//! scan only moves on when a record is defective.

use crate::feed::xml::{extract_records, FeedXmlError, XmlRecord};
use crate::types::reading::{ReadingWindow, TelemetryReading, FEED_DATE_FORMAT};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use thiserror::Error;

pub const RECORD_TAG: &str = "Reservatorio";
pub const VOLUME_FIELD: &str = "VolumePercentual";
pub const DATE_FIELD: &str = "DataInformacao";

const DATE_FORMATS: [&str; 2] = [FEED_DATE_FORMAT, "%Y-%m-%d"];
const DATETIME_FORMATS: [&str; 5] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Why a single daily record cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordDefect {
    #[error("no volume reported")]
    MissingVolume,

    #[error("volume '{0}' is not a number")]
    InvalidVolume(String),

    #[error("no measurement date reported")]
    MissingDate,

    #[error("measurement date '{0}' is not a recognised date")]
    InvalidDate(String),

    #[error("measurement date {0} is outside the requested window")]
    OutsideWindow(NaiveDate),
}

/// Parses a percentage such as `"42,5"` or `"42.5"`.
///
/// # Examples
///
/// ```
/// use reservoir_monitor::parse_volume_percent;
///
/// assert_eq!(parse_volume_percent("7,3"), Ok(7.3));
/// assert_eq!(parse_volume_percent(" 7.3 "), Ok(7.3));
/// assert!(parse_volume_percent("").is_err());
/// ```
pub fn parse_volume_percent(text: &str) -> Result<f64, RecordDefect> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RecordDefect::MissingVolume);
    }
    parse_decimal(text).ok_or_else(|| RecordDefect::InvalidVolume(text.to_string()))
}

/// Parses a finite decimal written with either a comma or a dot separator.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses the feed's measurement date. Day/month/year is what the feed
/// normally sends; ISO dates and datetimes are accepted as well.
pub fn parse_measurement_date(text: &str) -> Result<NaiveDate, RecordDefect> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RecordDefect::MissingDate);
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.date_naive());
    }
    Err(RecordDefect::InvalidDate(text.to_string()))
}

/// Turns one daily record into a reading, if it is usable within `window`.
pub fn reading_from_record(
    record: &XmlRecord,
    window: &ReadingWindow,
) -> Result<TelemetryReading, RecordDefect> {
    let volume_percent = record
        .get(VOLUME_FIELD)
        .ok_or(RecordDefect::MissingVolume)
        .and_then(parse_volume_percent)?;
    let measured_on = record
        .get(DATE_FIELD)
        .ok_or(RecordDefect::MissingDate)
        .and_then(parse_measurement_date)?;
    if !window.contains(measured_on) {
        return Err(RecordDefect::OutsideWindow(measured_on));
    }
    Ok(TelemetryReading {
        volume_percent,
        measured_on,
    })
}

/// Scans `records` from the most recent (last) to the oldest and returns the
/// first usable reading.
pub fn latest_valid_reading(
    records: &[XmlRecord],
    window: &ReadingWindow,
) -> Option<TelemetryReading> {
    for (index, record) in records.iter().enumerate().rev() {
        match reading_from_record(record, window) {
            Ok(reading) => return Some(reading),
            Err(defect) => debug!("Skipping record {}: {}", index, defect),
        }
    }
    None
}

/// Parses a full historical-readings response body.
///
/// `Ok(None)` means the document was readable but held no usable reading.
pub fn parse_readings_response(
    body: &str,
    window: &ReadingWindow,
) -> Result<Option<TelemetryReading>, FeedXmlError> {
    let records = extract_records(body, Some(RECORD_TAG))?;
    Ok(latest_valid_reading(&records, window))
}
