//! Transparent, time-bounded reuse of telemetry answers.

use crate::telemetry::error::TelemetryError;
use crate::telemetry::fetcher::TelemetryFetcher;
use crate::types::reading::TelemetryReading;
use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// How long a reading is reused before the feed is asked again.
pub const DEFAULT_READING_TTL: Duration = Duration::from_secs(60 * 60);

type CacheKey = (String, u32, NaiveDate);

struct CachedOutcome {
    fetched_at: Instant,
    reading: Option<TelemetryReading>,
}

/// A [`TelemetryFetcher`] that remembers answers per
/// `(reservoir, look-back, window end)`.
///
/// Both "found a reading" and "feed answered, nothing usable" are remembered;
/// errors are not, so the next call tries the feed again.
pub struct ReadingCache {
    fetcher: TelemetryFetcher,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CachedOutcome>>,
}

impl ReadingCache {
    pub fn new(fetcher: TelemetryFetcher, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn fetcher(&self) -> &TelemetryFetcher {
        &self.fetcher
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn fetch_latest_reading(
        &self,
        external_id: &str,
        lookback_days: u32,
        now: NaiveDate,
    ) -> Result<Option<TelemetryReading>, TelemetryError> {
        let key = (external_id.to_string(), lookback_days, now);

        {
            let entries = self.entries.lock().await;
            if let Some(cached) = entries.get(&key) {
                if cached.fetched_at.elapsed() < self.ttl {
                    debug!("Reading cache hit for reservoir {}", external_id);
                    return Ok(cached.reading.clone());
                }
            }
        } // lock released before the network call

        let reading = self
            .fetcher
            .fetch_latest_reading(external_id, lookback_days, now)
            .await?;

        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            CachedOutcome {
                fetched_at: Instant::now(),
                reading: reading.clone(),
            },
        );
        Ok(reading)
    }

    /// Forgets every remembered answer.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
