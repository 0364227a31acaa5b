//! Fill-level classifications used by front-ends to colour and flag readings.
//!
//! These are presentation policies rather than part of the lookup itself, so
//! every threshold is configurable; the defaults are the values the original
//! dashboards displayed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default level below which a reservoir is flagged as critically low.
pub const DEFAULT_LOW_LEVEL_THRESHOLD: f64 = 20.0;

/// Status shown next to a single reservoir's reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillStatus {
    /// Above 60 %.
    Comfortable,
    /// Above 30 %, up to 60 %.
    Alert,
    /// 30 % or less.
    Critical,
}

impl FillStatus {
    pub fn classify(volume_percent: f64) -> Self {
        if volume_percent > 60.0 {
            FillStatus::Comfortable
        } else if volume_percent > 30.0 {
            FillStatus::Alert
        } else {
            FillStatus::Critical
        }
    }
}

impl fmt::Display for FillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FillStatus::Comfortable => "comfortable",
            FillStatus::Alert => "alert",
            FillStatus::Critical => "critical",
        };
        f.pad(label)
    }
}

/// Whether a reading should trigger the "save water" warning.
pub fn is_low(volume_percent: f64, threshold: f64) -> bool {
    volume_percent < threshold
}

/// Risk band used on the national map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Normal,
    Attention,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Normal => "normal",
            RiskLevel::Attention => "attention",
            RiskLevel::Critical => "critical",
        };
        f.pad(label)
    }
}

/// Upper bounds (exclusive) of the [`RiskLevel`] bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub critical_below: f64,
    pub attention_below: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_below: DEFAULT_LOW_LEVEL_THRESHOLD,
            attention_below: 40.0,
        }
    }
}

impl RiskThresholds {
    pub fn classify(&self, volume_percent: f64) -> RiskLevel {
        if volume_percent < self.critical_below {
            RiskLevel::Critical
        } else if volume_percent < self.attention_below {
            RiskLevel::Attention
        } else {
            RiskLevel::Normal
        }
    }
}
