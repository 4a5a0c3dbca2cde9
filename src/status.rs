//! Status classification
//!
//! Derives a qualitative triage bucket from the latest observation. Only
//! oxygen saturation gates the level; other vitals contribute additional
//! reasons without changing it, so the level stays deterministic and
//! single-cause. Results are derived on every read and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Observation;

/// Oxygen saturation below this is an emergency
pub const OXYGEN_DANGER_BELOW: f64 = 90.0;
/// Oxygen saturation below this (but at or above the danger line) is borderline
pub const OXYGEN_WARNING_BELOW: f64 = 95.0;

/// Resting heart rate range; excursions are reported but do not gate the level
const HEART_RATE_RESTING: (f64, f64) = (60.0, 100.0);
/// Normal body temperature range in degrees Fahrenheit
const TEMPERATURE_NORMAL_F: (f64, f64) = (97.0, 99.0);

/// Qualitative triage bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusLevel {
    Normal,
    Warning,
    Danger,
}

impl StatusLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "NORMAL",
            StatusLevel::Warning => "WARNING",
            StatusLevel::Danger => "DANGER",
        }
    }

    /// Display color used by the dashboard
    pub fn color(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "success",
            StatusLevel::Warning => "warning",
            StatusLevel::Danger => "error",
        }
    }

    /// Whether this level warrants caregiver attention
    pub fn is_concerning(&self) -> bool {
        matches!(self, StatusLevel::Warning | StatusLevel::Danger)
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived status for one observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResult {
    pub level: StatusLevel,
    /// Ordered, human-readable explanations; the level-deciding reason first
    pub reasons: Vec<String>,
}

/// Classify an observation into a status level with reasons.
///
/// Total: a missing oxygen reading yields `Normal` with an
/// "insufficient data" reason rather than an error.
pub fn classify(obs: &Observation) -> StatusResult {
    let mut reasons = Vec::new();

    let level = match obs.oxygen_level {
        Some(o2) if o2 < OXYGEN_DANGER_BELOW => {
            reasons.push("low oxygen saturation".to_string());
            StatusLevel::Danger
        }
        Some(o2) if o2 < OXYGEN_WARNING_BELOW => {
            reasons.push("borderline oxygen saturation".to_string());
            StatusLevel::Warning
        }
        Some(_) => StatusLevel::Normal,
        None => {
            reasons.push("insufficient data".to_string());
            StatusLevel::Normal
        }
    };

    if let Some(hr) = obs.heart_rate {
        let (low, high) = HEART_RATE_RESTING;
        if hr < low || hr > high {
            reasons.push("heart rate outside resting range".to_string());
        }
    }
    if let Some(temp) = obs.temperature {
        let (low, high) = TEMPERATURE_NORMAL_F;
        if temp < low || temp > high {
            reasons.push("temperature outside normal range".to_string());
        }
    }

    StatusResult { level, reasons }
}
