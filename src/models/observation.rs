//! Observation model
//!
//! One timestamped vital-signs snapshot for a user: headline vitals
//! (heart rate, blood pressure, oxygen, temperature, glucose) plus the
//! optional wellbeing fields from the daily health check. Validation
//! happens exactly once, when a draft is turned into an `Observation`;
//! persisted observations are immutable and never re-validated on read.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failure for a single submitted field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} out of range: {value} (expected {min}-{max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("malformed blood pressure reading: {0} (expected systolic/diastolic, e.g. 120/80)")]
    MalformedBloodPressure(String),

    #[error("timestamp {newer} is earlier than the latest recorded observation {latest}")]
    OutOfOrder { newer: String, latest: String },
}

/// Device-plausible bounds, checked at creation time
pub mod bounds {
    pub const HEART_RATE: (f64, f64) = (40.0, 200.0);
    pub const OXYGEN_LEVEL: (f64, f64) = (70.0, 100.0);
    pub const TEMPERATURE_F: (f64, f64) = (90.0, 110.0);
    pub const GLUCOSE_MG_DL: (f64, f64) = (20.0, 600.0);
    pub const SYSTOLIC: (f64, f64) = (60.0, 250.0);
    pub const DIASTOLIC: (f64, f64) = (30.0, 150.0);
    pub const SLEEP_HOURS: (f64, f64) = (0.0, 24.0);
    pub const PAIN_LEVEL_MAX: u8 = 10;
    pub const MOOD_MAX: u8 = 5;
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Light",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::Active => "Active",
            ActivityLevel::VeryActive => "Very Active",
        }
    }
}

/// A blood pressure reading, kept in the wire form "systolic/diastolic"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

impl BloodPressure {
    /// Parse a "120/80" style reading and check device bounds
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let (sys, dia) = s
            .split_once('/')
            .ok_or_else(|| ValidationError::MalformedBloodPressure(s.to_string()))?;

        let systolic: f64 = sys
            .trim()
            .parse()
            .map_err(|_| ValidationError::MalformedBloodPressure(s.to_string()))?;
        let diastolic: f64 = dia
            .trim()
            .parse()
            .map_err(|_| ValidationError::MalformedBloodPressure(s.to_string()))?;

        check_range("blood_pressure.systolic", systolic, bounds::SYSTOLIC)?;
        check_range("blood_pressure.diastolic", diastolic, bounds::DIASTOLIC)?;
        if systolic <= diastolic {
            return Err(ValidationError::MalformedBloodPressure(s.to_string()));
        }

        Ok(Self {
            systolic,
            diastolic,
        })
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Serialization goes through this string, so it must not lose
        // fractional readings: "120/80" for integral values, "120.5/80"
        // otherwise.
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

impl TryFrom<String> for BloodPressure {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<BloodPressure> for String {
    fn from(bp: BloodPressure) -> Self {
        bp.to_string()
    }
}

/// A validated, immutable vital-signs snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub user_id: String,
    /// RFC 3339, valid by construction
    pub timestamp: String,
    pub heart_rate: Option<f64>,
    pub blood_pressure: Option<BloodPressure>,
    pub oxygen_level: Option<f64>,
    pub temperature: Option<f64>,
    pub glucose_level: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub took_medication: Option<bool>,
    pub pain_level: Option<u8>,
    pub mood: Option<u8>,
    pub notes: Option<String>,
}

/// Unvalidated form input for one observation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationDraft {
    pub user_id: String,
    /// Defaults to the submission instant when absent
    pub timestamp: Option<String>,
    pub heart_rate: Option<f64>,
    /// "systolic/diastolic", e.g. "120/80"
    pub blood_pressure: Option<String>,
    pub oxygen_level: Option<f64>,
    pub temperature: Option<f64>,
    pub glucose_level: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub took_medication: Option<bool>,
    pub pain_level: Option<u8>,
    pub mood: Option<u8>,
    pub notes: Option<String>,
}

fn check_range(
    field: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl ObservationDraft {
    /// Validate the draft into an immutable `Observation`
    pub fn validate(self) -> Result<Observation, ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }

        let timestamp = match self.timestamp {
            Some(ts) => {
                DateTime::parse_from_rfc3339(&ts)
                    .map_err(|_| ValidationError::InvalidTimestamp(ts.clone()))?;
                ts
            }
            None => Utc::now().to_rfc3339(),
        };

        if let Some(hr) = self.heart_rate {
            check_range("heart_rate", hr, bounds::HEART_RATE)?;
        }
        if let Some(o2) = self.oxygen_level {
            check_range("oxygen_level", o2, bounds::OXYGEN_LEVEL)?;
        }
        if let Some(temp) = self.temperature {
            check_range("temperature", temp, bounds::TEMPERATURE_F)?;
        }
        if let Some(glucose) = self.glucose_level {
            check_range("glucose_level", glucose, bounds::GLUCOSE_MG_DL)?;
        }
        if let Some(sleep) = self.sleep_hours {
            check_range("sleep_hours", sleep, bounds::SLEEP_HOURS)?;
        }
        if let Some(pain) = self.pain_level {
            if pain > bounds::PAIN_LEVEL_MAX {
                return Err(ValidationError::OutOfRange {
                    field: "pain_level",
                    value: pain as f64,
                    min: 0.0,
                    max: bounds::PAIN_LEVEL_MAX as f64,
                });
            }
        }
        if let Some(mood) = self.mood {
            if mood > bounds::MOOD_MAX {
                return Err(ValidationError::OutOfRange {
                    field: "mood",
                    value: mood as f64,
                    min: 0.0,
                    max: bounds::MOOD_MAX as f64,
                });
            }
        }

        let blood_pressure = self
            .blood_pressure
            .as_deref()
            .map(BloodPressure::parse)
            .transpose()?;

        Ok(Observation {
            user_id: self.user_id,
            timestamp,
            heart_rate: self.heart_rate,
            blood_pressure,
            oxygen_level: self.oxygen_level,
            temperature: self.temperature,
            glucose_level: self.glucose_level,
            sleep_hours: self.sleep_hours,
            activity_level: self.activity_level,
            took_medication: self.took_medication,
            pain_level: self.pain_level,
            mood: self.mood,
            notes: self.notes,
        })
    }
}

impl Observation {
    /// Create from a database row
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let activity: Option<String> = row.get("activity_level")?;
        let systolic: Option<f64> = row.get("bp_systolic")?;
        let diastolic: Option<f64> = row.get("bp_diastolic")?;

        let blood_pressure = match (systolic, diastolic) {
            (Some(systolic), Some(diastolic)) => Some(BloodPressure {
                systolic,
                diastolic,
            }),
            _ => None,
        };

        Ok(Self {
            user_id: row.get("user_id")?,
            timestamp: row.get("timestamp")?,
            heart_rate: row.get("heart_rate")?,
            blood_pressure,
            oxygen_level: row.get("oxygen_level")?,
            temperature: row.get("temperature")?,
            glucose_level: row.get("glucose_level")?,
            sleep_hours: row.get("sleep_hours")?,
            activity_level: activity.as_deref().and_then(ActivityLevel::from_str),
            took_medication: row.get("took_medication")?,
            pain_level: row.get("pain_level")?,
            mood: row.get("mood")?,
            notes: row.get("notes")?,
        })
    }

    /// Parsed form of the timestamp; total for validated observations
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(user: &str) -> ObservationDraft {
        ObservationDraft {
            user_id: user.to_string(),
            timestamp: Some("2025-03-01T08:30:00Z".to_string()),
            heart_rate: Some(72.0),
            blood_pressure: Some("120/80".to_string()),
            oxygen_level: Some(98.0),
            temperature: Some(98.2),
            glucose_level: Some(105.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        let obs = draft("alice").validate().unwrap();
        assert_eq!(obs.user_id, "alice");
        assert_eq!(obs.oxygen_level, Some(98.0));
        assert_eq!(obs.blood_pressure.unwrap().to_string(), "120/80");
    }

    #[test]
    fn test_missing_user_id_rejected() {
        assert_eq!(
            draft("  ").validate().unwrap_err(),
            ValidationError::MissingField("user_id")
        );
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let mut d = draft("alice");
        d.timestamp = Some("yesterday at noon".to_string());
        assert!(matches!(
            d.validate().unwrap_err(),
            ValidationError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn test_missing_timestamp_defaults_to_now() {
        let mut d = draft("alice");
        d.timestamp = None;
        let obs = d.validate().unwrap();
        assert!(obs.parsed_timestamp().is_some());
    }

    #[test]
    fn test_oxygen_below_device_bound_rejected() {
        let mut d = draft("alice");
        d.oxygen_level = Some(50.0);
        assert!(matches!(
            d.validate().unwrap_err(),
            ValidationError::OutOfRange {
                field: "oxygen_level",
                ..
            }
        ));
    }

    #[test]
    fn test_heart_rate_bounds() {
        let mut d = draft("alice");
        d.heart_rate = Some(39.0);
        assert!(d.validate().is_err());

        let mut d = draft("alice");
        d.heart_rate = Some(201.0);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_blood_pressure_parsing() {
        assert!(BloodPressure::parse("120/80").is_ok());
        assert!(BloodPressure::parse("120-80").is_err());
        assert!(BloodPressure::parse("eighty/forty").is_err());
        // systolic must exceed diastolic
        assert!(BloodPressure::parse("80/120").is_err());
    }

    #[test]
    fn test_activity_level_round_trip() {
        for level in [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ] {
            assert_eq!(ActivityLevel::from_str(level.as_str()), Some(level));
        }
        assert_eq!(ActivityLevel::from_str("Very Active"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::from_str("couch"), None);
    }

    #[test]
    fn test_observation_json_round_trip() {
        let obs = draft("alice").validate().unwrap();
        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, back);
    }

    #[test]
    fn test_fractional_blood_pressure_round_trips() {
        // Home monitors can report fractional averages; the string form
        // must carry them through serialization unchanged.
        let bp = BloodPressure::parse("120.5/80").unwrap();
        assert_eq!(bp.to_string(), "120.5/80");

        let mut d = draft("alice");
        d.blood_pressure = Some("120.5/80.25".to_string());
        let obs = d.validate().unwrap();

        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, back);
        assert_eq!(back.blood_pressure.unwrap().systolic, 120.5);
    }

    #[test]
    fn test_pain_and_mood_caps() {
        let mut d = draft("alice");
        d.pain_level = Some(11);
        assert!(d.validate().is_err());

        let mut d = draft("alice");
        d.mood = Some(6);
        assert!(d.validate().is_err());
    }
}
