//! Reminder model
//!
//! A daily scheduled event ("Take morning medication at 08:00"). The kind
//! is derived from the message by an ordered keyword table so the policy is
//! data rather than a cascade of conditionals.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Category of a reminder, used by the dashboard to pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Medication,
    Exercise,
    Hydration,
    Appointment,
    Event,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Medication => "medication",
            ReminderKind::Exercise => "exercise",
            ReminderKind::Hydration => "hydration",
            ReminderKind::Appointment => "appointment",
            ReminderKind::Event => "event",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "medication" => Some(ReminderKind::Medication),
            "exercise" => Some(ReminderKind::Exercise),
            "hydration" => Some(ReminderKind::Hydration),
            "appointment" => Some(ReminderKind::Appointment),
            "event" => Some(ReminderKind::Event),
            _ => None,
        }
    }
}

/// Ordered keyword table for classifying reminder messages, first match wins
const KIND_KEYWORDS: &[(&str, ReminderKind)] = &[
    ("medication", ReminderKind::Medication),
    ("exercise", ReminderKind::Exercise),
    ("hydration", ReminderKind::Hydration),
    ("appointment", ReminderKind::Appointment),
];

/// A daily reminder with a clock time-of-day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub message: String,
    /// Clock time "HH:MM" (24-hour)
    pub time: String,
    pub kind: ReminderKind,
}

impl Reminder {
    /// Build a reminder, classifying its kind from the message text
    pub fn new(message: impl Into<String>, time: impl Into<String>) -> Self {
        let message = message.into();
        let kind = classify_message(&message);
        Self {
            message,
            time: time.into(),
            kind,
        }
    }

    /// Create from a database row
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind: String = row.get("kind")?;
        Ok(Self {
            message: row.get("message")?,
            time: row.get("time")?,
            kind: ReminderKind::from_str(&kind).unwrap_or(ReminderKind::Event),
        })
    }
}

/// Classify a reminder message into a kind, first keyword match wins
pub fn classify_message(message: &str) -> ReminderKind {
    let lower = message.to_lowercase();
    for (keyword, kind) in KIND_KEYWORDS {
        if lower.contains(keyword) {
            return *kind;
        }
    }
    ReminderKind::Event
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_keyword() {
        assert_eq!(
            classify_message("Take morning medication"),
            ReminderKind::Medication
        );
        assert_eq!(classify_message("Light exercise"), ReminderKind::Exercise);
        assert_eq!(
            classify_message("Hydration check"),
            ReminderKind::Hydration
        );
        assert_eq!(
            classify_message("Doctor appointment"),
            ReminderKind::Appointment
        );
        assert_eq!(classify_message("Call family"), ReminderKind::Event);
    }

    #[test]
    fn test_first_match_wins() {
        // Mentions both medication and appointment; medication is earlier in the table.
        assert_eq!(
            classify_message("Appointment to review medication"),
            ReminderKind::Medication
        );
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            ReminderKind::Medication,
            ReminderKind::Exercise,
            ReminderKind::Hydration,
            ReminderKind::Appointment,
            ReminderKind::Event,
        ] {
            assert_eq!(ReminderKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
