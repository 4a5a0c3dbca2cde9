//! Data models
//!
//! Rust structs representing observations, reminders, and chat turns.

mod chat;
mod observation;
mod reminder;

pub use chat::{ChatTurn, Role};
pub use observation::{
    bounds, ActivityLevel, BloodPressure, Observation, ObservationDraft, ValidationError,
};
pub use reminder::{classify_message, Reminder, ReminderKind};
