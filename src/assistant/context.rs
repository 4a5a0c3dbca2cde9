//! Prompt context assembly
//!
//! Builds the bounded payload handed to the completion service: current
//! wall-clock time, the latest observation's four headline vitals as
//! human-readable strings, and the user's question verbatim. Building a
//! context is total; a user with no observations gets the no-data sentinel.

use chrono::{DateTime, Local};

use crate::models::Observation;

/// Vitals section shown when the user has no observations yet
pub const NO_DATA_SENTINEL: &str = "No health data available yet";

/// Placeholder for an individual vital the observation lacks
const NOT_RECORDED: &str = "N/A";

/// Headline vitals rendered for the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsSnapshot {
    pub heart_rate: String,
    pub blood_pressure: String,
    pub oxygen_level: String,
    pub temperature: String,
}

impl VitalsSnapshot {
    fn from_observation(obs: &Observation) -> Self {
        Self {
            heart_rate: obs
                .heart_rate
                .map(|hr| format!("{} BPM", hr))
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
            blood_pressure: obs
                .blood_pressure
                .map(|bp| bp.to_string())
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
            oxygen_level: obs
                .oxygen_level
                .map(|o2| format!("{}%", o2))
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
            temperature: obs
                .temperature
                .map(|t| format!("{:.1}°F", t))
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
        }
    }
}

/// The assembled context for one question to the assistant
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub generated_at: DateTime<Local>,
    pub vitals: Option<VitalsSnapshot>,
    pub user_text: String,
}

/// Assemble a context from the latest observation (if any) and the user's
/// question. Never fails.
pub fn build_context(latest: Option<&Observation>, user_text: &str) -> PromptContext {
    PromptContext {
        generated_at: Local::now(),
        vitals: latest.map(VitalsSnapshot::from_observation),
        user_text: user_text.to_string(),
    }
}

impl PromptContext {
    /// Vitals section of the prompt, or the no-data sentinel
    pub fn vitals_section(&self) -> String {
        match &self.vitals {
            Some(v) => format!(
                "User's Current Health Status:\n\
                 Heart Rate: {}\n\
                 Blood Pressure: {}\n\
                 Oxygen Level: {}\n\
                 Temperature: {}",
                v.heart_rate, v.blood_pressure, v.oxygen_level, v.temperature
            ),
            None => NO_DATA_SENTINEL.to_string(),
        }
    }

    /// Render the full llama-style system prompt sent to the completion
    /// service
    pub fn render(&self) -> String {
        format!(
            "[INST]<<SYS>>\n\
             You are ElderCare AI, a compassionate health assistant for elderly users. \
             Your primary role is to help with health-related questions and concerns.\n\
             \n\
             Current Context:\n\
             Time: {time}\n\
             Date: {date}\n\
             \n\
             {vitals}\n\
             \n\
             Your responses should be:\n\
             1. Clear and easy to understand for elderly users\n\
             2. Empathetic and patient\n\
             3. Medically accurate while using simple language\n\
             4. Brief but informative (2-3 short paragraphs maximum)\n\
             5. Include gentle reminders to consult healthcare providers when appropriate\n\
             \n\
             If discussing health metrics:\n\
             - Explain what the numbers mean in simple terms\n\
             - Highlight any concerning values\n\
             - Suggest simple actions when appropriate\n\
             <</SYS>>\n\
             \n\
             {query}[/INST]",
            time = self.generated_at.format("%I:%M %p"),
            date = self.generated_at.format("%B %d, %Y"),
            vitals = self.vitals_section(),
            query = self.user_text,
        )
    }
}
