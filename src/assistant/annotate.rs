//! Reply post-processing
//!
//! Applied uniformly to every completion reply: strip prompt-delimiter
//! tokens the model may leak back, then classify the text into one display
//! category. The classification policy is an ordered keyword table evaluated
//! first-match-wins, so it stays data rather than nested conditionals.

use serde::{Deserialize, Serialize};

/// Prompt-delimiter tokens that must never reach the user
const PROMPT_DELIMITERS: &[&str] = &["[INST]", "[/INST]", "<<SYS>>", "<</SYS>>"];

/// Display category for a reply, used to pick the avatar icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Medication,
    Medical,
    Appointment,
    Diet,
    Activity,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Medication => "medication",
            Category::Medical => "medical",
            Category::Appointment => "appointment",
            Category::Diet => "diet",
            Category::Activity => "activity",
            Category::General => "general",
        }
    }
}

/// Ordered classification table, first match wins
const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("medicine", Category::Medication),
    ("medication", Category::Medication),
    ("doctor", Category::Medical),
    ("hospital", Category::Medical),
    ("appointment", Category::Appointment),
    ("food", Category::Diet),
    ("eat", Category::Diet),
    ("diet", Category::Diet),
    ("exercise", Category::Activity),
    ("walk", Category::Activity),
];

/// A cleaned, categorized assistant reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedReply {
    pub text: String,
    pub category: Category,
}

/// Remove leaked prompt-delimiter tokens, leaving the text otherwise intact
pub fn strip_delimiters(reply: &str) -> String {
    let mut text = reply.to_string();
    for token in PROMPT_DELIMITERS {
        text = text.replace(token, "");
    }
    text.trim().to_string()
}

/// Classify a reply into exactly one category, first keyword match wins
pub fn classify_reply(text: &str) -> Category {
    let lower = text.to_lowercase();
    for (keyword, category) in CATEGORY_KEYWORDS {
        if lower.contains(keyword) {
            return *category;
        }
    }
    Category::General
}

/// Full post-processing pass: strip, then classify
pub fn annotate(raw_reply: &str) -> AnnotatedReply {
    let text = strip_delimiters(raw_reply);
    let category = classify_reply(&text);
    AnnotatedReply { text, category }
}
