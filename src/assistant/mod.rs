//! AI health assistant
//!
//! Everything between the chat view and the external completion service:
//! context assembly, the Ollama client seam, reply post-processing, the
//! session transcript, and the 30-second availability poll.

pub mod annotate;
pub mod client;
pub mod context;
pub mod monitor;
pub mod session;

pub use annotate::{annotate, classify_reply, strip_delimiters, AnnotatedReply, Category};
pub use client::{
    AssistantError, AssistantResult, CompletionClient, CompletionOptions, OllamaClient,
    DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use context::{build_context, PromptContext, VitalsSnapshot, NO_DATA_SENTINEL};
pub use monitor::{AvailabilityMonitor, POLL_INTERVAL};
pub use session::{ChatSession, FALLBACK_REPLY, GREETING};
