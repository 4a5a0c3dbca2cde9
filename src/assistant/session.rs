//! Chat session
//!
//! The append-only transcript for one assistant conversation and the
//! control flow behind a single question: read the latest observation,
//! assemble the context, forward it to the completion service, post-process
//! the reply, and record both turns. Transcripts live and die with the
//! session; nothing here is persisted.

use std::sync::Arc;

use tracing::{debug, warn};

use super::annotate::{annotate, AnnotatedReply};
use super::client::{AssistantError, AssistantResult, CompletionClient};
use super::context::build_context;
use crate::models::ChatTurn;
use crate::store::ObservationStore;

/// Opening message recorded when a session greets the user
pub const GREETING: &str = "Hello! I'm your AI Health Assistant. I'm here to help you \
     with your health-related questions. How can I assist you today?";

/// Message recorded in the transcript when the service cannot answer
pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble connecting to my \
     AI system. Please make sure the assistant service is running and try again.";

/// One assistant conversation
pub struct ChatSession {
    client: Arc<dyn CompletionClient>,
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            turns: Vec::new(),
        }
    }

    /// Record the assistant's opening greeting
    pub fn greet(&mut self) {
        self.turns.push(ChatTurn::assistant(GREETING));
    }

    /// The transcript so far, oldest first
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Ask the assistant one question on behalf of a user.
    ///
    /// Reads the user's latest observation for context. Both the question
    /// and the (annotated) reply are appended to the transcript; when the
    /// service is unavailable the fallback text is recorded instead and the
    /// error is returned for the view to surface.
    pub async fn ask(
        &mut self,
        store: &dyn ObservationStore,
        user_id: &str,
        text: &str,
    ) -> AssistantResult<AnnotatedReply> {
        let latest = store.latest(user_id)?;
        let prompt = build_context(latest.as_ref(), text).render();

        self.turns.push(ChatTurn::user(text));
        debug!(user_id, has_vitals = latest.is_some(), "asking assistant");

        match self.client.complete(&prompt).await {
            Ok(raw) => {
                let reply = annotate(&raw);
                self.turns.push(ChatTurn::assistant(reply.text.clone()));
                Ok(reply)
            }
            Err(AssistantError::ServiceUnavailable(reason)) => {
                warn!(%reason, "completion service unavailable");
                self.turns.push(ChatTurn::assistant(FALLBACK_REPLY));
                Err(AssistantError::ServiceUnavailable(reason))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::annotate::Category;
    use crate::assistant::client::MockCompletionClient;
    use crate::models::{ObservationDraft, Role};
    use crate::store::MemoryObservationStore;

    fn store_with_observation() -> MemoryObservationStore {
        let store = MemoryObservationStore::new();
        store
            .append(ObservationDraft {
                user_id: "alice".to_string(),
                timestamp: Some("2025-03-01T08:00:00Z".to_string()),
                oxygen_level: Some(97.0),
                heart_rate: Some(72.0),
                ..Default::default()
            })
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_ask_records_both_turns() {
        let store = store_with_observation();
        let client = Arc::new(MockCompletionClient::replying(
            "[INST]A short walk would do you good.[/INST]",
        ));
        let mut session = ChatSession::new(client);
        session.greet();

        let reply = session.ask(&store, "alice", "What should I do today?").await.unwrap();
        assert_eq!(reply.text, "A short walk would do you good.");
        assert_eq!(reply.category, Category::Activity);

        let turns = session.turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].text, "What should I do today?");
        assert_eq!(turns[2].text, "A short walk would do you good.");
    }

    #[tokio::test]
    async fn test_ask_without_observations_still_answers() {
        let store = MemoryObservationStore::new();
        let client = Arc::new(MockCompletionClient::replying("All good."));
        let mut session = ChatSession::new(client);

        let reply = session.ask(&store, "nobody", "How are my levels?").await.unwrap();
        assert_eq!(reply.text, "All good.");
        assert_eq!(reply.category, Category::General);
    }

    #[tokio::test]
    async fn test_unavailable_service_records_fallback() {
        let store = store_with_observation();
        let client = Arc::new(MockCompletionClient::unavailable());
        let mut session = ChatSession::new(client);

        let err = session.ask(&store, "alice", "Hello?").await.unwrap_err();
        assert!(matches!(err, AssistantError::ServiceUnavailable(_)));

        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_transcript_cleared_with_session() {
        let client = Arc::new(MockCompletionClient::replying("ok"));
        let mut session = ChatSession::new(client.clone());
        session.greet();
        drop(session);

        let session = ChatSession::new(client);
        assert!(session.turns().is_empty());
    }
}
