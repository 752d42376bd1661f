//! Client-side chat log and its request state machine.
//!
//! A session is either `Idle` or `Sending`. Submitting moves it to `Sending`
//! and appends the user's message; completing the request appends exactly one
//! assistant message (the answer, or a fixed apology on failure) and returns
//! it to `Idle`. Only one request may be outstanding at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::relay_client::RelayClient;

pub const FAILURE_REPLY: &str =
    "Sorry, I encountered an error. Please make sure the server is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Sending,
}

/// Proof that a session is in `Sending`; consumed by [`ChatSession::complete`].
#[derive(Debug)]
#[must_use]
pub struct PendingRequest {
    prompt: String,
}

impl PendingRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    state: ChatState,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            state: ChatState::Idle,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == ChatState::Sending
    }

    /// Record the user's message and enter `Sending`.
    ///
    /// Blank input is ignored and yields `Ok(None)`.
    pub fn begin(&mut self, input: &str) -> Result<Option<PendingRequest>, AnalysisError> {
        if self.is_sending() {
            return Err(AnalysisError::RequestInFlight);
        }
        if input.trim().is_empty() {
            return Ok(None);
        }

        self.messages.push(ChatMessage::new(Role::User, input));
        self.state = ChatState::Sending;

        Ok(Some(PendingRequest {
            prompt: input.to_string(),
        }))
    }

    pub fn complete(
        &mut self,
        pending: PendingRequest,
        outcome: Result<String, AnalysisError>,
    ) -> &ChatMessage {
        let content = match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!("Chat request for '{}' failed: {}", pending.prompt, e);
                FAILURE_REPLY.to_string()
            }
        };

        self.messages.push(ChatMessage::new(Role::Assistant, content));
        self.state = ChatState::Idle;

        let idx = self.messages.len() - 1;
        &self.messages[idx]
    }

    /// Submit `input` through the relay and wait for the reply.
    pub async fn send(
        &mut self,
        client: &RelayClient,
        input: &str,
        data_context: &str,
    ) -> Result<Option<&ChatMessage>, AnalysisError> {
        let Some(pending) = self.begin(input)? else {
            return Ok(None);
        };

        info!("Sending chat prompt to relay");
        let outcome = client.chat(pending.prompt(), data_context).await;
        Ok(Some(self.complete(pending, outcome)))
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_ignored() {
        let mut session = ChatSession::new();
        assert!(session.begin("   \n").unwrap().is_none());
        assert!(session.messages().is_empty());
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[test]
    fn begin_appends_user_message_and_enters_sending() {
        let mut session = ChatSession::new();
        let pending = session.begin("Summarise this").unwrap().unwrap();

        assert_eq!(pending.prompt(), "Summarise this");
        assert_eq!(session.state(), ChatState::Sending);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::User);
        let _ = session.complete(pending, Ok(String::new()));
    }

    #[test]
    fn second_submit_while_sending_is_rejected() {
        let mut session = ChatSession::new();
        let pending = session.begin("first").unwrap().unwrap();

        let err = session.begin("second").unwrap_err();
        assert!(matches!(err, AnalysisError::RequestInFlight));
        assert_eq!(session.messages().len(), 1);

        session.complete(pending, Ok("done".into()));
        assert!(session.begin("third").unwrap().is_some());
    }

    #[test]
    fn success_appends_answer_and_returns_to_idle() {
        let mut session = ChatSession::new();
        let pending = session.begin("How many rows?").unwrap().unwrap();
        let reply = session.complete(pending, Ok("There are 4 rows.".into()));

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "There are 4 rows.");
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[test]
    fn failure_appends_apology() {
        let mut session = ChatSession::new();
        let pending = session.begin("Any outliers?").unwrap().unwrap();
        let reply = session.complete(pending, Err(AnalysisError::RelayStatus { status: 500 }));

        assert_eq!(reply.content, FAILURE_REPLY);
        assert_eq!(session.state(), ChatState::Idle);
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn message_roles_serialize_lowercase() {
        let msg = ChatMessage::new(Role::Assistant, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
