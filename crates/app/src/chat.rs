//! Chat view session: transcript plus at most one pending turn.

use agrointel_ai::prompt::{CHAT_APOLOGY, CHAT_GREETING};
use agrointel_core::{ChatMessage, ErrorKind};
use thiserror::Error;

use crate::task::{AsyncTask, Delivery, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("waiting for the previous reply")]
    TurnPending,
}

/// One user turn ready for the inference service.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub token: RequestToken,
    /// Transcript before the new user message.
    pub history: Vec<ChatMessage>,
    pub text: String,
}

#[derive(Debug)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    turn: AsyncTask<String, String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            transcript: vec![ChatMessage::assistant(CHAT_GREETING)],
            turn: AsyncTask::new(),
        }
    }

    /// Messages in display order.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_waiting(&self) -> bool {
        self.turn.is_pending()
    }

    pub fn send(&mut self, text: &str) -> Result<ChatTurn, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        // finished turns are reset in `complete`, so pending is the only refusal
        let token = self
            .turn
            .start(text.to_string())
            .map_err(|_| ChatError::TurnPending)?;

        let history = self.transcript.clone();
        self.transcript.push(ChatMessage::user(text));
        Ok(ChatTurn {
            token,
            history,
            text: text.to_string(),
        })
    }

    /// Append the reply, or a single apology when the turn failed, and reopen
    /// input.
    pub fn complete(&mut self, token: RequestToken, outcome: Result<String, ErrorKind>) -> Delivery {
        let reply = match &outcome {
            Ok(reply) => reply.clone(),
            Err(_) => CHAT_APOLOGY.to_string(),
        };
        let failure = outcome.as_ref().err().copied();
        let delivery = self.turn.complete(token, outcome);
        if delivery == Delivery::Applied {
            if let Some(kind) = failure {
                tracing::warn!(error = %kind, "chat turn failed");
            }
            self.transcript.push(ChatMessage::assistant(reply));
            self.turn.reset();
        }
        delivery
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use agrointel_core::Role;

    use super::*;

    #[test]
    fn starts_with_the_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Assistant);
        assert_eq!(session.transcript()[0].content, CHAT_GREETING);
    }

    #[test]
    fn send_then_reply_appends_in_order() {
        let mut session = ChatSession::new();
        let turn = session.send("  When should I sow rice?  ").unwrap();
        assert_eq!(turn.text, "When should I sow rice?");
        assert_eq!(turn.history.len(), 1);
        assert!(session.is_waiting());

        session.complete(turn.token, Ok("After the first showers.".into()));
        let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.transcript()[2].content, "After the first showers.");
        assert!(!session.is_waiting());
    }

    #[test]
    fn blank_and_overlapping_sends_are_rejected() {
        let mut session = ChatSession::new();
        assert_eq!(session.send("   ").unwrap_err(), ChatError::EmptyMessage);
        session.send("first").unwrap();
        assert_eq!(session.send("second").unwrap_err(), ChatError::TurnPending);
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn failure_appends_one_apology_and_reopens_input() {
        let mut session = ChatSession::new();
        let turn = session.send("hello").unwrap();
        assert_eq!(session.complete(turn.token, Err(ErrorKind::NetworkFailure)), Delivery::Applied);

        let last = session.transcript().last().unwrap();
        assert_eq!(last.content, CHAT_APOLOGY);
        assert_eq!(session.transcript().len(), 3);

        assert_eq!(session.complete(turn.token, Err(ErrorKind::Timeout)), Delivery::Stale);
        assert_eq!(session.transcript().len(), 3);
        assert!(session.send("again").is_ok());
    }
}
