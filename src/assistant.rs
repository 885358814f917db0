//! Assistant chat session
//!
//! Keeps the in-memory message log for one conversation with the AI
//! assistant. Nothing here is persisted. Only one request may be in flight;
//! input sent while waiting is dropped.

use crate::gateway::AiGateway;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// First message of every session
pub const GREETING: &str =
    "Hello! I'm FitBot AI. How can I help you with your fitness and nutrition goals today?";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// One conversation with the assistant
#[derive(Debug)]
pub struct ChatSession {
    gateway: AiGateway,
    messages: Mutex<Vec<ChatMessage>>,
    loading: AtomicBool,
}

/// Clears the loading flag even if the request future is dropped
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    /// Start a session seeded with [`GREETING`]
    pub fn new(gateway: AiGateway) -> Self {
        Self {
            gateway,
            messages: Mutex::new(vec![ChatMessage::model(GREETING)]),
            loading: AtomicBool::new(false),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a reply is being awaited
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn push(&self, message: ChatMessage) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Send `input` and wait for the reply
    ///
    /// Returns `None` without touching the log when `input` is blank or a
    /// reply is already pending. Otherwise appends the user message and the
    /// model reply and returns the reply text.
    pub async fn send(&self, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Ignoring input while a reply is pending");
            return None;
        }
        let _guard = LoadingGuard(&self.loading);

        self.push(ChatMessage::user(input));
        let reply = self.gateway.assistant_response(input).await;
        self.push(ChatMessage::model(reply.clone()));
        Some(reply)
    }
}
