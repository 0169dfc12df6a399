//! Base trait for text-generation backends.
//!
//! The recommendation route only depends on this loose contract: send a list
//! of chat messages, get one text blob back. Anything that can answer that
//! way (a hosted OpenAI-compatible endpoint, a local model, a test double)
//! plugs in behind [`CompletionProvider`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A single message in a chat-completion conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            top_p: 1.0,
        }
    }
}

/// A text-generation backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync + fmt::Debug {
    /// Provider name, used in logs.
    fn provider(&self) -> &str;

    /// Send `messages` and return the raw text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ClientError>;
}
