//! Text-generation backends.
//!
//! - [`base_llm`] - The [`CompletionProvider`] trait and chat message types
//! - [`openai_compat`] - Client for OpenAI-compatible chat-completions endpoints

pub mod base_llm;
pub mod openai_compat;

pub use base_llm::{ChatMessage, CompletionProvider, SamplingParams};
pub use openai_compat::OpenAiCompatClient;
