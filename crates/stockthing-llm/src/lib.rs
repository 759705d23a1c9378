//! Text-generation provider abstraction for stockthing
//!
//! This crate keeps the language-model boundary small: a provider receives a
//! [`CompletionRequest`] and returns a [`CompletionResponse`]. It includes:
//!
//! - Message types for chat-style prompts
//! - Completion request/response types
//! - The [`LLMProvider`] trait
//! - An OpenAI-compatible provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
