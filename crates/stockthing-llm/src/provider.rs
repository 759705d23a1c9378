//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for text-generation providers
///
/// The stock pipeline treats generation as an opaque prompt-in, text-out
/// service; implementations hide the wire format of a particular vendor.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for the request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
