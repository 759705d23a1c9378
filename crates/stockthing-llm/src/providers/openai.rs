//! OpenAI provider implementation
//!
//! Implements [`LLMProvider`] against the chat completions endpoint.
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! Any OpenAI-compatible server works by pointing `api_base` at it:
//!
//! ```no_run
//! use stockthing_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OpenAIConfig::new("not-needed").with_api_base("http://localhost:8000/v1");
//! let provider = OpenAIProvider::with_config(config)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, Role,
    StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// OpenAI chat completions provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "OpenAI API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new OpenAI provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(
        skip(self, request),
        fields(model = %request.model, api_base = %self.config.api_base)
    )]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to OpenAI API at {}", self.config.api_base);

        let openai_request = OpenAIRequest {
            model: request.model.clone(),
            messages: build_openai_messages(request.system, request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(request.model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        parse_openai_response(openai_response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// System prompt goes first in the messages array
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
    system
        .map(Message::system)
        .into_iter()
        .chain(messages)
        .map(|msg| OpenAIMessage {
            role: role_name(msg.role).to_string(),
            content: Some(msg.content),
        })
        .collect()
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

/// Take the first choice; OpenAI may return several
fn parse_openai_response(response: OpenAIResponse) -> Result<CompletionResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    let stop_reason = choice
        .finish_reason
        .as_deref()
        .map_or(StopReason::Other, StopReason::from_finish_reason);

    let usage = response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    debug!(
        "Received response - stop_reason: {:?}, tokens: {}/{}",
        stop_reason, usage.input_tokens, usage.output_tokens
    );

    Ok(CompletionResponse {
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        stop_reason,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAIProvider {
        let config = OpenAIConfig::new("sk-test").with_api_base(format!("{}/v1", server.uri()));
        OpenAIProvider::with_config(config).unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest::builder("gpt-4")
            .system("You are a highly skilled financial analyst.")
            .add_message(Message::user("Summarize TSLA"))
            .max_tokens(200)
            .temperature(0.7)
            .build()
    }

    async fn respond_with_status(server: &MockServer, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_config_builder() {
        let config = OpenAIConfig::new("sk-test")
            .with_api_base("http://localhost:1234/v1/")
            .with_timeout(30);

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.api_base, "http://localhost:1234/v1");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_empty_key_is_configuration_error() {
        let result = OpenAIProvider::new("  ");
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));
    }

    #[test]
    fn test_system_message_first() {
        let messages = build_openai_messages(
            Some("You are a highly skilled financial analyst.".to_string()),
            vec![Message::user("Summarize TSLA")],
        );

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content.as_deref(), Some("Summarize TSLA"));
    }

    #[test]
    fn test_parse_response() {
        let raw = json!({
            "choices": [
                {
                    "message": {"role": "assistant", "content": "Apple designs phones."},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7}
        });
        let response: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let parsed = parse_openai_response(response).unwrap();

        assert_eq!(parsed.message.text(), Some("Apple designs phones."));
        assert_eq!(parsed.stop_reason, StopReason::EndTurn);
        assert_eq!(parsed.usage.total(), 49);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let response: OpenAIResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_openai_response(response),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_against_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "max_tokens": 200,
                "messages": [
                    {"role": "system", "content": "You are a highly skilled financial analyst."},
                    {"role": "user", "content": "Summarize TSLA"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Tesla builds electric cars."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 30, "completion_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider_for(&server).complete(request()).await.unwrap();
        assert_eq!(response.message.text(), Some("Tesla builds electric cars."));
        assert_eq!(response.usage.total(), 35);
    }

    #[tokio::test]
    async fn test_unauthorized_is_authentication_failure() {
        let server = MockServer::start().await;
        respond_with_status(&server, 401, "invalid api key").await;

        let err = provider_for(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, LLMError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limit() {
        let server = MockServer::start().await;
        respond_with_status(&server, 429, "quota exhausted").await;

        let err = provider_for(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, LLMError::RateLimitExceeded(ref body) if body == "quota exhausted"));
    }

    #[tokio::test]
    async fn test_unknown_model_is_model_not_found() {
        let server = MockServer::start().await;
        respond_with_status(&server, 404, "").await;

        let err = provider_for(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, LLMError::ModelNotFound(ref model) if model == "gpt-4"));
    }

    #[tokio::test]
    #[ignore] // Requires OPENAI_API_KEY and network access
    async fn test_complete_live() {
        let key = std::env::var("OPENAI_API_KEY").unwrap();
        let provider = OpenAIProvider::new(key).unwrap();
        let request = CompletionRequest::builder("gpt-4")
            .add_message(Message::user("Say hello"))
            .max_tokens(10)
            .build();

        let response = provider.complete(request).await.unwrap();
        assert!(response.message.text().is_some());
    }
}
