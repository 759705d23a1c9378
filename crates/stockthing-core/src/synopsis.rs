//! Company synopsis generation
//!
//! A synopsis is a short LLM-written summary of the company, its latest
//! quarter and its rating. A web-search hit is added as context when a
//! search client is configured. Generation is retried with a fixed delay and
//! degrades to [`SYNOPSIS_FALLBACK`]; it never fails the analysis.

use crate::api::{GoogleSearchClient, SearchHit};
use crate::error::{Result, StockError};
use crate::rating::Verdict;
use crate::record::{NOT_AVAILABLE, StockRecord};
use stockthing_llm::{CompletionRequest, LLMProvider, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Text used when no synopsis could be generated
pub const SYNOPSIS_FALLBACK: &str = "Unable to fetch company synopsis.";

const SYSTEM_PROMPT: &str = "You are a highly skilled financial analyst.";
const MAX_TOKENS: usize = 200;
const TEMPERATURE: f32 = 0.7;

/// Build the user prompt for one record
pub fn build_prompt(record: &StockRecord, hit: Option<&SearchHit>, verdict: Verdict) -> String {
    let (title, snippet) = hit.map_or((NOT_AVAILABLE, NOT_AVAILABLE), |h| {
        (h.title.as_str(), h.snippet.as_str())
    });

    format!(
        "Summarize the company '{}' (stock ticker: {}), its most recent fiscal quarter \
         ending on {}, and provide a recommendation based on its P/E ratio of {}. \
         The recommendation is: {verdict}. Additional context: {title} - {snippet}.",
        record.long_name, record.symbol, record.recent_quarter, record.pe_ratio,
    )
}

/// Generates synopses with fixed-delay retry
pub struct SynopsisGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    attempts: u32,
    retry_delay: Duration,
    search: Option<GoogleSearchClient>,
}

impl SynopsisGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            attempts: 3,
            retry_delay: Duration::from_secs(5),
            search: None,
        }
    }

    /// Total attempts (at least one) and the pause between them
    pub fn with_retry(mut self, attempts: u32, retry_delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Add web-search context to prompts
    pub fn with_search(mut self, search: GoogleSearchClient) -> Self {
        self.search = Some(search);
        self
    }

    /// Synopsis for `record`, or [`SYNOPSIS_FALLBACK`] once every attempt failed
    pub async fn generate(&self, record: &StockRecord, verdict: Verdict) -> String {
        let hit = self.search_context(&record.symbol).await;
        let prompt = build_prompt(record, hit.as_ref(), verdict);

        match self.complete_with_retry(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Synopsis for {} unavailable: {e}", record.symbol);
                SYNOPSIS_FALLBACK.to_string()
            }
        }
    }

    async fn search_context(&self, symbol: &str) -> Option<SearchHit> {
        let search = self.search.as_ref()?;
        match search.company_profile(symbol).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Search context for {symbol} unavailable: {e}");
                None
            }
        }
    }

    async fn complete_with_retry(&self, prompt: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match self.complete_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("Synopsis attempt {attempt}/{} failed: {e}", self.attempts);
                    last_error = Some(e);
                }
            }

            if attempt < self.attempts {
                debug!("Retrying synopsis in {:?}", self.retry_delay);
                sleep(self.retry_delay).await;
            }
        }

        Err(StockError::GenerationFailure(
            last_error.map_or_else(|| "no attempts made".to_string(), |e| e.to_string()),
        ))
    }

    async fn complete_once(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest::builder(&self.model)
            .system(SYSTEM_PROMPT)
            .add_message(Message::user(prompt))
            .max_tokens(MAX_TOKENS)
            .temperature(TEMPERATURE)
            .build();

        let response = self.provider.complete(request).await?;
        response
            .message
            .text()
            .map(str::to_string)
            .ok_or_else(|| StockError::GenerationFailure("empty completion".to_string()))
    }
}
