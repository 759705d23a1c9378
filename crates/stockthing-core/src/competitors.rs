//! Competitor lookup
//!
//! The language model names a company's main competitors; each ticker it
//! returns is then fetched through the same source, throttle and error log
//! as the symbols the user asked for.

use crate::error::{Result, StockError};
use crate::record::is_valid_symbol;
use stockthing_llm::{CompletionRequest, LLMProvider, Message};
use std::sync::Arc;
use tracing::debug;

/// Competitors fetched per analyzed symbol
pub const MAX_COMPETITORS: usize = 5;

const MAX_TOKENS: usize = 100;
const TEMPERATURE: f32 = 0.7;

/// Question sent for `symbol`
pub fn competitor_prompt(symbol: &str) -> String {
    format!(
        "Identify the main competitors of the company with stock symbol {symbol}. \
         Provide their stock symbols as a comma-separated list."
    )
}

/// Tickers from a comma- or line-separated answer.
///
/// Entries that are not tickers, repeats and `symbol` itself are dropped; at
/// most [`MAX_COMPETITORS`] remain.
pub fn parse_competitors(symbol: &str, answer: &str) -> Vec<String> {
    let own = symbol.to_uppercase();
    let mut tickers: Vec<String> = Vec::new();

    for candidate in answer.split([',', '\n']) {
        let ticker = candidate.trim().to_uppercase();
        if !is_valid_symbol(&ticker) || ticker == own || tickers.contains(&ticker) {
            continue;
        }
        tickers.push(ticker);
        if tickers.len() == MAX_COMPETITORS {
            break;
        }
    }

    tickers
}

/// Asks a provider for a company's competitors
pub struct CompetitorFinder {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl CompetitorFinder {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Competitor tickers for `symbol`
    pub async fn find(&self, symbol: &str) -> Result<Vec<String>> {
        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user(competitor_prompt(symbol)))
            .max_tokens(MAX_TOKENS)
            .temperature(TEMPERATURE)
            .build();

        let response = self.provider.complete(request).await?;
        let answer = response
            .message
            .text()
            .ok_or_else(|| StockError::GenerationFailure("empty completion".to_string()))?;

        let tickers = parse_competitors(symbol, answer);
        debug!("Competitors of {symbol}: {tickers:?}");
        Ok(tickers)
    }
}
