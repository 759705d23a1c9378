//! Google Custom Search client used for synopsis context

use crate::error::{Result, StockError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Top search result
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

/// Query sent to find a company's profile, skipping the quote pages
pub fn company_profile_query(symbol: &str) -> String {
    format!("{symbol} company profile -site:finance.yahoo.com")
}

#[derive(Clone)]
pub struct GoogleSearchClient {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: String,
}

impl GoogleSearchClient {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// First result for `query`, or `None` when nothing matched
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Option<SearchHit>> {
        let params = [
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("q", query),
        ];
        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::ApiError(format!(
                "Google search error: {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        debug!("Search returned {} items", body.items.len());
        Ok(first_hit(body))
    }

    /// First result for the symbol's company-profile query
    pub async fn company_profile(&self, symbol: &str) -> Result<Option<SearchHit>> {
        self.search(&company_profile_query(symbol)).await
    }
}

fn first_hit(response: SearchResponse) -> Option<SearchHit> {
    response.items.into_iter().next()
}
