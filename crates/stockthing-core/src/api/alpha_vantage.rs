//! Alpha Vantage API client and stock source

use crate::error::{Result, StockError};
use crate::quarter::QuarterResolution;
use crate::record::{FieldValue, StockRecord};
use crate::source::StockDataSource;
use crate::throttle::{FixedWindowLimiter, Throttle};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Field that identifies a company in an OVERVIEW response
const IDENTITY_FIELD: &str = "Symbol";

/// Alpha Vantage API client
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    throttle: Arc<dyn Throttle>,
}

impl AlphaVantageClient {
    /// Create a client sharing `throttle` with every other caller of the API
    pub fn new(
        api_key: impl Into<String>,
        throttle: Arc<dyn Throttle>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            throttle,
        })
    }

    /// Client with the free-tier limiter (5 calls per minute)
    pub fn free_tier(api_key: impl Into<String>) -> Result<Self> {
        Self::new(
            api_key,
            Arc::new(FixedWindowLimiter::alpha_vantage_free_tier()),
            Duration::from_secs(30),
        )
    }

    /// Point the client at another endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Company overview (`function=OVERVIEW`); error and throttling payloads fail
    pub async fn get_overview(&self, symbol: &str) -> Result<Value> {
        let data = self.query("OVERVIEW", symbol).await?;
        check_error_payload(&data)?;
        Ok(data)
    }

    /// Annual and quarterly earnings (`function=EARNINGS`).
    ///
    /// The body is returned as sent, error payloads included.
    pub async fn get_earnings(&self, symbol: &str) -> Result<Value> {
        self.query("EARNINGS", symbol).await
    }

    #[instrument(skip(self), fields(provider = PROVIDER))]
    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        self.throttle.acquire().await;

        let params = [
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];
        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::ApiError(format!(
                "{PROVIDER} HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        debug!("Received {function} response for {symbol}");
        Ok(data)
    }
}

/// Alpha Vantage reports errors and throttling inside a 200 response
fn check_error_payload(data: &Value) -> Result<()> {
    if let Some(error) = data.get("Error Message") {
        return Err(StockError::ApiError(error.to_string()));
    }

    let throttled = data.get("Note").is_some() || data.get("Information").is_some();
    if throttled && data.get(IDENTITY_FIELD).is_none() {
        return Err(StockError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }

    Ok(())
}

/// Fail with [`StockError::DataUnavailable`] unless the overview names a company
pub fn check_identity(symbol: &str, overview: &Value) -> Result<()> {
    if overview.get(IDENTITY_FIELD).is_none() {
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            response: overview.to_string(),
        });
    }
    Ok(())
}

/// First quarterly entry's `fiscalDateEnding`, if any
pub fn reported_quarter(earnings: &Value) -> Option<&str> {
    earnings
        .get("quarterlyEarnings")?
        .as_array()?
        .first()?
        .get("fiscalDateEnding")?
        .as_str()
}

/// Map OVERVIEW and EARNINGS payloads onto the record schema
pub fn normalize(
    symbol: &str,
    overview: &Value,
    earnings: &Value,
    quarter_policy: QuarterResolution,
    today: NaiveDate,
) -> StockRecord {
    let field = |key: &str| FieldValue::from_json(overview.get(key));

    StockRecord {
        symbol: symbol.to_uppercase(),
        long_name: field("Name"),
        sector: field("Sector"),
        industry: field("Industry"),
        market_cap: field("MarketCapitalization"),
        pe_ratio: field("PERatio"),
        dividend_yield: field("DividendYield"),
        // OVERVIEW carries no spot price; the 50-day average stands in for it
        current_price: field("50DayMovingAverage"),
        recent_quarter: quarter_policy.resolve(reported_quarter(earnings), today),
    }
}

/// Stock source backed by OVERVIEW + EARNINGS
pub struct AlphaVantageSource {
    client: AlphaVantageClient,
    quarter_policy: QuarterResolution,
}

impl AlphaVantageSource {
    pub fn new(client: AlphaVantageClient, quarter_policy: QuarterResolution) -> Self {
        Self {
            client,
            quarter_policy,
        }
    }
}

#[async_trait]
impl StockDataSource for AlphaVantageSource {
    async fn fetch(&self, symbol: &str) -> Result<StockRecord> {
        let overview = self.client.get_overview(symbol).await?;
        check_identity(symbol, &overview)?;

        // An earnings error only costs the quarter, which the policy resolves
        let earnings = self.client.get_earnings(symbol).await?;
        if let Err(e) = check_error_payload(&earnings) {
            warn!("No quarterly earnings for {symbol}: {e}");
        }

        Ok(normalize(
            symbol,
            &overview,
            &earnings,
            self.quarter_policy,
            Local::now().date_naive(),
        ))
    }

    fn name(&self) -> &'static str {
        "alpha-vantage"
    }
}
