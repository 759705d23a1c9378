//! Finnhub API client and stock source

use crate::error::{Result, StockError};
use crate::quarter::QuarterResolution;
use crate::record::{FieldValue, StockRecord};
use crate::source::StockDataSource;
use crate::throttle::{FINNHUB_FREE_QUOTA, SmoothThrottle, Throttle};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

/// Finnhub reports market capitalization in millions
const MARKET_CAP_UNIT: f64 = 1_000_000.0;

/// Finnhub client for company profile, metrics and quotes
#[derive(Clone)]
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    throttle: Arc<dyn Throttle>,
}

impl FinnhubClient {
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

    /// Client spacing calls for the free tier (60 per minute)
    pub fn free_tier(api_key: impl Into<String>) -> Result<Self> {
        Self::new(
            api_key,
            Arc::new(SmoothThrottle::per_minute(FINNHUB_FREE_QUOTA)),
            Duration::from_secs(30),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Company profile (`stock/profile2`)
    pub async fn get_profile(&self, symbol: &str) -> Result<Value> {
        self.get("stock/profile2", &[("symbol", symbol)]).await
    }

    /// Basic financials (`stock/metric?metric=all`)
    pub async fn get_metrics(&self, symbol: &str) -> Result<Value> {
        self.get("stock/metric", &[("symbol", symbol), ("metric", "all")]).await
    }

    /// Real-time quote
    pub async fn get_quote(&self, symbol: &str) -> Result<Value> {
        self.get("quote", &[("symbol", symbol)]).await
    }

    #[instrument(skip(self, params), fields(provider = PROVIDER))]
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.throttle.acquire().await;

        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StockError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "{PROVIDER} API error {status}: {body}"
            )));
        }

        let data: Value = response.json().await?;
        debug!("Received {endpoint} response");
        Ok(data)
    }
}

/// Fail with [`StockError::DataUnavailable`] when the profile has no company name
pub fn check_identity(symbol: &str, profile: &Value) -> Result<()> {
    let named = profile
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());

    if !named {
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            response: profile.to_string(),
        });
    }
    Ok(())
}

/// Period of the newest quarterly EPS entry, if any
pub fn reported_quarter(metrics: &Value) -> Option<&str> {
    metrics.pointer("/series/quarterly/eps/0/period")?.as_str()
}

fn market_cap(profile: &Value) -> FieldValue {
    match FieldValue::from_json(profile.get("marketCapitalization")) {
        FieldValue::Number(millions) => FieldValue::Number(millions * MARKET_CAP_UNIT),
        other => other,
    }
}

fn current_price(quote: &Value) -> FieldValue {
    // Unknown symbols quote as all zeros
    match FieldValue::from_json(quote.get("c")) {
        FieldValue::Number(price) if price.abs() < f64::EPSILON => FieldValue::NotAvailable,
        other => other,
    }
}

/// Map profile, metric and quote payloads onto the record schema
pub fn normalize(
    symbol: &str,
    profile: &Value,
    metrics: &Value,
    quote: &Value,
    quarter_policy: QuarterResolution,
    today: NaiveDate,
) -> StockRecord {
    let metric = |key: &str| FieldValue::from_json(metrics.pointer(&format!("/metric/{key}")));

    let pe_ratio = match metric("peTTM") {
        FieldValue::NotAvailable => metric("peBasicExclExtraTTM"),
        pe => pe,
    };

    StockRecord {
        symbol: symbol.to_uppercase(),
        long_name: FieldValue::from_json(profile.get("name")),
        sector: FieldValue::NotAvailable,
        industry: FieldValue::from_json(profile.get("finnhubIndustry")),
        market_cap: market_cap(profile),
        pe_ratio,
        dividend_yield: metric("dividendYieldIndicatedAnnual"),
        current_price: current_price(quote),
        recent_quarter: quarter_policy.resolve(reported_quarter(metrics), today),
    }
}

/// Stock source backed by profile2 + metric + quote
pub struct FinnhubSource {
    client: FinnhubClient,
    quarter_policy: QuarterResolution,
}

impl FinnhubSource {
    pub fn new(client: FinnhubClient, quarter_policy: QuarterResolution) -> Self {
        Self {
            client,
            quarter_policy,
        }
    }
}

#[async_trait]
impl StockDataSource for FinnhubSource {
    async fn fetch(&self, symbol: &str) -> Result<StockRecord> {
        let profile = self.client.get_profile(symbol).await?;
        check_identity(symbol, &profile)?;

        let metrics = self.client.get_metrics(symbol).await?;
        let quote = self.client.get_quote(symbol).await?;

        Ok(normalize(
            symbol,
            &profile,
            &metrics,
            &quote,
            self.quarter_policy,
            Local::now().date_naive(),
        ))
    }

    fn name(&self) -> &'static str {
        "finnhub"
    }
}
