//! Configuration for the stock analysis pipeline

use crate::error::{Result, StockError};
use crate::error_log::ERROR_LOG_FILE;
use crate::quarter::QuarterResolution;
use crate::throttle::{ALPHA_VANTAGE_FREE_QUOTA, FINNHUB_FREE_QUOTA, QUOTA_WINDOW};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default model used for synopses
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Data provider for stock information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataProvider {
    /// Alpha Vantage OVERVIEW + EARNINGS (default, 5 calls/minute on the free tier)
    #[default]
    AlphaVantage,
    /// Finnhub company profile, metrics and quote
    Finnhub,
}

impl DataProvider {
    /// Environment variable holding this provider's key
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::AlphaVantage => "ALPHA_VANTAGE_API_KEY",
            Self::Finnhub => "FINNHUB_API_KEY",
        }
    }

    /// Quarter policy used when none is configured
    pub fn default_quarter_resolution(self) -> QuarterResolution {
        match self {
            Self::AlphaVantage => QuarterResolution::ProviderReported,
            Self::Finnhub => QuarterResolution::CalendarFallback,
        }
    }
}

impl fmt::Display for DataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlphaVantage => "alpha-vantage",
            Self::Finnhub => "finnhub",
        })
    }
}

impl FromStr for DataProvider {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "alpha-vantage" | "alphavantage" => Ok(Self::AlphaVantage),
            "finnhub" => Ok(Self::Finnhub),
            other => Err(StockError::ConfigError(format!(
                "Unknown data provider '{other}' (expected alpha-vantage or finnhub)"
            ))),
        }
    }
}

/// Configuration for one run of the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where stock metadata comes from
    pub provider: DataProvider,

    /// Alpha Vantage API key
    pub alpha_vantage_api_key: Option<String>,

    /// Finnhub API key
    pub finnhub_api_key: Option<String>,

    /// OpenAI API key; synopses are skipped without it
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL override
    pub openai_api_base: Option<String>,

    /// Model used for synopses
    pub openai_model: String,

    /// Google Custom Search API key
    pub google_api_key: Option<String>,

    /// Google Custom Search engine id
    pub search_engine_id: Option<String>,

    /// Alpha Vantage calls allowed per rate window
    pub alpha_vantage_rate_limit: u32,

    /// Finnhub calls allowed per minute
    pub finnhub_rate_limit: u32,

    /// Length of the Alpha Vantage rate window
    pub rate_window: Duration,

    /// Synopsis generation attempts
    pub synopsis_attempts: u32,

    /// Fixed delay between synopsis attempts
    pub synopsis_retry_delay: Duration,

    /// Whether to generate synopses at all
    pub synopsis_enabled: bool,

    /// Whether to look up and fetch each symbol's competitors
    pub competitors_enabled: bool,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Directory receiving report files and the error log
    pub output_dir: PathBuf,

    /// Quarter policy override; `None` uses the provider default
    pub quarter_resolution: Option<QuarterResolution>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::AlphaVantage,
            alpha_vantage_api_key: None,
            finnhub_api_key: None,
            openai_api_key: None,
            openai_api_base: None,
            openai_model: DEFAULT_MODEL.to_string(),
            google_api_key: None,
            search_engine_id: None,
            alpha_vantage_rate_limit: ALPHA_VANTAGE_FREE_QUOTA,
            finnhub_rate_limit: FINNHUB_FREE_QUOTA,
            rate_window: QUOTA_WINDOW,
            synopsis_attempts: 3,
            synopsis_retry_delay: Duration::from_secs(5),
            synopsis_enabled: true,
            competitors_enabled: false,
            request_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
            quarter_resolution: None,
        }
    }
}

impl AppConfig {
    /// Create a new configuration builder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(stockthing_utils::env_var)
    }

    /// Read settings through `lookup`, which returns trimmed, non-empty values
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self {
            alpha_vantage_api_key: lookup("ALPHA_VANTAGE_API_KEY"),
            finnhub_api_key: lookup("FINNHUB_API_KEY"),
            openai_api_key: lookup("OPENAI_API_KEY"),
            openai_api_base: lookup("OPENAI_API_BASE"),
            google_api_key: lookup("GOOGLE_API_KEY"),
            search_engine_id: lookup("SEARCH_ENGINE_ID"),
            ..Self::default()
        };

        if let Some(model) = lookup("OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(provider) = lookup("STOCK_DATA_PROVIDER") {
            config.provider = provider.parse()?;
        }
        if let Some(policy) = lookup("QUARTER_RESOLUTION") {
            config.quarter_resolution = Some(policy.parse()?);
        }
        if let Some(flag) = lookup("COMPETITOR_LOOKUP") {
            config.competitors_enabled = parse_flag("COMPETITOR_LOOKUP", &flag)?;
        }

        Ok(config)
    }

    /// Validate the configuration for fetching stock data
    pub fn validate(&self) -> Result<()> {
        if self.provider_api_key().is_none() {
            return Err(StockError::ConfigError(format!(
                "{} is not set; it is required for the {} provider",
                self.provider.api_key_var(),
                self.provider
            )));
        }

        if self.alpha_vantage_rate_limit == 0 || self.finnhub_rate_limit == 0 {
            return Err(StockError::ConfigError(
                "rate limits must be greater than 0".to_string(),
            ));
        }

        if self.synopsis_attempts == 0 {
            return Err(StockError::ConfigError(
                "synopsis_attempts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// API key for the selected provider
    pub fn provider_api_key(&self) -> Option<&str> {
        match self.provider {
            DataProvider::AlphaVantage => self.alpha_vantage_api_key.as_deref(),
            DataProvider::Finnhub => self.finnhub_api_key.as_deref(),
        }
    }

    /// Quarter policy in effect for the selected provider
    pub fn effective_quarter_resolution(&self) -> QuarterResolution {
        self.quarter_resolution
            .unwrap_or_else(|| self.provider.default_quarter_resolution())
    }

    /// Check that synopsis generation can run
    pub fn synopsis_requirements(&self) -> Result<()> {
        if !self.synopsis_enabled {
            return Err(StockError::ConfigError("synopses are disabled".to_string()));
        }
        if self.openai_api_key.is_none() {
            return Err(StockError::ConfigError(
                "OPENAI_API_KEY is not set; company synopses are unavailable".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that competitor lookup can run
    pub fn competitor_requirements(&self) -> Result<()> {
        if !self.competitors_enabled {
            return Err(StockError::ConfigError(
                "competitor lookup is disabled".to_string(),
            ));
        }
        if self.openai_api_key.is_none() {
            return Err(StockError::ConfigError(
                "OPENAI_API_KEY is not set; competitor lookup is unavailable".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that web search context can be fetched
    pub fn search_requirements(&self) -> Result<()> {
        if self.google_api_key.is_none() || self.search_engine_id.is_none() {
            return Err(StockError::ConfigError(
                "GOOGLE_API_KEY or SEARCH_ENGINE_ID is not set.".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the append-only error log
    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join(ERROR_LOG_FILE)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(StockError::ConfigError(format!(
            "{key} must be true or false, got '{other}'"
        ))),
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    base: Option<AppConfig>,
    provider: Option<DataProvider>,
    alpha_vantage_api_key: Option<String>,
    finnhub_api_key: Option<String>,
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
    rate_window: Option<Duration>,
    synopsis_attempts: Option<u32>,
    synopsis_retry_delay: Option<Duration>,
    synopsis_enabled: Option<bool>,
    competitors_enabled: Option<bool>,
    output_dir: Option<PathBuf>,
    quarter_resolution: Option<QuarterResolution>,
}

impl AppConfigBuilder {
    /// Start from settings read out of the environment
    pub fn from_env(mut self) -> Result<Self> {
        self.base = Some(AppConfig::from_env()?);
        Ok(self)
    }

    /// Set the data provider
    pub fn provider(mut self, provider: DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the Finnhub API key
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI API key
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the synopsis model
    pub fn openai_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = Some(model.into());
        self
    }

    /// Set the Alpha Vantage calls per window
    pub fn alpha_vantage_rate_limit(mut self, limit: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(limit);
        self
    }

    /// Set the rate window length
    pub fn rate_window(mut self, window: Duration) -> Self {
        self.rate_window = Some(window);
        self
    }

    /// Set the number of synopsis attempts
    pub fn synopsis_attempts(mut self, attempts: u32) -> Self {
        self.synopsis_attempts = Some(attempts);
        self
    }

    /// Set the delay between synopsis attempts
    pub fn synopsis_retry_delay(mut self, delay: Duration) -> Self {
        self.synopsis_retry_delay = Some(delay);
        self
    }

    /// Enable or disable synopses
    pub fn synopsis_enabled(mut self, enabled: bool) -> Self {
        self.synopsis_enabled = Some(enabled);
        self
    }

    /// Enable or disable competitor lookup
    pub fn competitors_enabled(mut self, enabled: bool) -> Self {
        self.competitors_enabled = Some(enabled);
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Override the quarter policy
    pub fn quarter_resolution(mut self, policy: QuarterResolution) -> Self {
        self.quarter_resolution = Some(policy);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig> {
        let defaults = self.base.unwrap_or_default();

        let config = AppConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            alpha_vantage_api_key: self.alpha_vantage_api_key.or(defaults.alpha_vantage_api_key),
            finnhub_api_key: self.finnhub_api_key.or(defaults.finnhub_api_key),
            openai_api_key: self.openai_api_key.or(defaults.openai_api_key),
            openai_model: self.openai_model.unwrap_or(defaults.openai_model),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            rate_window: self.rate_window.unwrap_or(defaults.rate_window),
            synopsis_attempts: self.synopsis_attempts.unwrap_or(defaults.synopsis_attempts),
            synopsis_retry_delay: self
                .synopsis_retry_delay
                .unwrap_or(defaults.synopsis_retry_delay),
            synopsis_enabled: self.synopsis_enabled.unwrap_or(defaults.synopsis_enabled),
            competitors_enabled: self
                .competitors_enabled
                .unwrap_or(defaults.competitors_enabled),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            quarter_resolution: self.quarter_resolution.or(defaults.quarter_resolution),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
