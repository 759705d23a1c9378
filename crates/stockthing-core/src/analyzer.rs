//! Per-symbol pipeline and batch loop

use crate::api::{
    AlphaVantageClient, AlphaVantageSource, FinnhubClient, FinnhubSource, GoogleSearchClient,
};
use crate::competitors::CompetitorFinder;
use crate::config::{AppConfig, DataProvider};
use crate::error::Result;
use crate::error_log::ErrorLog;
use crate::output::ReportSink;
use crate::rating::{Verdict, assess};
use crate::record::{StockRecord, is_valid_symbol};
use crate::source::{StockDataFetcher, StockDataSource};
use crate::synopsis::SynopsisGenerator;
use crate::throttle::{FixedWindowLimiter, SmoothThrottle};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use stockthing_llm::providers::{OpenAIConfig, OpenAIProvider};
use tracing::{info, warn};

/// Everything produced for one symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub symbol: String,
    pub record: StockRecord,
    pub verdict: Verdict,
    pub synopsis: Option<String>,
    /// Competitors that could be fetched; empty when the lookup is off
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub competitors: Vec<StockRecord>,
}

/// Outcome of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub analyzed: Vec<String>,
    pub skipped: Vec<String>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.analyzed.len() + self.skipped.len()
    }
}

/// Split comma-separated input into uppercase symbols, dropping empty
/// entries and anything that is not a ticker
pub fn parse_symbols(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .filter(|s| {
            let valid = is_valid_symbol(s);
            if !valid {
                warn!("Ignoring invalid stock symbol '{s}'");
            }
            valid
        })
        .collect()
}

/// Fetch, rate and summarize symbols one at a time
pub struct Analyzer {
    fetcher: StockDataFetcher,
    synopsis: Option<SynopsisGenerator>,
    competitors: Option<CompetitorFinder>,
}

impl Analyzer {
    pub fn new(fetcher: StockDataFetcher) -> Self {
        Self {
            fetcher,
            synopsis: None,
            competitors: None,
        }
    }

    pub fn with_synopsis(mut self, generator: SynopsisGenerator) -> Self {
        self.synopsis = Some(generator);
        self
    }

    pub fn with_competitors(mut self, finder: CompetitorFinder) -> Self {
        self.competitors = Some(finder);
        self
    }

    /// Wire up the configured provider, throttle, error log and synopsis
    /// generator. Missing LLM or search keys only disable those features.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let source = build_source(config)?;
        let fetcher = StockDataFetcher::new(source, ErrorLog::new(config.error_log_path()));
        let mut analyzer = Self::new(fetcher);

        match build_synopsis(config) {
            Ok(generator) => analyzer = analyzer.with_synopsis(generator),
            Err(e) => warn!("Company synopses disabled: {e}"),
        }

        if config.competitors_enabled {
            match build_competitors(config) {
                Ok(finder) => analyzer = analyzer.with_competitors(finder),
                Err(e) => warn!("Competitor lookup disabled: {e}"),
            }
        }

        Ok(analyzer)
    }

    pub fn synopsis_enabled(&self) -> bool {
        self.synopsis.is_some()
    }

    pub fn competitors_enabled(&self) -> bool {
        self.competitors.is_some()
    }

    pub fn error_log(&self) -> &ErrorLog {
        self.fetcher.error_log()
    }

    /// Run the pipeline for one symbol; `None` when no data could be fetched
    pub async fn analyze(&self, symbol: &str) -> Option<Analysis> {
        let record = self.fetcher.fetch(symbol).await?;

        let (verdict, rating_error) = assess(&record);
        if let Some(e) = rating_error {
            warn!("Error analyzing stock data for {symbol}: {e}");
            self.error_log()
                .record(&format!("Error analyzing stock data for {symbol}: {e}"));
        }

        let synopsis = match &self.synopsis {
            Some(generator) => Some(generator.generate(&record, verdict).await),
            None => None,
        };

        let competitors = self.competitors(&record.symbol).await;

        info!(source = self.fetcher.source_name(), "Analyzed {symbol}: {verdict}");
        Some(Analysis {
            symbol: record.symbol.clone(),
            record,
            verdict,
            synopsis,
            competitors,
        })
    }

    /// Records for the competitors of `symbol` that could be fetched; empty
    /// when the lookup is off or the provider gave no usable answer
    pub async fn competitors(&self, symbol: &str) -> Vec<StockRecord> {
        let Some(finder) = &self.competitors else {
            return Vec::new();
        };

        let tickers = match finder.find(symbol).await {
            Ok(tickers) => tickers,
            Err(e) => {
                warn!("Error fetching competing companies for {symbol}: {e}");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            if let Some(record) = self.fetcher.fetch(ticker).await {
                records.push(record);
            }
        }
        records
    }

    /// Analyze `symbols` in order, writing each result to `sink` and user
    /// notices to `out`. Failed symbols are reported and skipped.
    pub async fn run_batch(
        &self,
        symbols: &[String],
        sink: &mut dyn ReportSink,
        out: &mut dyn Write,
    ) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for symbol in symbols {
            let Some(analysis) = self.analyze(symbol).await else {
                writeln!(out, "Unable to fetch data for {symbol}. Skipping...")?;
                summary.skipped.push(symbol.clone());
                continue;
            };

            match sink.emit(&analysis) {
                Ok(notice) => {
                    if let Some(notice) = notice {
                        writeln!(out, "{notice}")?;
                    }
                    summary.analyzed.push(symbol.clone());
                }
                Err(e) => {
                    warn!("Failed to write analysis for {symbol}: {e}");
                    self.error_log()
                        .record(&format!("Error writing analysis for {symbol}: {e}"));
                    writeln!(out, "Unable to write analysis for {symbol}. Skipping...")?;
                    summary.skipped.push(symbol.clone());
                }
            }
        }

        sink.finish()?;
        info!(
            "Batch finished: {} analyzed, {} skipped",
            summary.analyzed.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }
}

fn build_source(config: &AppConfig) -> Result<Arc<dyn StockDataSource>> {
    let key = config.provider_api_key().unwrap_or_default();
    let policy = config.effective_quarter_resolution();

    let source: Arc<dyn StockDataSource> = match config.provider {
        DataProvider::AlphaVantage => {
            let throttle = Arc::new(FixedWindowLimiter::new(
                config.alpha_vantage_rate_limit,
                config.rate_window,
            ));
            let client = AlphaVantageClient::new(key, throttle, config.request_timeout)?;
            Arc::new(AlphaVantageSource::new(client, policy))
        }
        DataProvider::Finnhub => {
            let throttle = Arc::new(SmoothThrottle::per_minute(config.finnhub_rate_limit));
            let client = FinnhubClient::new(key, throttle, config.request_timeout)?;
            Arc::new(FinnhubSource::new(client, policy))
        }
    };
    Ok(source)
}

fn build_llm(config: &AppConfig) -> Result<Arc<OpenAIProvider>> {
    let mut llm_config = OpenAIConfig::new(config.openai_api_key.clone().unwrap_or_default())
        .with_timeout(config.request_timeout.as_secs());
    if let Some(base) = &config.openai_api_base {
        llm_config = llm_config.with_api_base(base);
    }
    Ok(Arc::new(OpenAIProvider::with_config(llm_config)?))
}

fn build_competitors(config: &AppConfig) -> Result<CompetitorFinder> {
    config.competitor_requirements()?;
    Ok(CompetitorFinder::new(build_llm(config)?, &config.openai_model))
}

fn build_synopsis(config: &AppConfig) -> Result<SynopsisGenerator> {
    config.synopsis_requirements()?;

    let mut generator = SynopsisGenerator::new(build_llm(config)?, &config.openai_model)
        .with_retry(config.synopsis_attempts, config.synopsis_retry_delay);

    match config.search_requirements() {
        Ok(()) => {
            let search = GoogleSearchClient::new(
                config.google_api_key.clone().unwrap_or_default(),
                config.search_engine_id.clone().unwrap_or_default(),
                config.request_timeout,
            )?;
            generator = generator.with_search(search);
        }
        Err(e) => warn!("Search context disabled: {e}"),
    }

    Ok(generator)
}
