//! Stock metadata analysis
//!
//! This crate fetches company metadata from a quota-limited financial-data
//! API, rates each stock on its P/E ratio, optionally asks a language model for
//! a short synopsis, and writes the result to one of several report sinks. It
//! includes:
//!
//! - Data sources for Alpha Vantage (OVERVIEW + EARNINGS) and Finnhub
//! - Client-side throttling so free-tier quotas are never exceeded
//! - P/E threshold ratings (Buy below 15, Sell above 25, Hold in between)
//! - Synopsis generation with web-search context and fixed-delay retry
//! - Optional competitor lookup through the same data source
//! - Console, text file, CSV and HTML report sinks
//! - An append-only error log for everything that was skipped
//!
//! # Example
//!
//! ```rust,no_run
//! use stockthing_core::{AppConfig, Analyzer, SinkKind, parse_symbols};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let analyzer = Analyzer::from_config(&config)?;
//!
//!     let mut sink = SinkKind::Console.open(&config.output_dir)?;
//!     let summary = analyzer
//!         .run_batch(&parse_symbols("AAPL,MSFT"), sink.as_mut(), &mut std::io::stdout())
//!         .await?;
//!     println!("{} analyzed", summary.analyzed.len());
//!
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod api;
pub mod competitors;
pub mod config;
pub mod error;
pub mod error_log;
pub mod output;
pub mod quarter;
pub mod rating;
pub mod record;
pub mod source;
pub mod synopsis;
pub mod throttle;

pub use analyzer::{Analysis, Analyzer, BatchSummary, parse_symbols};
pub use competitors::CompetitorFinder;
pub use config::{AppConfig, AppConfigBuilder, DataProvider};
pub use error::{Result, StockError};
pub use error_log::ErrorLog;
pub use output::{ReportSink, SinkKind};
pub use quarter::QuarterResolution;
pub use rating::{Rating, Verdict, assess, rate};
pub use record::{FieldValue, NOT_AVAILABLE, StockRecord, is_valid_symbol};
pub use source::{StockDataFetcher, StockDataSource};
pub use synopsis::SynopsisGenerator;
pub use throttle::{FixedWindowLimiter, SmoothThrottle, Throttle};
