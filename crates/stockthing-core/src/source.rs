//! Stock data sources and the fetch boundary

use crate::error::Result;
use crate::error_log::ErrorLog;
use crate::record::StockRecord;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// A provider able to produce a normalized [`StockRecord`] for a symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockDataSource: Send + Sync {
    /// Fetch and normalize one symbol
    async fn fetch(&self, symbol: &str) -> Result<StockRecord>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

/// Wraps a source so failures become `None` plus one error-log line
pub struct StockDataFetcher {
    source: Arc<dyn StockDataSource>,
    error_log: ErrorLog,
}

impl StockDataFetcher {
    pub fn new(source: Arc<dyn StockDataSource>, error_log: ErrorLog) -> Self {
        Self { source, error_log }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Fetch `symbol`, or `None` if the provider failed in any way
    pub async fn fetch(&self, symbol: &str) -> Option<StockRecord> {
        debug!(source = self.source.name(), "Fetching {symbol}");
        match self.source.fetch(symbol).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(source = self.source.name(), "Error fetching data for {symbol}: {e}");
                self.error_log
                    .record(&format!("Error fetching data for {symbol}: {e}"));
                None
            }
        }
    }
}
