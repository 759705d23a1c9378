//! API clients for stock data and search providers

pub mod alpha_vantage;
pub mod finnhub;
pub mod google_search;

pub use alpha_vantage::{AlphaVantageClient, AlphaVantageSource};
pub use finnhub::{FinnhubClient, FinnhubSource};
pub use google_search::{GoogleSearchClient, SearchHit};
