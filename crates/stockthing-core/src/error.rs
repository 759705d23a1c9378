//! Error types for stock analysis operations

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed or the provider reported an error message
    #[error("API error: {0}")]
    ApiError(String),

    /// The provider answered, but without the company identity field
    #[error("Unable to fetch data for symbol: {symbol}. Response: {response}")]
    DataUnavailable {
        symbol: String,
        response: String,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Symbol with characters no ticker uses
    #[error("Invalid stock symbol: {0}")]
    InvalidSymbol(String),

    /// P/E value that is neither numeric nor the N/A sentinel
    #[error("Invalid P/E ratio: {0}")]
    InvalidRatio(String),

    /// Text generation gave up after retries
    #[error("Synopsis generation failed: {0}")]
    GenerationFailure(String),

    /// Error from the text-generation provider
    #[error("LLM error: {0}")]
    Llm(#[from] stockthing_llm::LLMError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File output error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::DataUnavailable {
            symbol: "ZZZZ123".to_string(),
            response: "{}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to fetch data for symbol: ZZZZ123. Response: {}"
        );

        let err = StockError::InvalidRatio("abc".to_string());
        assert_eq!(err.to_string(), "Invalid P/E ratio: abc");
    }
}
