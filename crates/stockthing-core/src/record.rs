//! Normalized stock snapshot

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Sentinel rendered for any value the upstream provider did not supply
pub const NOT_AVAILABLE: &str = "N/A";

/// Markers providers use in place of a value
const ABSENT_MARKERS: [&str; 4] = ["", "None", "-", NOT_AVAILABLE];

/// A single record value: providers hand back numbers, numeric strings or
/// free text, and sometimes nothing at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    #[default]
    NotAvailable,
}

impl FieldValue {
    /// Build from provider text, mapping absent markers to [`FieldValue::NotAvailable`]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if ABSENT_MARKERS.contains(&value.trim()) {
            Self::NotAvailable
        } else {
            Self::Text(value)
        }
    }

    /// Build from an optional JSON value as found in a provider response
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::NotAvailable,
            Some(Value::String(s)) => Self::text(s.as_str()),
            Some(Value::Number(n)) => n.as_f64().map_or(Self::NotAvailable, Self::Number),
            Some(other) => Self::Text(other.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::NotAvailable)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// One normalized snapshot per symbol.
///
/// Every field is always present; missing upstream data is
/// [`FieldValue::NotAvailable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRecord {
    pub symbol: String,
    pub long_name: FieldValue,
    pub sector: FieldValue,
    pub industry: FieldValue,
    pub market_cap: FieldValue,
    pub pe_ratio: FieldValue,
    pub dividend_yield: FieldValue,
    pub current_price: FieldValue,
    pub recent_quarter: FieldValue,
}

impl StockRecord {
    /// A record with only the symbol known
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            long_name: FieldValue::NotAvailable,
            sector: FieldValue::NotAvailable,
            industry: FieldValue::NotAvailable,
            market_cap: FieldValue::NotAvailable,
            pe_ratio: FieldValue::NotAvailable,
            dividend_yield: FieldValue::NotAvailable,
            current_price: FieldValue::NotAvailable,
            recent_quarter: FieldValue::NotAvailable,
        }
    }

    /// `(key, rendered value)` pairs in schema order
    pub fn fields(&self) -> [(&'static str, String); 9] {
        [
            ("symbol", self.symbol.clone()),
            ("long_name", self.long_name.to_string()),
            ("sector", self.sector.to_string()),
            ("industry", self.industry.to_string()),
            ("market_cap", self.market_cap.to_string()),
            ("pe_ratio", self.pe_ratio.to_string()),
            ("dividend_yield", self.dividend_yield.to_string()),
            ("current_price", self.current_price.to_string()),
            ("recent_quarter", self.recent_quarter.to_string()),
        ]
    }
}

/// Ticker characters: ASCII letters and digits plus `.`, `-`, `^` and `=`
/// (`BRK.B`, `^GSPC`, `EURUSD=X`)
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

/// Capitalize a field key for display: first letter upper, rest lower
/// (`long_name` becomes `Long_name`).
pub fn capitalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
