//! P/E threshold rating

use crate::error::{Result, StockError};
use crate::record::{FieldValue, StockRecord};
use serde::Serialize;
use std::fmt;

/// Below this P/E a stock is rated Buy
pub const BUY_BELOW: f64 = 15.0;
/// Above this P/E a stock is rated Sell; the range in between is Hold
pub const SELL_ABOVE: f64 = 25.0;

/// Recommendation derived from the P/E ratio alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
    Buy,
    Hold,
    Sell,
    NoRating,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Sell => "Sell",
            Self::NoRating => "No Rating (P/E ratio unavailable)",
        })
    }
}

/// Rating outcome as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Rated(Rating),
    /// The P/E value could not be interpreted
    Unrated,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rated(rating) => rating.fmt(f),
            Self::Unrated => f.write_str("Unable to provide a rating."),
        }
    }
}

/// Rate a P/E value.
///
/// Numeric strings are accepted; anything else that is not the N/A sentinel
/// is [`StockError::InvalidRatio`].
pub fn rate(pe_ratio: &FieldValue) -> Result<Rating> {
    let pe = match pe_ratio {
        FieldValue::NotAvailable => return Ok(Rating::NoRating),
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| StockError::InvalidRatio(s.clone()))?,
    };

    if pe.is_nan() {
        return Err(StockError::InvalidRatio(pe_ratio.to_string()));
    }

    Ok(if pe < BUY_BELOW {
        Rating::Buy
    } else if pe <= SELL_ABOVE {
        Rating::Hold
    } else {
        Rating::Sell
    })
}

/// Rate a record, folding an unreadable ratio into [`Verdict::Unrated`]
pub fn assess(record: &StockRecord) -> (Verdict, Option<StockError>) {
    match rate(&record.pe_ratio) {
        Ok(rating) => (Verdict::Rated(rating), None),
        Err(e) => (Verdict::Unrated, Some(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_num(pe: f64) -> Rating {
        rate(&FieldValue::Number(pe)).unwrap()
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(rate_num(-3.0), Rating::Buy);
        assert_eq!(rate_num(12.0), Rating::Buy);
        assert_eq!(rate_num(14.99), Rating::Buy);
        assert_eq!(rate_num(20.0), Rating::Hold);
        assert_eq!(rate_num(25.01), Rating::Sell);
        assert_eq!(rate_num(80.0), Rating::Sell);
    }

    #[test]
    fn test_boundaries_are_hold() {
        assert_eq!(rate_num(15.0), Rating::Hold);
        assert_eq!(rate_num(25.0), Rating::Hold);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        assert_eq!(rate(&FieldValue::text("12.5")).unwrap(), Rating::Buy);
        assert_eq!(rate(&FieldValue::text(" 25 ")).unwrap(), Rating::Hold);
        assert_eq!(rate(&FieldValue::text("31.07")).unwrap(), Rating::Sell);
    }

    #[test]
    fn test_sentinel_is_no_rating() {
        assert_eq!(rate(&FieldValue::NotAvailable).unwrap(), Rating::NoRating);
        assert_eq!(rate(&FieldValue::text("None")).unwrap(), Rating::NoRating);
    }

    #[test]
    fn test_non_numeric_is_invalid_ratio() {
        let err = rate(&FieldValue::Text("abc".to_string())).unwrap_err();
        assert!(matches!(err, StockError::InvalidRatio(ref v) if v == "abc"));
        assert!(rate(&FieldValue::Number(f64::NAN)).is_err());
    }

    #[test]
    fn test_assess_falls_back_to_unrated() {
        let mut record = StockRecord::empty("XYZ");
        record.pe_ratio = FieldValue::Text("n/a?".to_string());

        let (verdict, error) = assess(&record);
        assert_eq!(verdict, Verdict::Unrated);
        assert!(error.is_some());
        assert_eq!(verdict.to_string(), "Unable to provide a rating.");
    }

    #[test]
    fn test_display() {
        assert_eq!(Verdict::Rated(Rating::Buy).to_string(), "Buy");
        assert_eq!(
            Verdict::Rated(Rating::NoRating).to_string(),
            "No Rating (P/E ratio unavailable)"
        );
    }
}
