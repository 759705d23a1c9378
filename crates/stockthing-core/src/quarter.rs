//! Most-recent fiscal quarter resolution
//!
//! Providers disagree on whether they report the latest fiscal quarter, so
//! each source picks a policy for the case where nothing usable comes back.

use crate::error::{Result, StockError};
use crate::record::FieldValue;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Policy applied when the provider omits the latest fiscal quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuarterResolution {
    /// Use what the provider reported, otherwise N/A
    ProviderReported,
    /// Use what the provider reported, otherwise the end of the last
    /// completed calendar quarter
    CalendarFallback,
}

impl QuarterResolution {
    /// Resolve the quarter end date.
    ///
    /// A reported value is only used when it is an ISO `YYYY-MM-DD` date.
    pub fn resolve(self, reported: Option<&str>, today: NaiveDate) -> FieldValue {
        let reported = reported
            .and_then(|r| NaiveDate::parse_from_str(r.trim(), DATE_FORMAT).ok())
            .map(|d| d.format(DATE_FORMAT).to_string());

        match (reported, self) {
            (Some(date), _) => FieldValue::Text(date),
            (None, Self::ProviderReported) => FieldValue::NotAvailable,
            (None, Self::CalendarFallback) => {
                FieldValue::Text(last_calendar_quarter_end(today).format(DATE_FORMAT).to_string())
            }
        }
    }
}

impl fmt::Display for QuarterResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProviderReported => "provider-reported",
            Self::CalendarFallback => "calendar-fallback",
        })
    }
}

impl FromStr for QuarterResolution {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "provider-reported" | "provider" => Ok(Self::ProviderReported),
            "calendar-fallback" | "calendar" => Ok(Self::CalendarFallback),
            other => Err(StockError::ConfigError(format!(
                "Unknown quarter resolution '{other}' \
                 (expected provider-reported or calendar-fallback)"
            ))),
        }
    }
}

/// End date of the last calendar quarter that finished before `today`'s quarter
pub fn last_calendar_quarter_end(today: NaiveDate) -> NaiveDate {
    let year = today.year();
    let (year, month, day) = match today.month() {
        1..=3 => (year - 1, 12, 31),
        4..=6 => (year, 3, 31),
        7..=9 => (year, 6, 30),
        _ => (year, 9, 30),
    };
    // Quarter ends are fixed valid dates
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(today)
}
