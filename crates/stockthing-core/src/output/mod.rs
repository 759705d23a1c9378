//! Report sinks
//!
//! Every analysis is handed to exactly one [`ReportSink`] chosen through
//! [`SinkKind`]. Sinks own their file handles for the whole batch and are
//! closed with [`ReportSink::finish`].

mod csv_sink;
mod html;
mod text;

pub use csv_sink::{CSV_FILE, CSV_HEADER, CsvSink, csv_row};
pub use html::{HTML_FILE, HtmlSink};
pub use text::{ConsoleSink, PerSymbolFileSink, SINGLE_FILE, SingleFileSink, format_block};

use crate::analyzer::Analysis;
use crate::error::{Result, StockError};
use crate::rating::assess;
use crate::record::StockRecord;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Where analyses are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    SingleFile,
    PerSymbolFile,
    Csv,
    Html,
    /// Interactive table view; handled by the front end, not a [`ReportSink`]
    Dashboard,
}

impl SinkKind {
    /// Menu entries in display order
    pub const MENU: [(Self, &'static str); 6] = [
        (
            Self::Console,
            "Console: Display the analysis directly in the terminal.",
        ),
        (
            Self::SingleFile,
            "One: Save all analyses in a single text file (stock_analysis.txt).",
        ),
        (
            Self::PerSymbolFile,
            "Multiple: Save each stock's analysis in separate text files (e.g., TSLA_analysis.txt).",
        ),
        (
            Self::Csv,
            "CSV: Save all analyses in a structured CSV file (stock_analysis.csv).",
        ),
        (
            Self::Html,
            "HTML: Generate an HTML report (stock_analysis.html).",
        ),
        (
            Self::Dashboard,
            "Dashboard: Browse analyses in an interactive terminal table.",
        ),
    ];

    /// Map a menu answer ("1" to "6"); anything else selects per-symbol files
    pub fn from_menu_choice(choice: &str) -> Self {
        match choice.trim() {
            "1" => Self::Console,
            "2" => Self::SingleFile,
            "3" => Self::PerSymbolFile,
            "4" => Self::Csv,
            "5" => Self::Html,
            "6" => Self::Dashboard,
            _ => Self::PerSymbolFile,
        }
    }

    /// Open the sink for a batch, creating files under `dir`
    pub fn open(self, dir: &Path) -> Result<Box<dyn ReportSink>> {
        let sink: Box<dyn ReportSink> = match self {
            Self::Console => Box::new(ConsoleSink::stdout()),
            Self::SingleFile => Box::new(SingleFileSink::open(dir)?),
            Self::PerSymbolFile => Box::new(PerSymbolFileSink::new(dir)),
            Self::Csv => Box::new(CsvSink::create(dir)?),
            Self::Html => Box::new(HtmlSink::create(dir)?),
            Self::Dashboard => {
                return Err(StockError::ConfigError(
                    "the dashboard is interactive and cannot be opened as a report sink"
                        .to_string(),
                ));
            }
        };
        Ok(sink)
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Console => "console",
            Self::SingleFile => "one",
            Self::PerSymbolFile => "multiple",
            Self::Csv => "csv",
            Self::Html => "html",
            Self::Dashboard => "dashboard",
        })
    }
}

impl FromStr for SinkKind {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "one" | "single" => Ok(Self::SingleFile),
            "multiple" | "per-symbol" => Ok(Self::PerSymbolFile),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            "dashboard" => Ok(Self::Dashboard),
            other => Err(StockError::ConfigError(format!("Unknown output sink '{other}'"))),
        }
    }
}

/// One-line competitor summary shared by the text and HTML reports
fn competitor_line(record: &StockRecord) -> String {
    let (verdict, _) = assess(record);
    format!(
        "{}: {} (P/E ratio: {}, rating: {verdict})",
        record.symbol, record.long_name, record.pe_ratio
    )
}

/// Destination for a batch of analyses
pub trait ReportSink: Send {
    /// Write one analysis; returns a notice for the user, if any
    fn emit(&mut self, analysis: &Analysis) -> Result<Option<String>>;

    /// Close out the batch (footers, flushing)
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> SinkKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choices() {
        assert_eq!(SinkKind::from_menu_choice("1"), SinkKind::Console);
        assert_eq!(SinkKind::from_menu_choice(" 4 "), SinkKind::Csv);
        assert_eq!(SinkKind::from_menu_choice("6"), SinkKind::Dashboard);
        assert_eq!(SinkKind::from_menu_choice("9"), SinkKind::PerSymbolFile);
        assert_eq!(SinkKind::from_menu_choice(""), SinkKind::PerSymbolFile);
    }

    #[test]
    fn test_menu_order_matches_choices() {
        for (index, (kind, _)) in SinkKind::MENU.iter().enumerate() {
            assert_eq!(SinkKind::from_menu_choice(&(index + 1).to_string()), *kind);
        }
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for (kind, _) in SinkKind::MENU {
            assert_eq!(kind.to_string().parse::<SinkKind>().unwrap(), kind);
        }
        assert!("pdf".parse::<SinkKind>().is_err());
    }

    #[test]
    fn test_competitor_line_carries_rating() {
        let mut record = StockRecord::empty("GM");
        record.long_name = crate::record::FieldValue::text("General Motors");
        record.pe_ratio = crate::record::FieldValue::Number(5.4);
        assert_eq!(
            competitor_line(&record),
            "GM: General Motors (P/E ratio: 5.4, rating: Buy)"
        );
    }

    #[test]
    fn test_dashboard_is_not_a_sink() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SinkKind::Dashboard.open(dir.path()).is_err());

        let sink = SinkKind::Csv.open(dir.path()).unwrap();
        assert_eq!(sink.kind(), SinkKind::Csv);
    }
}
