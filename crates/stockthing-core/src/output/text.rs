use super::{ReportSink, SinkKind, competitor_line};
use crate::analyzer::Analysis;
use crate::error::{Result, StockError};
use crate::record::{capitalize_key, is_valid_symbol};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};

/// Shared report file for the single-file sink
pub const SINGLE_FILE: &str = "stock_analysis.txt";

const SINGLE_FILE_TITLE: &str = "=== Stock Analysis ===\n\n";

/// Plain-text block for one analysis, optionally headed by the symbol title
pub fn format_block(analysis: &Analysis, titled: bool) -> String {
    let symbol = &analysis.symbol;
    let mut block = String::new();

    if titled {
        let _ = writeln!(block, "=== Analysis for {symbol} ===");
    }
    block.push_str("=== Stock Information ===\n");
    for (key, value) in analysis.record.fields() {
        let _ = writeln!(block, "{}: {value}", capitalize_key(key));
    }
    block.push_str("\n=== Rating ===\n");
    let _ = writeln!(block, "The rating for {symbol} is: {}\n", analysis.verdict);

    if let Some(synopsis) = &analysis.synopsis {
        let _ = writeln!(block, "=== Company Synopsis ===\n{synopsis}\n");
    }

    if !analysis.competitors.is_empty() {
        block.push_str("=== Competitors ===\n");
        for record in &analysis.competitors {
            let _ = writeln!(block, "{}", competitor_line(record));
        }
        block.push('\n');
    }

    block
}

/// Prints blocks to a terminal (or any writer)
pub struct ConsoleSink<W: Write + Send> {
    out: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ReportSink for ConsoleSink<W> {
    fn emit(&mut self, analysis: &Analysis) -> Result<Option<String>> {
        write!(self.out, "\n{}", format_block(analysis, true))?;
        self.out.flush()?;
        Ok(None)
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }
}

/// Appends every block of the batch to [`SINGLE_FILE`]
pub struct SingleFileSink {
    file: File,
    path: PathBuf,
}

impl SingleFileSink {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(SINGLE_FILE);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() == 0 {
            file.write_all(SINGLE_FILE_TITLE.as_bytes())?;
        }
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for SingleFileSink {
    fn emit(&mut self, analysis: &Analysis) -> Result<Option<String>> {
        self.file.write_all(format_block(analysis, true).as_bytes())?;
        Ok(Some(format!(
            "Analysis for {} has been added to {}.",
            analysis.symbol,
            self.path.display()
        )))
    }

    fn finish(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::SingleFile
    }
}

/// Writes `{symbol}_analysis.txt` per analysis, replacing earlier runs
pub struct PerSymbolFileSink {
    dir: PathBuf,
}

impl PerSymbolFileSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Report path for `symbol`; symbols must stay inside the output directory
    pub fn path_for(&self, symbol: &str) -> Result<PathBuf> {
        if !is_valid_symbol(symbol) {
            return Err(StockError::InvalidSymbol(symbol.to_string()));
        }
        Ok(self.dir.join(format!("{symbol}_analysis.txt")))
    }
}

impl ReportSink for PerSymbolFileSink {
    fn emit(&mut self, analysis: &Analysis) -> Result<Option<String>> {
        let path = self.path_for(&analysis.symbol)?;
        std::fs::write(&path, format_block(analysis, false))?;
        Ok(Some(format!(
            "Analysis for {} has been saved to {}.",
            analysis.symbol,
            path.display()
        )))
    }

    fn kind(&self) -> SinkKind {
        SinkKind::PerSymbolFile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{Rating, Verdict};
    use crate::record::{FieldValue, StockRecord};

    fn analysis(symbol: &str, synopsis: Option<&str>) -> Analysis {
        let mut record = StockRecord::empty(symbol);
        record.long_name = FieldValue::text("Tesla Inc");
        record.pe_ratio = FieldValue::Number(12.0);
        Analysis {
            symbol: symbol.to_string(),
            record,
            verdict: Verdict::Rated(Rating::Buy),
            synopsis: synopsis.map(str::to_string),
            competitors: Vec::new(),
        }
    }

    #[test]
    fn test_block_layout() {
        let block = format_block(&analysis("TSLA", None), true);
        let lines: Vec<_> = block.lines().collect();

        assert_eq!(lines[0], "=== Analysis for TSLA ===");
        assert_eq!(lines[1], "=== Stock Information ===");
        assert_eq!(lines[2], "Symbol: TSLA");
        assert_eq!(lines[3], "Long_name: Tesla Inc");
        assert_eq!(lines[6], "Market_cap: N/A");
        assert_eq!(lines[7], "Pe_ratio: 12");
        assert_eq!(lines[11], "");
        assert_eq!(lines[12], "=== Rating ===");
        assert_eq!(lines[13], "The rating for TSLA is: Buy");
        assert!(!block.contains("Synopsis"));
    }

    #[test]
    fn test_block_with_synopsis() {
        let block = format_block(&analysis("TSLA", Some("Electric cars.")), false);
        assert!(block.starts_with("=== Stock Information ===\n"));
        assert!(block.ends_with("=== Company Synopsis ===\nElectric cars.\n\n"));
    }

    #[test]
    fn test_block_with_competitors() {
        let mut with_rivals = analysis("TSLA", None);
        let mut rival = StockRecord::empty("F");
        rival.long_name = FieldValue::text("Ford Motor Co");
        rival.pe_ratio = FieldValue::Number(30.0);
        with_rivals.competitors.push(rival);

        let block = format_block(&with_rivals, false);
        assert!(block.ends_with(
            "=== Competitors ===\nF: Ford Motor Co (P/E ratio: 30, rating: Sell)\n\n"
        ));
    }

    #[test]
    fn test_console_sink_writes_block() {
        let mut sink = ConsoleSink::new(Vec::new());
        let notice = sink.emit(&analysis("TSLA", None)).unwrap();
        assert!(notice.is_none());

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("\n=== Analysis for TSLA ===\n"));
    }

    #[test]
    fn test_single_file_appends_under_one_title() {
        let dir = tempfile::tempdir().unwrap();

        let mut sink = SingleFileSink::open(dir.path()).unwrap();
        sink.emit(&analysis("TSLA", None)).unwrap();
        sink.finish().unwrap();

        let mut sink = SingleFileSink::open(dir.path()).unwrap();
        let notice = sink.emit(&analysis("AAPL", None)).unwrap().unwrap();
        sink.finish().unwrap();
        assert!(notice.starts_with("Analysis for AAPL has been added to "));

        let contents = std::fs::read_to_string(dir.path().join(SINGLE_FILE)).unwrap();
        assert_eq!(contents.matches("=== Stock Analysis ===").count(), 1);
        let tsla = contents.find("=== Analysis for TSLA ===");
        assert!(tsla < contents.find("=== Analysis for AAPL ==="));
    }

    #[test]
    fn test_per_symbol_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PerSymbolFileSink::new(dir.path());

        sink.emit(&analysis("TSLA", None)).unwrap();
        let notice = sink
            .emit(&analysis("TSLA", Some("Second run.")))
            .unwrap()
            .unwrap();
        assert!(notice.contains("TSLA_analysis.txt"));

        let contents = std::fs::read_to_string(sink.path_for("TSLA").unwrap()).unwrap();
        assert_eq!(contents.matches("=== Stock Information ===").count(), 1);
        assert!(contents.contains("Second run."));
        assert!(!contents.contains("=== Analysis for"));
    }

    #[test]
    fn test_per_symbol_path_stays_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PerSymbolFileSink::new(dir.path());

        assert!(matches!(
            sink.path_for("../escape"),
            Err(StockError::InvalidSymbol(_))
        ));
        assert!(sink.emit(&analysis("../escape", None)).is_err());
        assert!(!dir.path().join("../escape_analysis.txt").exists());
    }
}
