use super::{ReportSink, SinkKind};
use crate::analyzer::Analysis;
use crate::error::Result;
use csv::Writer;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const CSV_FILE: &str = "stock_analysis.csv";

pub const CSV_HEADER: [&str; 10] = [
    "Symbol",
    "Long Name",
    "Sector",
    "Industry",
    "Market Cap",
    "P/E Ratio",
    "Dividend Yield",
    "Current Price",
    "Recent Quarter",
    "Rating",
];

/// The record's fields in schema order followed by the rating
pub fn csv_row(analysis: &Analysis) -> [String; 10] {
    let [a, b, c, d, e, f, g, h, i] = analysis.record.fields().map(|(_, value)| value);
    [a, b, c, d, e, f, g, h, i, analysis.verdict.to_string()]
}

/// One row per analysis in [`CSV_FILE`]; the file is recreated per batch
pub struct CsvSink {
    writer: Writer<File>,
    path: PathBuf,
}

impl CsvSink {
    pub fn create(dir: &Path) -> Result<Self> {
        let path = dir.join(CSV_FILE);
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(CSV_HEADER)?;
        Ok(Self { writer, path })
    }
}

impl ReportSink for CsvSink {
    fn emit(&mut self, analysis: &Analysis) -> Result<Option<String>> {
        self.writer.write_record(csv_row(analysis))?;
        self.writer.flush()?;
        Ok(Some(format!(
            "Analysis for {} has been added to {}.",
            analysis.symbol,
            self.path.display()
        )))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{Rating, Verdict};
    use crate::record::{FieldValue, StockRecord};

    fn tsla() -> Analysis {
        let mut record = StockRecord::empty("TSLA");
        record.long_name = FieldValue::text("Tesla, Inc.");
        record.pe_ratio = FieldValue::Number(12.0);
        Analysis {
            symbol: "TSLA".to_string(),
            record,
            verdict: Verdict::Rated(Rating::Buy),
            synopsis: Some("not part of the row".to_string()),
            competitors: Vec::new(),
        }
    }

    #[test]
    fn test_row_has_ten_fields_ending_in_rating() {
        let row = csv_row(&tsla());
        assert_eq!(row.len(), 10);
        assert_eq!(row[0], "TSLA");
        assert_eq!(row[5], "12");
        assert_eq!(row[9], "Buy");
    }

    #[test]
    fn test_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::create(dir.path()).unwrap();
        sink.emit(&tsla()).unwrap();
        sink.finish().unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(CSV_FILE)).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 10);
        assert_eq!(&rows[0][1], "Tesla, Inc.");
        assert_eq!(&rows[0][9], "Buy");
    }
}
