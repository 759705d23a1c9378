use super::{ReportSink, SinkKind, competitor_line};
use crate::analyzer::Analysis;
use crate::error::Result;
use crate::record::capitalize_key;
use html_escape::encode_text;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const HTML_FILE: &str = "stock_analysis.html";

const PREAMBLE: &str =
    "<html><head><title>Stock Analysis</title></head><body><h1>Stock Analysis</h1>";
const CLOSING: &str = "</body></html>";

fn fragment(analysis: &Analysis) -> String {
    let mut html = format!("<h2>Analysis for {}</h2><ul>", encode_text(&analysis.symbol));
    for (key, value) in analysis.record.fields() {
        let _ = write!(
            html,
            "<li><strong>{}:</strong> {}</li>",
            capitalize_key(key),
            encode_text(&value)
        );
    }
    let _ = write!(
        html,
        "<li><strong>Rating:</strong> {}</li>",
        encode_text(&analysis.verdict.to_string())
    );
    if let Some(synopsis) = &analysis.synopsis {
        let _ = write!(
            html,
            "<li><strong>Synopsis:</strong> {}</li>",
            encode_text(synopsis)
        );
    }
    html.push_str("</ul>");

    if !analysis.competitors.is_empty() {
        html.push_str("<h3>Competitors</h3><ul>");
        for record in &analysis.competitors {
            let _ = write!(html, "<li>{}</li>", encode_text(&competitor_line(record)));
        }
        html.push_str("</ul>");
    }
    html
}

/// HTML report; the document is closed by [`ReportSink::finish`]
pub struct HtmlSink {
    out: BufWriter<File>,
    path: PathBuf,
}

impl HtmlSink {
    pub fn create(dir: &Path) -> Result<Self> {
        let path = dir.join(HTML_FILE);
        let mut out = BufWriter::new(File::create(&path)?);
        out.write_all(PREAMBLE.as_bytes())?;
        Ok(Self { out, path })
    }
}

impl ReportSink for HtmlSink {
    fn emit(&mut self, analysis: &Analysis) -> Result<Option<String>> {
        self.out.write_all(fragment(analysis).as_bytes())?;
        Ok(Some(format!(
            "Analysis for {} has been added to {}.",
            analysis.symbol,
            self.path.display()
        )))
    }

    fn finish(&mut self) -> Result<()> {
        self.out.write_all(CLOSING.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Html
    }
}
