//! Terminal dashboard: a running table of analyzed symbols

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use stockthing_core::{Analysis, Rating, Verdict};

const HEADER: [&str; 7] = [
    "Symbol",
    "Name",
    "Sector",
    "Industry",
    "P/E Ratio",
    "Price",
    "Rating",
];

fn rating_cell(verdict: Verdict) -> Cell {
    let cell = Cell::new(verdict.to_string());
    match verdict {
        Verdict::Rated(Rating::Buy) => cell.fg(Color::Green),
        Verdict::Rated(Rating::Hold) => cell.fg(Color::Yellow),
        Verdict::Rated(Rating::Sell) => cell.fg(Color::Red),
        _ => cell,
    }
}

/// Summary table of every analysis shown so far
pub fn render(analyses: &[Analysis]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(HEADER);

    for analysis in analyses {
        let record = &analysis.record;
        table.add_row(vec![
            Cell::new(&analysis.symbol),
            Cell::new(&record.long_name),
            Cell::new(&record.sector),
            Cell::new(&record.industry),
            Cell::new(&record.pe_ratio),
            Cell::new(&record.current_price),
            rating_cell(analysis.verdict),
        ]);
    }

    table
}
