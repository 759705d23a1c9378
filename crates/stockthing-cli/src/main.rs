//! stockthing: rate stocks on their P/E ratio from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Keys are read from api.env (or the process environment)
//! echo 'ALPHA_VANTAGE_API_KEY=...' > api.env
//!
//! # Interactive menu
//! cargo run -p stockthing-cli
//!
//! # One-shot batch
//! cargo run -p stockthing-cli -- --sink csv --symbols AAPL,MSFT,TSLA
//! ```

mod dashboard;
mod prompt;

use anyhow::Context;
use clap::Parser;
use prompt::Prompter;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use stockthing_core::{
    AppConfig, Analyzer, DataProvider, QuarterResolution, SinkKind, parse_symbols,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "stockthing")]
#[command(about = "Fetch stock metadata, rate it on P/E and write reports", long_about = None)]
struct Args {
    /// Dotenv file with API keys (searched in the current directory and its parents)
    #[arg(long, default_value = "api.env")]
    env_file: PathBuf,

    /// Stock data provider (alpha-vantage or finnhub)
    #[arg(long)]
    provider: Option<DataProvider>,

    /// Directory for reports and the error log
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip LLM-generated company synopses
    #[arg(long)]
    no_synopsis: bool,

    /// Look up each symbol's main competitors and fetch them too
    #[arg(long)]
    competitors: bool,

    /// Quarter policy when the provider reports none (provider-reported or calendar-fallback)
    #[arg(long)]
    quarter_resolution: Option<QuarterResolution>,

    /// Output sink (console, one, multiple, csv, html, dashboard); skips the menu
    #[arg(long)]
    sink: Option<SinkKind>,

    /// Comma-separated symbols; runs a single batch into --sink and exits
    #[arg(long, requires = "sink")]
    symbols: Option<String>,
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut builder = AppConfig::builder().from_env()?;

    if let Some(provider) = args.provider {
        builder = builder.provider(provider);
    }
    if let Some(dir) = &args.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(policy) = args.quarter_resolution {
        builder = builder.quarter_resolution(policy);
    }
    if args.no_synopsis {
        builder = builder.synopsis_enabled(false);
    }
    if args.competitors {
        builder = builder.competitors_enabled(true);
    }

    Ok(builder.build()?)
}

fn print_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nHow do you want to display the stock analyses?")?;
    for (index, (_, description)) in SinkKind::MENU.iter().enumerate() {
        writeln!(out, "{}. {description}", index + 1)?;
    }
    Ok(())
}

/// Run one batch into a freshly opened sink
async fn run_batch(
    analyzer: &Analyzer,
    config: &AppConfig,
    kind: SinkKind,
    symbols: &[String],
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut sink = kind
        .open(&config.output_dir)
        .with_context(|| format!("Failed to open {kind} output"))?;
    let summary = analyzer.run_batch(symbols, sink.as_mut(), out).await?;
    debug!(?summary, "Batch complete");
    Ok(())
}

/// Repeated symbol prompts, re-rendering the table after each batch
async fn run_dashboard<R: BufRead, W: Write>(
    analyzer: &Analyzer,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let mut analyses = Vec::new();

    loop {
        let Some(input) =
            prompter.ask("Enter stock symbol(s) for the dashboard (or press Enter to leave): ")?
        else {
            break;
        };
        let symbols = parse_symbols(&input);
        if symbols.is_empty() {
            break;
        }

        for symbol in &symbols {
            match analyzer.analyze(symbol).await {
                Some(analysis) => analyses.push(analysis),
                None => writeln!(
                    prompter.output(),
                    "Unable to fetch data for {symbol}. Skipping..."
                )?,
            }
        }
        writeln!(prompter.output(), "{}", dashboard::render(&analyses))?;
    }

    Ok(())
}

async fn run_interactive<R: BufRead, W: Write>(
    analyzer: &Analyzer,
    config: &AppConfig,
    preselected: Option<SinkKind>,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    loop {
        let kind = match preselected {
            Some(kind) => kind,
            None => {
                print_menu(prompter.output())?;
                let choice = prompter
                    .ask("Enter your choice (1/2/3/4/5/6): ")?
                    .unwrap_or_default();
                SinkKind::from_menu_choice(&choice)
            }
        };

        if kind == SinkKind::Dashboard {
            writeln!(prompter.output(), "Launching the interactive dashboard...")?;
            run_dashboard(analyzer, prompter).await?;
            writeln!(prompter.output(), "Exiting the program. Goodbye!")?;
            return Ok(());
        }

        let input = prompter
            .ask("Enter stock symbol(s) (comma-separated for multiple, or press Enter to exit): ")?
            .unwrap_or_default();
        let symbols = parse_symbols(&input);
        if symbols.is_empty() {
            writeln!(prompter.output(), "Exiting the program. Goodbye!")?;
            return Ok(());
        }

        info!("Analyzing {} symbol(s) into {kind}", symbols.len());
        if let Err(e) = run_batch(analyzer, config, kind, &symbols, prompter.output()).await {
            writeln!(prompter.output(), "Error: {e:#}")?;
        }

        if !prompter.confirm("Do you want to analyze more stock symbols? (yes/no): ")? {
            writeln!(prompter.output(), "Exiting the program. Goodbye!")?;
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    stockthing_utils::init_tracing("warn,stockthing_core=info");

    match stockthing_utils::load_env_file(&args.env_file)? {
        Some(path) => debug!("Loaded environment from {}", path.display()),
        None => debug!(
            "No {} found; using the process environment",
            args.env_file.display()
        ),
    }

    let config = load_config(&args).context("Invalid configuration")?;
    let analyzer = Analyzer::from_config(&config)?;
    if !analyzer.synopsis_enabled() && config.synopsis_enabled {
        eprintln!("Warning: OPENAI_API_KEY is not set; company synopses are disabled.");
    }
    if !analyzer.competitors_enabled() && config.competitors_enabled {
        eprintln!("Warning: OPENAI_API_KEY is not set; competitor lookup is disabled.");
    }

    match (args.sink, args.symbols.as_deref()) {
        (Some(kind), Some(symbols)) if kind != SinkKind::Dashboard => {
            let symbols = parse_symbols(symbols);
            run_batch(&analyzer, &config, kind, &symbols, &mut io::stdout()).await
        }
        (sink, _) => {
            let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
            run_interactive(&analyzer, &config, sink, &mut prompter).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use stockthing_core::{
        ErrorLog, FieldValue, StockDataFetcher, StockDataSource, StockError, StockRecord,
    };

    /// Knows every symbol except ZZZZ123
    struct StubSource;

    #[async_trait]
    impl StockDataSource for StubSource {
        async fn fetch(&self, symbol: &str) -> stockthing_core::Result<StockRecord> {
            if symbol == "ZZZZ123" {
                return Err(StockError::DataUnavailable {
                    symbol: symbol.to_string(),
                    response: "{}".to_string(),
                });
            }
            let mut record = StockRecord::empty(symbol);
            record.pe_ratio = FieldValue::Number(12.0);
            Ok(record)
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn fixture(dir: &tempfile::TempDir) -> (Analyzer, AppConfig) {
        let config = AppConfig::builder()
            .alpha_vantage_api_key("demo")
            .synopsis_enabled(false)
            .output_dir(dir.path())
            .build()
            .unwrap();
        let fetcher = StockDataFetcher::new(
            Arc::new(StubSource),
            ErrorLog::new(config.error_log_path()),
        );
        (Analyzer::new(fetcher), config)
    }

    async fn run_script(
        dir: &tempfile::TempDir,
        preselected: Option<SinkKind>,
        script: &str,
    ) -> String {
        let (analyzer, config) = fixture(dir);
        let mut prompter = Prompter::new(script.as_bytes(), Vec::new());
        run_interactive(&analyzer, &config, preselected, &mut prompter)
            .await
            .unwrap();
        String::from_utf8(prompter.output().clone()).unwrap()
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["stockthing"]).unwrap();
        assert_eq!(args.env_file, PathBuf::from("api.env"));
        assert!(args.provider.is_none());
        assert!(!args.no_synopsis);
        assert!(!args.competitors);
    }

    #[test]
    fn test_args_one_shot() {
        let args = Args::try_parse_from([
            "stockthing",
            "--provider",
            "finnhub",
            "--sink",
            "csv",
            "--symbols",
            "AAPL,MSFT",
            "--quarter-resolution",
            "calendar",
            "--no-synopsis",
            "--competitors",
        ])
        .unwrap();

        assert_eq!(args.provider, Some(DataProvider::Finnhub));
        assert_eq!(args.sink, Some(SinkKind::Csv));
        assert_eq!(
            args.quarter_resolution,
            Some(QuarterResolution::CalendarFallback)
        );
        assert!(args.no_synopsis);
        assert!(args.competitors);
    }

    #[test]
    fn test_args_reject_unknown_sink() {
        assert!(Args::try_parse_from(["stockthing", "--sink", "pdf"]).is_err());
    }

    #[test]
    fn test_symbols_require_a_sink() {
        assert!(Args::try_parse_from(["stockthing", "--symbols", "AAPL"]).is_err());
    }

    #[test]
    fn test_menu_lists_six_options() {
        let mut out = Vec::new();
        print_menu(&mut out).unwrap();
        let menu = String::from_utf8(out).unwrap();
        assert!(menu.contains("1. Console"));
        assert!(menu.contains("6. Dashboard"));
    }

    #[tokio::test]
    async fn test_empty_symbols_exit() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script(&dir, None, "1\n\n").await;

        assert!(out.contains("How do you want to display the stock analyses?"));
        assert!(out.ends_with("Exiting the program. Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_two_batches_then_quit() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script(&dir, None, "3\nAAPL,ZZZZ123\nyes\n3\ntsla\nno\n").await;

        assert_eq!(out.matches("How do you want to display").count(), 2);
        assert_eq!(out.matches("Do you want to analyze more stock symbols?").count(), 2);
        assert!(out.contains("Unable to fetch data for ZZZZ123. Skipping..."));
        assert_eq!(out.matches("has been saved to").count(), 2);
        assert!(out.ends_with("Exiting the program. Goodbye!\n"));

        assert!(dir.path().join("AAPL_analysis.txt").exists());
        assert!(dir.path().join("TSLA_analysis.txt").exists());
        assert!(!dir.path().join("ZZZZ123_analysis.txt").exists());

        let log = std::fs::read_to_string(dir.path().join("error_log.txt")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_preselected_sink_skips_menu() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script(&dir, Some(SinkKind::Csv), "AAPL\n").await;

        assert!(!out.contains("How do you want to display"));
        assert!(out.contains("Analysis for AAPL has been added to"));
        assert!(out.ends_with("Exiting the program. Goodbye!\n"));

        let csv = std::fs::read_to_string(dir.path().join("stock_analysis.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_accumulates_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script(&dir, None, "6\nAAPL,ZZZZ123\nMSFT\n\n").await;

        assert!(out.contains("Launching the interactive dashboard..."));
        assert!(out.contains("Unable to fetch data for ZZZZ123. Skipping..."));
        assert_eq!(out.matches("Enter stock symbol(s) for the dashboard").count(), 3);
        assert!(out.contains("MSFT"));
        assert!(out.ends_with("Exiting the program. Goodbye!\n"));

        // the table after the second prompt still lists the first batch
        let second = out
            .split("Enter stock symbol(s) for the dashboard")
            .nth(2)
            .unwrap();
        assert!(second.contains("AAPL"));
        assert!(second.contains("MSFT"));
        assert!(second.contains("Buy"));
    }
}
