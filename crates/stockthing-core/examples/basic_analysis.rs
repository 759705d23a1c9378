//! Analyze one symbol and print the rating
//!
//! To run this example:
//! ```bash
//! export ALPHA_VANTAGE_API_KEY=your_key_here
//! export OPENAI_API_KEY=your_key_here  # Optional, enables the synopsis
//!
//! cargo run -p stockthing-core --example basic_analysis TSLA
//! ```

use stockthing_core::{AppConfig, Analyzer};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockthing_utils::init_tracing("info");

    let symbol = env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());

    let config = AppConfig::from_env()?;
    println!("Configuration:");
    println!("  - Provider: {}", config.provider);
    println!("  - Quarter policy: {}", config.effective_quarter_resolution());
    println!("  - Error log: {}\n", config.error_log_path().display());

    let analyzer = Analyzer::from_config(&config)?;

    match analyzer.analyze(&symbol).await {
        Some(analysis) => {
            for (key, value) in analysis.record.fields() {
                println!("{key:>15}: {value}");
            }
            println!("\nRating: {}", analysis.verdict);
            if let Some(synopsis) = analysis.synopsis {
                println!("\n{synopsis}");
            }
        }
        None => println!("Unable to fetch data for {symbol}. See the error log for details."),
    }

    Ok(())
}
