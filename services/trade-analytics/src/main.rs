//! Trade Analytics - command-line entry point
//!
//! Lists the items of a marketplace trade log and writes per-item sale
//! history reports (observations CSV + chart JSON).
//!
//! Usage:
//!   trade-analytics items --input lumiterra_trades.csv
//!   trade-analytics analyze --input lumiterra_trades.csv --item "Iron Sword" --window 7

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trade_analytics::{AnalyticsConfig, TradeAnalyticsService, report};

#[derive(Parser)]
#[command(name = "trade-analytics")]
#[command(about = "Marketplace trade analytics: per-item sale history series")]
#[command(version)]
struct Cli {
    /// Configuration file (toml, json or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the item names present in the trade log
    Items {
        /// Trade log CSV
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Aggregate sale history for the selected items and write reports
    Analyze {
        /// Trade log CSV
        #[arg(long)]
        input: Option<PathBuf>,

        /// Item to analyze, repeat for several
        #[arg(long = "item", required = true)]
        items: Vec<String>,

        /// Rolling window over unitary price
        #[arg(long)]
        window: Option<usize>,

        /// Report directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip malformed rows instead of failing the load
        #[arg(long)]
        skip_malformed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trade_analytics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = AnalyticsConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Items { input } => {
            if let Some(input) = input {
                config.input_path = input;
            }

            let service = TradeAnalyticsService::from_config(&config)?;
            for item in service.available_items() {
                println!("{item}");
            }
        }
        Commands::Analyze {
            input,
            items,
            window,
            output,
            skip_malformed,
        } => {
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(window) = window {
                config.price_rolling_window = window;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            config.skip_malformed_rows |= skip_malformed;

            run_analyze(&config, &items).await?;
        }
    }

    Ok(())
}

async fn run_analyze(config: &AnalyticsConfig, items: &[String]) -> Result<()> {
    let service = TradeAnalyticsService::from_config(config)?;
    info!(
        "Analyzing {} item(s) with rolling window {}",
        items.len(),
        service.price_rolling_window()
    );

    let reports = service.analyze(items).await;
    let mut written = 0usize;

    for item_report in &reports {
        match &item_report.outcome {
            Ok(analysis) => {
                report::write_item_report(&config.output_dir, analysis)?;
                written += 1;
            }
            Err(e) => error!("{}: {}", item_report.item, e),
        }
    }

    if written == 0 {
        bail!("No report produced for the {} selected item(s)", reports.len());
    }

    info!(
        "Wrote {} of {} report(s) to {}",
        written,
        reports.len(),
        config.output_dir.display()
    );
    Ok(())
}
