mod config;
mod engine;
mod loader;
mod models;
mod report;
mod utils;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{AppConfig, OutputFormat};
use crate::loader::template::write_templates;
use crate::loader::{CsvSource, RecordSource};

#[derive(Parser)]
#[command(name = "fair-value", about = "Relative (multiplier) fair value against sector peers", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Value the target company against same-sector peers
    Analyze {
        /// Target table (first data row is used)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Peers table
        #[arg(short, long)]
        peers: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Half-width of the FAIR band, e.g. 0.05 for ±5%
        #[arg(long)]
        tolerance: Option<f64>,
    },

    /// Write target.csv and peers.csv templates
    Template {
        #[arg(short, long, default_value = "data")]
        dir: PathBuf,

        /// Headers only, no sample companies
        #[arg(long)]
        empty: bool,
    },

    /// Print derived ratios for every company in a table
    Ratios {
        /// Table to screen (default: configured peers table)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List sectors present in a table
    Sectors {
        /// Table to inspect (default: configured peers table)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(log_filter(cli.verbose)))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Analyze {
            target,
            peers,
            format,
            tolerance,
        } => {
            let _t = utils::Timer::start("Valuation");
            if let Some(tol) = tolerance {
                config.valuation.tolerance = tol;
            }
            config.valuation.validate()?;
            let format = format.unwrap_or(config.output.format);

            let source = CsvSource::new(&config.loader).with_paths(target, peers);
            let target = source.load_target().context("Cannot load target company")?;

            // A broken peers table only costs us the comparison.
            let peers = match source.load_peers() {
                Ok(p) => p,
                Err(e) => {
                    warn!("{:#}; sector comparison skipped", e);
                    vec![]
                }
            };

            let report = engine::analyze(
                &target,
                &peers,
                &config.valuation,
                Utc::now().naive_utc(),
            );
            println!("{}", report::render(&report, format)?);
        }

        Command::Template { dir, empty } => {
            let (target, peers) = write_templates(&dir, !empty)?;
            println!("Templates written:");
            println!("  {}", target.display());
            println!("  {}", peers.display());
        }

        Command::Ratios { file } => {
            let path = file.unwrap_or_else(|| config.loader.peers_path.clone());
            let records = read_table(&path, config.loader.delimiter_byte())?;
            print!("{}", report::render_ratio_table(&records));
        }

        Command::Sectors { file } => {
            let path = file.unwrap_or_else(|| config.loader.peers_path.clone());
            let records = read_table(&path, config.loader.delimiter_byte())?;
            if records.is_empty() {
                println!("No companies — run `fair-value template` first.");
            } else {
                print!("{}", report::render_sectors(&records));
            }
        }
    }

    Ok(())
}

/// Targets are module paths, so the filter names the compiled crate
/// (`fair_value`), not the package.
fn log_filter(verbose: u8) -> String {
    let krate = env!("CARGO_CRATE_NAME");
    match verbose {
        0 => format!("{krate}=info,warn"),
        1 => format!("{krate}=debug,info"),
        _ => "trace".to_string(),
    }
}

fn read_table(path: &Path, delimiter: u8) -> Result<Vec<models::FinancialRecord>> {
    let records =
        loader::load_table(path, delimiter).with_context(|| format!("Cannot read {:?}", path))?;
    info!("{} companies in {:?}", records.len(), path);
    Ok(records)
}
