use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::engine::classifier::DEFAULT_TOLERANCE;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub valuation: ValuationConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Valuation engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValuationConfig {
    /// Half-width of the FAIR band, as a fraction of fair value.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// Input table configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    #[serde(default = "default_target_path")]
    pub target_path: PathBuf,

    #[serde(default = "default_peers_path")]
    pub peers_path: PathBuf,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_target_path() -> PathBuf {
    PathBuf::from("data/target.csv")
}
fn default_peers_path() -> PathBuf {
    PathBuf::from("data/peers.csv")
}
fn default_delimiter() -> char {
    ','
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_path: default_target_path(),
            peers_path: default_peers_path(),
            delimiter: default_delimiter(),
        }
    }
}

impl ValuationConfig {
    /// The FAIR band must be a finite fraction in `[0, 1)`, whichever
    /// layer (file, environment or flag) supplied it.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.tolerance.is_finite() && (0.0..1.0).contains(&self.tolerance),
            "tolerance must be in [0, 1), got {}",
            self.tolerance
        );
        Ok(())
    }
}

impl LoaderConfig {
    /// Delimiter as the single byte the csv reader expects; non-ASCII falls back to `,`.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            warn!("Non-ASCII delimiter {:?}, using ','", self.delimiter);
            b','
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FAIR_VALUE").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            valuation: ValuationConfig::default(),
            loader: LoaderConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
