//! Trade analytics configuration

use crate::loader::LoaderOptions;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trade analytics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Trade log CSV
    pub input_path: PathBuf,

    /// Directory receiving per-item reports
    pub output_dir: PathBuf,

    /// Rolling window over unitary price (1 = no smoothing)
    pub price_rolling_window: usize,

    /// Skip rows that fail coercion instead of rejecting the file
    pub skip_malformed_rows: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("lumiterra_trades.csv"),
            output_dir: PathBuf::from("./reports"),
            price_rolling_window: 1,
            skip_malformed_rows: false,
        }
    }
}

impl AnalyticsConfig {
    /// Environment variable prefix, e.g. `TRADE_ANALYTICS_PRICE_ROLLING_WINDOW`
    pub const ENV_PREFIX: &'static str = "TRADE_ANALYTICS";

    /// Load configuration from an optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(Self::ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.price_rolling_window == 0 {
            bail!("price_rolling_window must be at least 1");
        }
        Ok(())
    }

    /// Loader switches derived from this configuration
    #[must_use]
    pub const fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            skip_malformed_rows: self.skip_malformed_rows,
        }
    }
}
