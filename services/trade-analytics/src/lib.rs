//! Trade Analytics Service
//!
//! Turns a marketplace trade log into per-item sale history series:
//! - Exact-timestamp aggregation of sale records
//! - Cumulative volume, cumulative trade count and amount per trade
//! - Rolling unitary price
//! - Dual-axis chart descriptions and CSV/JSON reports

pub mod aggregators;
pub mod chart;
pub mod config;
pub mod error;
pub mod loader;
pub mod report;

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{info, warn};

pub use aggregators::{AggregatedObservation, aggregate_item, rolling_mean, weighted_average};
pub use chart::ItemChart;
pub use config::AnalyticsConfig;
pub use error::{AggregationError, LoadError};
pub use loader::{LoaderOptions, TradeLog};

/// Charted series for one item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAnalysis {
    /// Item name
    pub item: String,
    /// Aggregated observations in time order
    pub observations: Vec<AggregatedObservation>,
    /// Rolling mean of `unitary_price`, aligned with `observations`
    pub rolling_unitary_price: Vec<Option<f64>>,
    /// Figure description
    pub chart: ItemChart,
}

impl ItemAnalysis {
    /// Run the pipeline and smoothing for `item`
    pub fn compute(log: &TradeLog, item: &str, window: usize) -> Result<Self, AggregationError> {
        let observations = aggregate_item(log, item)?;
        let unitary_prices: Vec<f64> = observations.iter().map(|o| o.unitary_price).collect();
        let rolling_unitary_price = rolling_mean(&unitary_prices, window)?;
        let chart = ItemChart::from_observations(item, &observations, &rolling_unitary_price);

        Ok(Self {
            item: item.to_string(),
            observations,
            rolling_unitary_price,
            chart,
        })
    }
}

/// Outcome of one selected item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    /// Selected item name
    pub item: String,
    /// Series or the reason the item could not be charted
    pub outcome: Result<ItemAnalysis, AggregationError>,
}

impl ItemReport {
    /// Check if the item produced a series
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Trade analytics service over one immutable trade log
#[derive(Debug, Clone)]
pub struct TradeAnalyticsService {
    /// Shared read-only trade log
    log: Arc<TradeLog>,
    /// Rolling window over unitary price
    price_rolling_window: usize,
}

impl TradeAnalyticsService {
    /// Create new service over an already loaded log
    #[must_use]
    pub fn new(log: TradeLog, config: &AnalyticsConfig) -> Self {
        Self {
            log: Arc::new(log),
            price_rolling_window: config.price_rolling_window,
        }
    }

    /// Create new service loading the trade log named in `config`
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        let log = TradeLog::from_path(&config.input_path, config.loader_options())
            .with_context(|| format!("Failed to load {}", config.input_path.display()))?;
        Ok(Self::new(log, config))
    }

    /// Rolling window applied to unitary price
    #[must_use]
    pub const fn price_rolling_window(&self) -> usize {
        self.price_rolling_window
    }

    /// Item names that can be selected, sorted
    #[must_use]
    pub fn available_items(&self) -> Vec<String> {
        self.log.items()
    }

    /// Analyze a single item on the calling thread
    pub fn analyze_item(&self, item: &str) -> Result<ItemAnalysis, AggregationError> {
        ItemAnalysis::compute(&self.log, item, self.price_rolling_window)
    }

    /// Analyze every selected item, one blocking task per item
    ///
    /// Reports come back in selection order with duplicates dropped. A
    /// failing item never affects the others.
    pub async fn analyze(&self, items: &[String]) -> Vec<ItemReport> {
        let mut seen = FxHashSet::default();
        let mut tasks = Vec::with_capacity(items.len());

        for item in items {
            if !seen.insert(item.as_str()) {
                continue;
            }

            let log = Arc::clone(&self.log);
            let window = self.price_rolling_window;
            let task_item = item.clone();
            let handle = tokio::task::spawn_blocking(move || {
                ItemAnalysis::compute(&log, &task_item, window)
            });
            tasks.push((item.clone(), handle));
        }

        let mut reports = Vec::with_capacity(tasks.len());
        for (item, handle) in tasks {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(AggregationError::TaskFailed {
                    item: item.clone(),
                    reason: e.to_string(),
                }),
            };

            match &outcome {
                Ok(analysis) => info!(
                    "Analyzed {}: {} observations",
                    item,
                    analysis.observations.len()
                ),
                Err(e) => warn!("Skipping {}: {}", item, e),
            }
            reports.push(ItemReport { item, outcome });
        }

        reports
    }
}
