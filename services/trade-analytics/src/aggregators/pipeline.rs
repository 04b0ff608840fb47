//! Per-item aggregation pipeline
//!
//! Collapses one item's sale records into one observation per distinct
//! timestamp and derives the cumulative series that get charted.

use crate::error::AggregationError;
use crate::loader::TradeLog;
use chrono::{DateTime, Utc};
use common::TradeRecord;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator used when joining counterparties of one group
pub const COUNTERPARTY_SEPARATOR: &str = ", ";

/// All sale trades of one item sharing an exact timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedObservation {
    /// Shared timestamp
    pub time: DateTime<Utc>,
    /// Item name
    pub item: String,
    /// Contributing sellers in input order
    pub seller: String,
    /// Contributing buyers in input order
    pub buyer: String,
    /// Total price paid
    pub price: f64,
    /// Total units
    pub quantity: u64,
    /// Quantity-weighted unit price
    pub unitary_price: f64,
    /// Raw records in the group
    pub total_trades: u64,
    /// Running total of `quantity`
    pub cumulative_count: u64,
    /// Running total of `total_trades`
    pub cumulative_trades: u64,
    /// `cumulative_count / cumulative_trades`, `None` when no trades yet
    #[serde(rename = "Amount/Trade")]
    pub amount_per_trade: Option<f64>,
}

/// Sale records of one item sharing a timestamp
#[derive(Debug)]
struct TimeGroup<'a> {
    time: DateTime<Utc>,
    rows: Vec<&'a TradeRecord>,
}

impl TimeGroup<'_> {
    /// Collapse the group into an observation, cumulative fields left at zero
    fn collapse(&self, item: &str) -> Result<AggregatedObservation, AggregationError> {
        let unitary_price = weighted_average(self.rows.iter().copied()).ok_or_else(|| {
            AggregationError::ZeroQuantity {
                item: item.to_string(),
                time: self.time,
            }
        })?;

        let item = self
            .rows
            .first()
            .map_or_else(|| item.to_string(), |row| row.item.clone());

        Ok(AggregatedObservation {
            time: self.time,
            item,
            seller: self.join(|row| row.seller.as_str()),
            buyer: self.join(|row| row.buyer.as_str()),
            price: self.rows.iter().map(|row| row.price).sum(),
            quantity: self.rows.iter().map(|row| row.quantity).sum(),
            unitary_price,
            total_trades: self.rows.len() as u64,
            cumulative_count: 0,
            cumulative_trades: 0,
            amount_per_trade: None,
        })
    }

    fn join(&self, field: impl Fn(&TradeRecord) -> &str) -> String {
        self.rows
            .iter()
            .map(|&row| field(row))
            .collect::<Vec<_>>()
            .join(COUNTERPARTY_SEPARATOR)
    }
}

/// Quantity-weighted average unit price of `rows`
///
/// Returns `None` when the rows hold zero units in total.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weighted_average<'a>(rows: impl IntoIterator<Item = &'a TradeRecord>) -> Option<f64> {
    let (weighted, quantity) = rows.into_iter().fold((0.0, 0u64), |(weighted, quantity), row| {
        (weighted + row.weighted_unitary_price(), quantity + row.quantity)
    });

    if quantity == 0 {
        None
    } else {
        Some(weighted / quantity as f64)
    }
}

/// Aggregate the sale history of `item`
///
/// Sales are grouped by exact timestamp equality, so trades a millisecond
/// apart stay separate observations. An item that exists but has no sales
/// yields an empty series.
pub fn aggregate_item(
    log: &TradeLog,
    item: &str,
) -> Result<Vec<AggregatedObservation>, AggregationError> {
    if !log.contains_item(item) {
        return Err(AggregationError::UnknownItem {
            item: item.to_string(),
        });
    }

    let groups = group_by_time(log.sales_of(item));
    if groups.is_empty() {
        debug!("No sales recorded for {}", item);
        return Ok(Vec::new());
    }

    let mut observations = groups
        .iter()
        .map(|group| group.collapse(item))
        .collect::<Result<Vec<_>, _>>()?;

    observations.sort_by_key(|observation| observation.time);
    accumulate(&mut observations);

    debug!(
        "Aggregated {} sales of {} into {} observations",
        observations
            .last()
            .map_or(0, |observation| observation.cumulative_trades),
        item,
        observations.len()
    );
    Ok(observations)
}

/// Partition records by timestamp, groups in order of first appearance
fn group_by_time<'a>(records: impl Iterator<Item = &'a TradeRecord>) -> Vec<TimeGroup<'a>> {
    let mut index: FxHashMap<DateTime<Utc>, usize> = FxHashMap::default();
    let mut groups: Vec<TimeGroup<'a>> = Vec::new();

    for record in records {
        let slot = *index.entry(record.time).or_insert_with(|| {
            groups.push(TimeGroup {
                time: record.time,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(record);
    }

    groups
}

/// Fill the running totals, observations must already be in time order
#[allow(clippy::cast_precision_loss)]
fn accumulate(observations: &mut [AggregatedObservation]) {
    let mut cumulative_count = 0u64;
    let mut cumulative_trades = 0u64;

    for observation in observations {
        cumulative_count += observation.quantity;
        cumulative_trades += observation.total_trades;

        observation.cumulative_count = cumulative_count;
        observation.cumulative_trades = cumulative_trades;
        observation.amount_per_trade = if cumulative_trades == 0 {
            None
        } else {
            Some(cumulative_count as f64 / cumulative_trades as f64)
        };
    }
}
