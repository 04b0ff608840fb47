//! Trade analytics error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while aggregating one item's trade history
///
/// Every variant is local to a single item run, the service keeps
/// processing the remaining selections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// Item is not present in the trade log
    #[error("Unknown item: {item}")]
    UnknownItem { item: String },

    /// A timestamp group sums to zero units, weighted average is undefined
    #[error("Zero total quantity for {item} at {time}")]
    ZeroQuantity { item: String, time: DateTime<Utc> },

    /// Rolling window must hold at least one value
    #[error("Invalid rolling window: {window}")]
    InvalidWindow { window: usize },

    /// Worker task running the item died before reporting
    #[error("Aggregation task for {item} failed: {reason}")]
    TaskFailed { item: String, reason: String },
}

/// Errors raised while loading a trade log
#[derive(Debug, Error)]
pub enum LoadError {
    /// Trade log file could not be opened
    #[error("Failed to open trade log {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV framing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Header row lacks a required column
    #[error("Missing column: {column}")]
    MissingColumn { column: &'static str },

    /// A data row could not be coerced into a trade record
    #[error("Invalid row {row}: {reason}")]
    InvalidRow { row: u64, reason: String },
}
