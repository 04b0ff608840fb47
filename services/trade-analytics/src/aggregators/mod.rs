//! Aggregator implementations

pub mod pipeline;
pub mod rolling;

pub use pipeline::{AggregatedObservation, aggregate_item, weighted_average};
pub use rolling::{RollingWindow, rolling_mean};
