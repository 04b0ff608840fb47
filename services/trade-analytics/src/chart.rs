//! Dual-axis chart description for one item
//!
//! Cumulative count, cumulative trades and amount per trade share a
//! logarithmic primary axis; the rolling unitary price sits on a linear
//! secondary axis. Undefined points serialize as `null` and render as gaps.

use crate::aggregators::AggregatedObservation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative count trace name
pub const CUMULATIVE_COUNT_TRACE: &str = "Cumulative Count (CC)";
/// Cumulative trades trace name
pub const TOTAL_TRADES_TRACE: &str = "Total Trades (TT)";
/// Amount per trade trace name
pub const AMOUNT_PER_TRADE_TRACE: &str = "Amounts per Trade (AT)";
/// Rolling unitary price trace name
pub const UNITARY_PRICE_TRACE: &str = "Unitary Price";

/// Axis scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    /// Linear scale
    Linear,
    /// Base-10 logarithmic scale
    Log,
}

/// Y axis a trace is plotted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    /// Left axis
    Primary,
    /// Right axis
    Secondary,
}

/// How points of a trace are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    /// Connected line
    #[serde(rename = "lines")]
    Lines,
    /// Connected line with point markers
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

/// Line stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    /// Solid stroke
    Solid,
    /// Dashed stroke
    Dash,
}

/// Axis layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis title
    pub title: String,
    /// Axis scale
    pub scale: AxisScale,
}

/// One plotted series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Legend name
    pub name: String,
    /// Observation times
    pub x: Vec<DateTime<Utc>>,
    /// Values, `None` where undefined
    pub y: Vec<Option<f64>>,
    /// Drawing mode
    pub mode: TraceMode,
    /// CSS color name
    pub color: String,
    /// Line stroke
    pub dash: LineDash,
    /// Axis the values are plotted against
    pub axis: YAxis,
}

/// Complete figure for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemChart {
    /// Item the figure describes
    pub item: String,
    /// Figure title
    pub title: String,
    /// X axis title
    pub x_axis_title: String,
    /// Left axis
    pub primary_axis: Axis,
    /// Right axis
    pub secondary_axis: Axis,
    /// Series in drawing order
    pub traces: Vec<Trace>,
}

impl ItemChart {
    /// Build the figure from an item's observations and smoothed unit prices
    ///
    /// `rolling_unitary_price` is aligned index-for-index with `observations`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_observations(
        item: &str,
        observations: &[AggregatedObservation],
        rolling_unitary_price: &[Option<f64>],
    ) -> Self {
        let times: Vec<DateTime<Utc>> = observations.iter().map(|o| o.time).collect();
        let trace = |name: &str,
                     y: Vec<Option<f64>>,
                     mode: TraceMode,
                     color: &str,
                     dash: LineDash,
                     axis: YAxis| Trace {
            name: name.to_string(),
            x: times.clone(),
            y,
            mode,
            color: color.to_string(),
            dash,
            axis,
        };

        let traces = vec![
            trace(
                CUMULATIVE_COUNT_TRACE,
                observations
                    .iter()
                    .map(|o| Some(o.cumulative_count as f64))
                    .collect(),
                TraceMode::Lines,
                "blue",
                LineDash::Dash,
                YAxis::Primary,
            ),
            trace(
                TOTAL_TRADES_TRACE,
                observations
                    .iter()
                    .map(|o| Some(o.cumulative_trades as f64))
                    .collect(),
                TraceMode::Lines,
                "green",
                LineDash::Solid,
                YAxis::Primary,
            ),
            trace(
                AMOUNT_PER_TRADE_TRACE,
                observations.iter().map(|o| o.amount_per_trade).collect(),
                TraceMode::Lines,
                "purple",
                LineDash::Solid,
                YAxis::Primary,
            ),
            trace(
                UNITARY_PRICE_TRACE,
                rolling_unitary_price.to_vec(),
                TraceMode::LinesMarkers,
                "red",
                LineDash::Solid,
                YAxis::Secondary,
            ),
        ];

        Self {
            item: item.to_string(),
            title: format!("{item}'s Data Over Time"),
            x_axis_title: "Time".to_string(),
            primary_axis: Axis {
                title: "CC/TT/AT".to_string(),
                scale: AxisScale::Log,
            },
            secondary_axis: Axis {
                title: "Unitary Price".to_string(),
                scale: AxisScale::Linear,
            },
            traces,
        }
    }

    /// Look up a trace by legend name
    #[must_use]
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|trace| trace.name == name)
    }

    /// Check if the figure has no points to draw
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|trace| trace.x.is_empty())
    }
}
