//! Common types shared by the trade analytics workspace

pub mod types;

pub use types::{ActivityType, TradeRecord};
