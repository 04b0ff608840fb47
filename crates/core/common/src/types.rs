//! Core types for marketplace trade analytics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Marketplace activity tag attached to every trade log row
///
/// Only [`ActivityType::Sale`] represents a completed transaction. Listing,
/// delisting and any other marketplace events keep their original tag text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// Completed sale
    Sale,
    /// Any non-sale activity, tag preserved verbatim
    Other(String),
}

impl ActivityType {
    /// Tag used by the marketplace for completed sales
    pub const SALE_TAG: &'static str = "Sale";

    /// Check if this activity is a completed sale
    #[must_use]
    pub const fn is_sale(&self) -> bool {
        matches!(self, Self::Sale)
    }

    /// Original tag text
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sale => Self::SALE_TAG,
            Self::Other(tag) => tag,
        }
    }
}

impl FromStr for ActivityType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exact match, "sale" or " Sale" are not sales
        if s == Self::SALE_TAG {
            Ok(Self::Sale)
        } else {
            Ok(Self::Other(s.to_string()))
        }
    }
}

impl From<String> for ActivityType {
    fn from(tag: String) -> Self {
        if tag == Self::SALE_TAG {
            Self::Sale
        } else {
            Self::Other(tag)
        }
    }
}

impl From<ActivityType> for String {
    fn from(activity: ActivityType) -> Self {
        match activity {
            ActivityType::Sale => ActivityType::SALE_TAG.to_string(),
            ActivityType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One marketplace transaction as recorded in the trade log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Instant the trade occurred
    pub time: DateTime<Utc>,
    /// Name of the traded asset
    pub item: String,
    /// Marketplace activity tag
    #[serde(rename = "activityType")]
    pub activity_type: ActivityType,
    /// Selling counterparty
    pub seller: String,
    /// Buying counterparty
    pub buyer: String,
    /// Total price paid for the trade
    pub price: f64,
    /// Units transacted
    pub quantity: u64,
    /// Price per unit
    pub unitary_price: f64,
}

impl TradeRecord {
    /// Check if this record is a sale of `item`
    #[must_use]
    pub fn is_sale_of(&self, item: &str) -> bool {
        self.activity_type.is_sale() && self.item == item
    }

    /// Unit price weighted by quantity, the numerator of a weighted average
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn weighted_unitary_price(&self) -> f64 {
        self.unitary_price * self.quantity as f64
    }
}
