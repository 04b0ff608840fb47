//! Trade log loader
//!
//! Reads the marketplace trade log CSV and coerces every row into a
//! [`TradeRecord`]. The first column is the timestamp index whatever its
//! header says; the remaining columns are matched by name and unknown
//! columns are ignored.

use crate::error::LoadError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use common::{ActivityType, TradeRecord};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns that must be present besides the timestamp index
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "item",
    "activityType",
    "seller",
    "buyer",
    "price",
    "quantity",
    "unitary_price",
];

const TIME_COLUMN: &str = "time";
/// Stand-in name for a `time` column shadowed by the index
const SHADOWED_TIME_COLUMN: &str = "time (shadowed)";
const MAX_LOGGED_ROW_ERRORS: usize = 10;

/// Naive layouts are interpreted as UTC
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loader behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderOptions {
    /// Skip rows that fail coercion instead of rejecting the whole file
    pub skip_malformed_rows: bool,
}

/// Row as it appears in the file, before type coercion
#[derive(Debug, Deserialize)]
struct RawTradeRow {
    time: String,
    item: String,
    #[serde(rename = "activityType")]
    activity_type: String,
    seller: String,
    buyer: String,
    price: String,
    quantity: String,
    unitary_price: String,
}

impl RawTradeRow {
    fn into_record(self, row: u64) -> Result<TradeRecord, LoadError> {
        let invalid = |reason: String| LoadError::InvalidRow { row, reason };

        let time = parse_timestamp(&self.time)
            .ok_or_else(|| invalid(format!("unrecognised timestamp {:?}", self.time)))?;
        let price = parse_amount("price", &self.price).map_err(invalid)?;
        let quantity = parse_quantity(&self.quantity).map_err(invalid)?;
        let unitary_price = parse_amount("unitary_price", &self.unitary_price).map_err(invalid)?;

        if quantity == 0 {
            debug!("Row {} of {} carries zero quantity", row, self.item);
        }

        Ok(TradeRecord {
            time,
            item: self.item,
            activity_type: ActivityType::from(self.activity_type),
            seller: self.seller,
            buyer: self.buyer,
            price,
            quantity,
            unitary_price,
        })
    }
}

/// Time-ordered marketplace trade log
#[derive(Debug, Clone, Default)]
pub struct TradeLog {
    records: Vec<TradeRecord>,
}

impl TradeLog {
    /// Build a log from already-typed records, ordering them by time
    ///
    /// The sort is stable, records sharing a timestamp keep their input order.
    #[must_use]
    pub fn new(mut records: Vec<TradeRecord>) -> Self {
        records.sort_by_key(|record| record.time);
        Self { records }
    }

    /// Load a trade log CSV from disk
    pub fn from_path(path: impl AsRef<Path>, options: LoaderOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let log = Self::from_reader(file, options)?;
        info!(
            "Loaded {} trade records ({} items) from {}",
            log.len(),
            log.items().len(),
            path.display()
        );
        Ok(log)
    }

    /// Load a trade log CSV from any reader
    pub fn from_reader<R: io::Read>(reader: R, options: LoaderOptions) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = normalize_headers(reader.headers()?)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (index, row) in reader.records().enumerate() {
            let row_number = index as u64 + 1;
            let parsed = row.map_err(LoadError::from).and_then(|row| {
                row.deserialize::<RawTradeRow>(Some(&headers))
                    .map_err(|e| LoadError::InvalidRow {
                        row: row_number,
                        reason: e.to_string(),
                    })
                    .and_then(|raw| raw.into_record(row_number))
            });

            match parsed {
                Ok(record) => records.push(record),
                Err(e) if options.skip_malformed_rows => {
                    skipped += 1;
                    if skipped <= MAX_LOGGED_ROW_ERRORS {
                        warn!("Skipping malformed trade row: {}", e);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        if skipped > 0 {
            warn!("Skipped {} malformed trade rows", skipped);
        }

        Ok(Self::new(records))
    }

    /// All records in time order
    #[must_use]
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the log holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct item names, sorted
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.item.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Check if any record, sale or not, names `item`
    #[must_use]
    pub fn contains_item(&self, item: &str) -> bool {
        self.records.iter().any(|record| record.item == item)
    }

    /// Sale records for `item`, in time order
    pub fn sales_of<'a>(&'a self, item: &'a str) -> impl Iterator<Item = &'a TradeRecord> {
        self.records.iter().filter(move |record| record.is_sale_of(item))
    }
}

/// Rename the index column to `time` and check the required columns exist
///
/// A later column already named `time` is renamed out of the way so the
/// index wins.
fn normalize_headers(headers: &csv::StringRecord) -> Result<csv::StringRecord, LoadError> {
    if headers.is_empty() {
        return Err(LoadError::MissingColumn {
            column: TIME_COLUMN,
        });
    }

    let mut normalized = csv::StringRecord::new();
    normalized.push_field(TIME_COLUMN);
    for field in headers.iter().skip(1) {
        if field == TIME_COLUMN {
            debug!("Ignoring `time` column in favour of the index column");
            normalized.push_field(SHADOWED_TIME_COLUMN);
        } else {
            normalized.push_field(field);
        }
    }

    for column in REQUIRED_COLUMNS {
        if !normalized.iter().skip(1).any(|field| field == column) {
            return Err(LoadError::MissingColumn { column });
        }
    }

    Ok(normalized)
}

/// Parse a trade timestamp
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff][+HH:MM]`, the `T`-separated
/// naive form and bare dates.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(value, OFFSET_DATETIME_FORMAT) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Coerce a quantity cell to whole units
///
/// Integral decimal text such as `"3.0"` is accepted, `"3.7"` is an error.
pub fn parse_quantity(value: &str) -> Result<u64, String> {
    if let Ok(quantity) = value.parse::<u64>() {
        return Ok(quantity);
    }

    let quantity: f64 = value
        .parse()
        .map_err(|_| format!("quantity is not numeric: {value:?}"))?;
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(format!("quantity must be a non-negative number: {value}"));
    }
    if quantity.fract() != 0.0 {
        return Err(format!("quantity must be a whole number: {value}"));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(quantity as u64)
}

fn parse_amount(column: &str, value: &str) -> Result<f64, String> {
    let amount: f64 = value
        .parse()
        .map_err(|_| format!("{column} is not numeric: {value:?}"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("{column} must be a non-negative number: {value}"));
    }
    Ok(amount)
}
