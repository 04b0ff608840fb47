//! Per-item report files

use crate::ItemAnalysis;
use crate::aggregators::AggregatedObservation;
use crate::chart::ItemChart;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column order of the observations CSV
pub const OBSERVATION_COLUMNS: [&str; 11] = [
    "time",
    "item",
    "seller",
    "buyer",
    "price",
    "quantity",
    "unitary_price",
    "total_trades",
    "cumulative_count",
    "cumulative_trades",
    "Amount/Trade",
];

/// Files written for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    /// Observations CSV
    pub csv_path: PathBuf,
    /// Chart JSON
    pub chart_path: PathBuf,
}

/// Filesystem-safe file stem for an item name
///
/// Lowercase ASCII alphanumerics are kept, every other run of characters
/// becomes a single `_`.
#[must_use]
pub fn item_slug(item: &str) -> String {
    let mut slug = String::with_capacity(item.len());
    for c in item.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }

    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

/// Write observations as CSV, header included even when empty
pub fn write_observations_csv(path: &Path, observations: &[AggregatedObservation]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(OBSERVATION_COLUMNS)?;
    for observation in observations {
        writer.serialize(observation)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the chart description as pretty JSON
pub fn write_chart_json(path: &Path, chart: &ItemChart) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, chart)?;
    writer.flush()?;
    Ok(())
}

/// Write both report files for one item under `dir`
pub fn write_item_report(dir: &Path, analysis: &ItemAnalysis) -> Result<WrittenReport> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let slug = item_slug(&analysis.item);
    let report = WrittenReport {
        csv_path: dir.join(format!("{slug}.csv")),
        chart_path: dir.join(format!("{slug}.chart.json")),
    };

    write_observations_csv(&report.csv_path, &analysis.observations)?;
    write_chart_json(&report.chart_path, &analysis.chart)?;

    info!(
        "Wrote {} observations for {} to {}",
        analysis.observations.len(),
        analysis.item,
        report.csv_path.display()
    );
    Ok(report)
}
