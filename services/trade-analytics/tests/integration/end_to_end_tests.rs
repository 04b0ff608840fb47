//! End-to-end tests: CSV on disk to per-item report files

use crate::support::{SWORD_CSV, assert_close};
use anyhow::Result;
use rstest::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use trade_analytics::chart::{
    AMOUNT_PER_TRADE_TRACE, AxisScale, CUMULATIVE_COUNT_TRACE, ItemChart,
};
use trade_analytics::report::{OBSERVATION_COLUMNS, write_item_report};
use trade_analytics::{
    AggregatedObservation, AggregationError, AnalyticsConfig, TradeAnalyticsService,
};

/// Test fixture for a config pointing at the Sword log in a scratch directory
#[fixture]
fn workspace() -> Result<(AnalyticsConfig, TempDir)> {
    let temp_dir = TempDir::new()?;
    let input_path = temp_dir.path().join("trades.csv");
    fs::write(&input_path, SWORD_CSV)?;

    let config = AnalyticsConfig {
        input_path,
        output_dir: temp_dir.path().join("reports"),
        ..AnalyticsConfig::default()
    };
    Ok((config, temp_dir))
}

#[rstest]
#[tokio::test]
async fn test_mixed_selection_isolates_failures(
    workspace: Result<(AnalyticsConfig, TempDir)>,
) -> Result<()> {
    let (config, _temp_dir) = workspace?;
    let service = TradeAnalyticsService::from_config(&config)?;

    let selection = ["Bow", "Sword", "Shield"].map(String::from);
    let reports = service.analyze(&selection).await;

    assert_eq!(reports.len(), 3);
    assert_eq!(
        reports[0].outcome,
        Err(AggregationError::UnknownItem {
            item: "Bow".to_string()
        })
    );

    let sword = reports[1].outcome.as_ref().map_err(Clone::clone)?;
    assert_eq!(sword.observations.len(), 2);

    let shield = reports[2].outcome.as_ref().map_err(Clone::clone)?;
    assert!(shield.observations.is_empty());
    assert!(shield.chart.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_reports_written_and_readable(
    workspace: Result<(AnalyticsConfig, TempDir)>,
) -> Result<()> {
    let (config, _temp_dir) = workspace?;
    let service = TradeAnalyticsService::from_config(&config)?;

    let reports = service.analyze(&["Sword".to_string()]).await;
    let analysis = reports[0].outcome.as_ref().map_err(Clone::clone)?;
    let written = write_item_report(&config.output_dir, analysis)?;

    assert_eq!(written.csv_path, config.output_dir.join("sword.csv"));
    assert_eq!(written.chart_path, config.output_dir.join("sword.chart.json"));

    let mut reader = csv::Reader::from_path(&written.csv_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    assert_eq!(headers, OBSERVATION_COLUMNS.map(String::from).to_vec());

    let rows = reader
        .deserialize::<AggregatedObservation>()
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].seller, "alice, carol");
    assert_eq!(rows[1].cumulative_count, 8);
    assert_close(rows[1].amount_per_trade.unwrap_or_default(), 8.0 / 3.0);

    let chart: ItemChart = serde_json::from_str(&fs::read_to_string(&written.chart_path)?)?;
    assert_eq!(chart.title, "Sword's Data Over Time");
    assert_eq!(chart.primary_axis.scale, AxisScale::Log);
    assert_eq!(
        chart.trace(CUMULATIVE_COUNT_TRACE).map(|t| t.y.clone()),
        Some(vec![Some(3.0), Some(8.0)])
    );
    assert_eq!(chart.trace(AMOUNT_PER_TRADE_TRACE).map(|t| t.y.len()), Some(2));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_empty_item_still_gets_header(
    workspace: Result<(AnalyticsConfig, TempDir)>,
) -> Result<()> {
    let (config, _temp_dir) = workspace?;
    let service = TradeAnalyticsService::from_config(&config)?;

    let analysis = service.analyze_item("Shield")?;
    let written = write_item_report(&config.output_dir, &analysis)?;

    let contents = fs::read_to_string(&written.csv_path)?;
    assert_eq!(contents.trim_end(), OBSERVATION_COLUMNS.join(","));
    Ok(())
}

#[test]
fn test_missing_input_fails_load() {
    let config = AnalyticsConfig {
        input_path: PathBuf::from("/nonexistent/trades.csv"),
        ..AnalyticsConfig::default()
    };
    assert!(TradeAnalyticsService::from_config(&config).is_err());
}
