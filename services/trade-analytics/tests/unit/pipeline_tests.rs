//! Tests for the per-item aggregation pipeline

use crate::support::{SWORD_CSV, assert_close, at, sale, trade};
use common::ActivityType;
use pretty_assertions::assert_eq;
use rstest::*;
use trade_analytics::{
    AggregationError, LoaderOptions, TradeLog, aggregate_item, weighted_average,
};

/// Test fixture for the three-sale Sword log
#[fixture]
fn sword_log() -> TradeLog {
    TradeLog::from_reader(SWORD_CSV.as_bytes(), LoaderOptions::default()).unwrap()
}

/// Test fixture with many timestamps fed out of order
#[fixture]
fn busy_log() -> TradeLog {
    let mut records = Vec::new();
    for i in (0..40).rev() {
        let minute = i / 3;
        let seller = format!("s{i}");
        records.push(sale(at(minute), "Potion", &seller, (i % 4 + 1) as u64, 1.0 + i as f64));
    }
    records.push(trade(
        at(5),
        "Potion",
        ActivityType::Other("Delist".to_string()),
        "x",
        9,
        99.0,
    ));
    TradeLog::new(records)
}

#[rstest]
fn test_sword_scenario(sword_log: TradeLog) {
    let observations = aggregate_item(&sword_log, "Sword").unwrap();
    assert_eq!(observations.len(), 2);

    let first = &observations[0];
    assert_eq!(first.time, at(0));
    assert_eq!(first.item, "Sword");
    assert_eq!(first.quantity, 3);
    assert_eq!(first.total_trades, 2);
    assert_close(first.price, 35.0);
    assert_close(first.unitary_price, 35.0 / 3.0);
    assert_eq!(first.cumulative_count, 3);
    assert_eq!(first.cumulative_trades, 2);
    assert_eq!(first.amount_per_trade, Some(1.5));

    let second = &observations[1];
    assert_eq!(second.time, at(60));
    assert_eq!(second.quantity, 5);
    assert_eq!(second.total_trades, 1);
    assert_close(second.unitary_price, 20.0);
    assert_eq!(second.cumulative_count, 8);
    assert_eq!(second.cumulative_trades, 3);
    assert_eq!(second.amount_per_trade, Some(8.0 / 3.0));
}

#[rstest]
fn test_counterparties_joined_in_input_order(sword_log: TradeLog) {
    let observations = aggregate_item(&sword_log, "Sword").unwrap();
    assert_eq!(observations[0].seller, "alice, carol");
    assert_eq!(observations[0].buyer, "bob, dave");
    assert_eq!(observations[1].seller, "erin");
}

#[rstest]
#[case(&[(2, 10.0), (3, 20.0)], 16.0)]
#[case(&[(1, 7.5)], 7.5)]
#[case(&[(1, 0.0), (3, 4.0)], 3.0)]
fn test_weighted_average_property(#[case] rows: &[(u64, f64)], #[case] expected: f64) {
    let records: Vec<_> = rows
        .iter()
        .map(|&(quantity, unit)| sale(at(0), "Sword", "s", quantity, unit))
        .collect();
    assert_close(weighted_average(records.iter()).unwrap(), expected);
}

#[rstest]
fn test_one_observation_per_distinct_timestamp(busy_log: TradeLog) {
    let observations = aggregate_item(&busy_log, "Potion").unwrap();
    assert_eq!(observations.len(), 14);
    assert!(observations.windows(2).all(|w| w[0].time < w[1].time));
    assert_eq!(
        observations.iter().map(|o| o.total_trades).sum::<u64>(),
        40
    );
}

#[rstest]
fn test_cumulative_series_are_prefix_sums(busy_log: TradeLog) {
    let observations = aggregate_item(&busy_log, "Potion").unwrap();

    let mut count = 0;
    let mut trades = 0;
    for (i, observation) in observations.iter().enumerate() {
        count += observation.quantity;
        trades += observation.total_trades;
        assert_eq!(observation.cumulative_count, count, "count at {i}");
        assert_eq!(observation.cumulative_trades, trades, "trades at {i}");
        assert_eq!(
            observation.amount_per_trade,
            Some(count as f64 / trades as f64),
            "ratio at {i}"
        );
    }
    assert!(observations.windows(2).all(|w| {
        w[0].cumulative_count <= w[1].cumulative_count
            && w[0].cumulative_trades <= w[1].cumulative_trades
    }));
}

#[rstest]
fn test_pipeline_is_idempotent(busy_log: TradeLog) {
    let first = aggregate_item(&busy_log, "Potion").unwrap();
    let second = aggregate_item(&busy_log, "Potion").unwrap();
    assert_eq!(first, second);
    assert!(first.iter().zip(&second).all(|(a, b)| {
        a.unitary_price.to_bits() == b.unitary_price.to_bits()
            && a.price.to_bits() == b.price.to_bits()
    }));
}

#[rstest]
fn test_item_without_sales_is_empty(sword_log: TradeLog) {
    assert_eq!(aggregate_item(&sword_log, "Shield"), Ok(Vec::new()));
}

#[rstest]
fn test_unknown_item_rejected(sword_log: TradeLog) {
    assert_eq!(
        aggregate_item(&sword_log, "Bow"),
        Err(AggregationError::UnknownItem {
            item: "Bow".to_string()
        })
    );
}

#[test]
fn test_millisecond_apart_trades_stay_separate() {
    let t0 = at(0);
    let t1 = t0 + chrono::Duration::milliseconds(1);
    let log = TradeLog::new(vec![
        sale(t1, "Sword", "b", 1, 12.0),
        sale(t0, "Sword", "a", 1, 10.0),
    ]);

    let observations = aggregate_item(&log, "Sword").unwrap();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0].seller, "a");
    assert_eq!(observations[1].seller, "b");
}

#[test]
fn test_zero_quantity_group_surfaces_error() {
    let log = TradeLog::new(vec![
        sale(at(0), "Sword", "a", 2, 10.0),
        sale(at(1), "Sword", "b", 0, 10.0),
    ]);

    assert_eq!(
        aggregate_item(&log, "Sword"),
        Err(AggregationError::ZeroQuantity {
            item: "Sword".to_string(),
            time: at(1),
        })
    );
}
