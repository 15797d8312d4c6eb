//! End-to-end optimization cycles over the mock rig.
//!
//! Prices, sensors, and the controller are all in-memory, so every
//! scenario is deterministic: bootstrap selection, hysteresis holds,
//! price-feed outages, actuator failures, threshold alerts, and
//! history retention.

use crate::mock_rig::{
    build_engine, healthy_snapshot, MockMinerController, MockNotifier, MockPriceFeed,
    MockSensorFeed,
};
use hydromine::feeds::SensorFeed;
use hydromine::types::TurbineAction;

/// Reference prices under which BTC dominates by a wide margin.
fn reference_prices() -> MockPriceFeed {
    MockPriceFeed::new(&[("BTC", 60_000.0), ("LTC", 0.10), ("DOGE", 0.08)])
}

#[tokio::test]
async fn bootstrap_selects_most_profitable_asset() {
    let controller = MockMinerController::new();
    let notifier = MockNotifier::new();
    let mut engine = build_engine(
        reference_prices(),
        controller.clone(),
        notifier.clone(),
        100,
    );

    let report = engine.run_cycle(&healthy_snapshot()).await.unwrap();

    assert!(report.switched);
    assert_eq!(report.active_asset.as_deref(), Some("BTC"));
    assert_eq!(controller.starts(), vec!["BTC".to_string()]);
    assert!(controller.stops().is_empty());
    assert_eq!(notifier.count_containing("Mining started on BTC"), 1);
    assert!(report.daily_profit > 0.0);
}

#[tokio::test]
async fn steady_prices_hold_the_active_asset() {
    let controller = MockMinerController::new();
    let notifier = MockNotifier::new();
    let mut engine = build_engine(
        reference_prices(),
        controller.clone(),
        notifier.clone(),
        100,
    );

    engine.run_cycle(&healthy_snapshot()).await.unwrap();
    notifier.clear();
    let second = engine.run_cycle(&healthy_snapshot()).await.unwrap();
    let third = engine.run_cycle(&healthy_snapshot()).await.unwrap();

    assert!(!second.switched);
    assert!(!third.switched);
    assert_eq!(notifier.count_containing("Mining switched"), 0);
    // Same inputs, same estimate, cycle after cycle.
    assert!((second.daily_profit - third.daily_profit).abs() < 1e-6);
    assert_eq!(controller.starts().len(), 1);
    assert_eq!(engine.state().cycle_count, 3);
    assert_eq!(engine.state().switch_count, 1);
}

#[tokio::test]
async fn price_outage_degrades_then_recovers() {
    // BTC price unavailable at startup: the engine must not crash, and
    // LTC (with its merged DOGE bonus) wins the bootstrap instead.
    let prices = MockPriceFeed::new(&[("LTC", 5.0), ("DOGE", 0.0001)]);
    let controller = MockMinerController::new();
    let notifier = MockNotifier::new();
    let mut engine = build_engine(prices.clone(), controller.clone(), notifier.clone(), 100);

    engine.run_cycle(&healthy_snapshot()).await.unwrap();
    assert_eq!(engine.state().active_asset.as_deref(), Some("LTC"));

    // Outage persists: BTC estimates zero, so the policy holds.
    let hold = engine.run_cycle(&healthy_snapshot()).await.unwrap();
    assert!(!hold.switched);
    assert_eq!(engine.state().active_asset.as_deref(), Some("LTC"));

    // Upstream recovers: BTC now dominates and the switch executes
    // stop-then-start.
    prices.set_price("BTC", 60_000.0);
    let switched = engine.run_cycle(&healthy_snapshot()).await.unwrap();
    assert!(switched.switched);
    assert_eq!(engine.state().active_asset.as_deref(), Some("BTC"));
    assert_eq!(controller.stops(), vec!["LTC".to_string()]);
    assert_eq!(controller.starts(), vec!["LTC".to_string(), "BTC".to_string()]);
    assert_eq!(notifier.count_containing("Mining switched to BTC"), 1);

    // The active asset's own price drops out: its estimate falls to
    // zero, so any positive alternative justifies an immediate switch.
    prices.drop_price("BTC");
    let fallback = engine.run_cycle(&healthy_snapshot()).await.unwrap();
    assert!(fallback.switched);
    assert_eq!(engine.state().active_asset.as_deref(), Some("LTC"));
    assert_eq!(
        controller.stops(),
        vec!["LTC".to_string(), "BTC".to_string()]
    );
}

#[tokio::test]
async fn actuator_failure_keeps_previous_asset_until_recovery() {
    let prices = MockPriceFeed::new(&[("LTC", 5.0), ("DOGE", 0.0001)]);
    let controller = MockMinerController::new();
    let notifier = MockNotifier::new();
    let mut engine = build_engine(prices.clone(), controller.clone(), notifier.clone(), 100);

    engine.run_cycle(&healthy_snapshot()).await.unwrap();
    assert_eq!(engine.state().active_asset.as_deref(), Some("LTC"));

    // BTC becomes attractive but the rig controller is down.
    prices.set_price("BTC", 60_000.0);
    controller.set_error("rig controller offline");
    let report = engine.run_cycle(&healthy_snapshot()).await.unwrap();

    assert!(!report.switched);
    assert_eq!(engine.state().active_asset.as_deref(), Some("LTC"));
    assert_eq!(notifier.count_containing("Switch to BTC failed"), 1);

    // Controller recovers: the very next cycle retries and succeeds.
    controller.clear_error();
    let report = engine.run_cycle(&healthy_snapshot()).await.unwrap();
    assert!(report.switched);
    assert_eq!(engine.state().active_asset.as_deref(), Some("BTC"));
    assert_eq!(engine.state().switch_count, 2);
}

#[tokio::test]
async fn low_efficiency_raises_exactly_one_alert() {
    let notifier = MockNotifier::new();
    let mut engine = build_engine(
        reference_prices(),
        MockMinerController::new(),
        notifier.clone(),
        100,
    );

    let mut snap = healthy_snapshot();
    snap.efficiency = 65.0;
    let report = engine.run_cycle(&snap).await.unwrap();

    assert_eq!(report.alerts_emitted, 1);
    assert_eq!(notifier.count_containing("efficiency low"), 1);
    assert_eq!(notifier.count_containing("optimal performance"), 0);
}

#[tokio::test]
async fn high_efficiency_raises_a_notice() {
    let notifier = MockNotifier::new();
    let mut engine = build_engine(
        reference_prices(),
        MockMinerController::new(),
        notifier.clone(),
        100,
    );

    let mut snap = healthy_snapshot();
    snap.efficiency = 92.0;
    let report = engine.run_cycle(&snap).await.unwrap();

    assert_eq!(report.alerts_emitted, 1);
    assert_eq!(notifier.count_containing("optimal performance"), 1);
    assert_eq!(notifier.count_containing("efficiency low"), 0);
}

#[tokio::test]
async fn low_flow_alert_is_independent_of_efficiency() {
    let notifier = MockNotifier::new();
    let mut engine = build_engine(
        reference_prices(),
        MockMinerController::new(),
        notifier.clone(),
        100,
    );

    let mut snap = healthy_snapshot();
    snap.flow_rate = 5.0;
    snap.efficiency = 65.0;
    let report = engine.run_cycle(&snap).await.unwrap();

    assert_eq!(report.alerts_emitted, 2);
    assert_eq!(notifier.count_containing("flow rate low"), 1);
    assert_eq!(notifier.count_containing("efficiency low"), 1);
}

#[tokio::test]
async fn turbine_far_from_optimum_advises_increase() {
    let notifier = MockNotifier::new();
    let mut engine = build_engine(
        reference_prices(),
        MockMinerController::new(),
        notifier.clone(),
        100,
    );

    let mut snap = healthy_snapshot();
    snap.turbine_rpm = 200.0;
    let report = engine.run_cycle(&snap).await.unwrap();

    assert_eq!(report.turbine.action, TurbineAction::Increase);
    assert_eq!(notifier.count_containing("Turbine adjustment"), 1);
}

#[tokio::test]
async fn history_respects_its_cap() {
    let mut engine = build_engine(
        reference_prices(),
        MockMinerController::new(),
        MockNotifier::new(),
        3,
    );

    for _ in 0..5 {
        engine.run_cycle(&healthy_snapshot()).await.unwrap();
    }

    assert_eq!(engine.history().len(), 3);
    assert_eq!(engine.state().cycle_count, 5);
    let latest = engine.history().latest().unwrap();
    assert_eq!(latest.asset.as_deref(), Some("BTC"));
}

#[tokio::test]
async fn sensor_feed_drives_a_full_cycle() {
    // Snapshot flows through the `SensorFeed` trait exactly as the
    // binary's loop consumes it.
    let sensors = MockSensorFeed::new(healthy_snapshot());
    let mut engine = build_engine(
        reference_prices(),
        MockMinerController::new(),
        MockNotifier::new(),
        100,
    );

    let snap = sensors.snapshot().await.unwrap();
    let report = engine.run_cycle(&snap).await.unwrap();
    assert_eq!(report.active_asset.as_deref(), Some("BTC"));

    let mut degraded = healthy_snapshot();
    degraded.efficiency = 60.0;
    sensors.set(degraded);
    let snap = sensors.snapshot().await.unwrap();
    let report = engine.run_cycle(&snap).await.unwrap();
    assert_eq!(report.alerts_emitted, 1);
}
