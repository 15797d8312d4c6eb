//! Mock rig collaborators for integration testing.
//!
//! Deterministic in-memory implementations of every trait the
//! optimization loop depends on: price feed, difficulty feed, sensor
//! feed, miner controller, and notifier. All state is controllable and
//! inspectable from test code, with no external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hydromine::config::AlertsConfig;
use hydromine::control::{MinerController, Notifier};
use hydromine::engine::OptimizationLoop;
use hydromine::feeds::{DifficultyFeed, PriceFeed, SensorFeed};
use hydromine::strategy::{ProfitEstimator, SwitchPolicy, TurbineAdvisor};
use hydromine::types::{AssetProfile, AssetRegistry, SensorSnapshot};

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

/// Price feed with mutable per-asset prices. Assets without a price
/// behave as unavailable (error), like a timed-out upstream.
#[derive(Clone, Default)]
pub struct MockPriceFeed {
    prices: Arc<Mutex<HashMap<String, f64>>>,
}

impl MockPriceFeed {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: Arc::new(Mutex::new(
                prices.iter().map(|(a, p)| (a.to_string(), *p)).collect(),
            )),
        }
    }

    pub fn set_price(&self, asset: &str, price: f64) {
        self.prices.lock().unwrap().insert(asset.to_string(), price);
    }

    /// Simulate the upstream timing out for one asset.
    pub fn drop_price(&self, asset: &str) {
        self.prices.lock().unwrap().remove(asset);
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn price_usd(&self, asset_id: &str) -> Result<f64> {
        self.prices
            .lock()
            .unwrap()
            .get(asset_id)
            .copied()
            .ok_or_else(|| anyhow!("price fetch timed out for {asset_id}"))
    }
}

/// Difficulty feed serving the registry defaults.
pub struct MockDifficultyFeed {
    difficulties: HashMap<String, f64>,
}

impl MockDifficultyFeed {
    pub fn from_registry(registry: &AssetRegistry) -> Self {
        Self {
            difficulties: registry
                .iter()
                .map(|a| (a.id.clone(), a.default_difficulty))
                .collect(),
        }
    }
}

#[async_trait]
impl DifficultyFeed for MockDifficultyFeed {
    async fn difficulty(&self, asset_id: &str) -> Result<f64> {
        Ok(self.difficulties.get(asset_id).copied().unwrap_or(1.0))
    }
}

/// Sensor feed returning a settable snapshot.
#[derive(Clone)]
pub struct MockSensorFeed {
    snapshot: Arc<Mutex<SensorSnapshot>>,
}

impl MockSensorFeed {
    pub fn new(snapshot: SensorSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub fn set(&self, snapshot: SensorSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }
}

#[async_trait]
impl SensorFeed for MockSensorFeed {
    async fn snapshot(&self) -> Result<SensorSnapshot> {
        Ok(*self.snapshot.lock().unwrap())
    }
}

// ---------------------------------------------------------------------------
// Controller & notifier
// ---------------------------------------------------------------------------

/// Miner controller that records every stop/start and can be forced
/// to fail.
#[derive(Clone, Default)]
pub struct MockMinerController {
    starts: Arc<Mutex<Vec<String>>>,
    stops: Arc<Mutex<Vec<String>>>,
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockMinerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn starts(&self) -> Vec<String> {
        self.starts.lock().unwrap().clone()
    }

    pub fn stops(&self) -> Vec<String> {
        self.stops.lock().unwrap().clone()
    }
}

#[async_trait]
impl MinerController for MockMinerController {
    async fn stop(&self, asset_id: &str) -> Result<()> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        self.stops.lock().unwrap().push(asset_id.to_string());
        Ok(())
    }

    async fn start(&self, asset: &AssetProfile) -> Result<()> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        self.starts.lock().unwrap().push(asset.id.clone());
        Ok(())
    }
}

/// Notifier that collects every message for later assertions.
#[derive(Clone, Default)]
pub struct MockNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// The BTC/LTC/DOGE asset set from the shipped configuration.
pub fn default_registry() -> Arc<AssetRegistry> {
    Arc::new(
        AssetRegistry::new(vec![
            AssetProfile {
                id: "BTC".into(),
                pool_url: "stratum+tcp://btc.pool.test:3333".into(),
                algorithm: "SHA-256".into(),
                power_efficiency: 1.0,
                hashrate_per_watt: 0.1e12,
                block_reward: 6.25,
                default_difficulty: 62.46e12,
                merged_assets: vec![],
            },
            AssetProfile {
                id: "LTC".into(),
                pool_url: "stratum+tcp://ltc.pool.test:3333".into(),
                algorithm: "Scrypt".into(),
                power_efficiency: 1.2,
                hashrate_per_watt: 2.5e6,
                block_reward: 12.5,
                default_difficulty: 25.8e6,
                merged_assets: vec!["DOGE".into()],
            },
            AssetProfile {
                id: "DOGE".into(),
                pool_url: "stratum+tcp://doge.pool.test:3333".into(),
                algorithm: "Scrypt".into(),
                power_efficiency: 1.15,
                hashrate_per_watt: 2.5e6,
                block_reward: 10_000.0,
                default_difficulty: 10.2e6,
                merged_assets: vec![],
            },
        ])
        .unwrap(),
    )
}

/// A healthy snapshot near the reference turbine optimum.
pub fn healthy_snapshot() -> SensorSnapshot {
    SensorSnapshot {
        flow_rate: 15.0,
        turbine_rpm: 344.0,
        power_output: 1000.0,
        efficiency: 80.0,
    }
}

/// Wire a full optimization loop over the given mocks.
pub fn build_engine(
    prices: MockPriceFeed,
    controller: MockMinerController,
    notifier: MockNotifier,
    history_cap: usize,
) -> OptimizationLoop {
    let registry = default_registry();
    let difficulty = Arc::new(MockDifficultyFeed::from_registry(&registry));
    let estimator = ProfitEstimator::new(registry.clone(), Arc::new(prices), difficulty, 0.8);

    OptimizationLoop::new(
        registry,
        estimator,
        SwitchPolicy::new(0.05),
        TurbineAdvisor::new(3.0, 0.2, 0.47, 50.0),
        Arc::new(controller),
        Arc::new(notifier),
        AlertsConfig {
            efficiency_low_pct: 70.0,
            efficiency_high_pct: 85.0,
            flow_low_lpm: 10.0,
        },
        history_cap,
    )
}
