//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Everything is supplied at startup and never mutated at runtime: the
//! asset set, the switching penalty, the turbine physics constants, the
//! alert thresholds, and the collaborator endpoints.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use crate::types::AssetProfile;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub optimizer: OptimizerConfig,
    pub turbine: TurbineConfig,
    pub alerts: AlertsConfig,
    pub history: HistoryConfig,
    pub endpoints: EndpointsConfig,
    pub price_feed: PriceFeedConfig,
    pub assets: Vec<AssetProfile>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OptimizerConfig {
    /// Seconds between decision cycles.
    pub cycle_interval_secs: u64,
    /// Minimum fractional profit improvement before a switch is worth the
    /// downtime (0.05 = 5%).
    pub switching_penalty: f64,
    /// Fraction of a merged partner's block reward credited as bonus.
    pub merged_reward_fraction: f64,
    /// Seconds to wait after a failed cycle before the next attempt.
    pub failure_backoff_secs: u64,
    /// Consecutive cycle failures that trip the circuit breaker.
    pub max_consecutive_failures: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TurbineConfig {
    /// Net head above the turbine, meters.
    pub head_m: f64,
    /// Runner diameter, meters.
    pub diameter_m: f64,
    /// Optimal tip-speed ratio (0.45-0.50 for Turgo runners).
    pub optimal_tip_speed_ratio: f64,
    /// RPM deviation beyond which an adjustment is recommended.
    pub rpm_deviation_threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertsConfig {
    /// Efficiency (%) below which a low-efficiency alert fires.
    pub efficiency_low_pct: f64,
    /// Efficiency (%) above which a high-efficiency notice fires.
    pub efficiency_high_pct: f64,
    /// Flow rate (L/min) below which a low-flow alert fires.
    pub flow_low_lpm: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Maximum cycle records retained; oldest entries are evicted first.
    pub max_records: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    /// Base URL of the rig's sensor API.
    pub sensor_base_url: String,
    /// Base URL of the mining controller API.
    pub controller_base_url: String,
    /// Optional webhook for switch/alert notifications.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PriceFeedConfig {
    /// Asset id → CoinGecko coin id, e.g. BTC = "bitcoin".
    pub coingecko_ids: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }
}
