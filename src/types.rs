//! Shared types for the HydroMine optimizer.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that feed, strategy, and engine
//! modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// A mineable coin the rig can switch to, with its reward economics.
///
/// Defined once at startup from `config.toml` and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetProfile {
    /// Short identifier, e.g. "BTC".
    pub id: String,
    /// Stratum endpoint the miner connects to when this asset is active.
    pub pool_url: String,
    /// Hashing algorithm label, e.g. "SHA-256" or "Scrypt".
    pub algorithm: String,
    /// Power-efficiency multiplier (1.0 = baseline).
    pub power_efficiency: f64,
    /// Assumed hashrate per watt of rig power (device efficiency constant).
    pub hashrate_per_watt: f64,
    /// Reward per block in asset units.
    pub block_reward: f64,
    /// Fallback network difficulty when the feed has nothing better.
    pub default_difficulty: f64,
    /// Partner assets earned simultaneously via merged mining.
    #[serde(default)]
    pub merged_assets: Vec<String>,
}

impl fmt::Display for AssetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] eff={:.2} reward={} @ {}",
            self.id, self.algorithm, self.power_efficiency, self.block_reward, self.pool_url,
        )
    }
}

/// Ordered set of configured assets.
///
/// The configuration order doubles as the deterministic tie-break priority:
/// when two assets estimate to the same profit, the earlier one wins.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: Vec<AssetProfile>,
}

impl AssetRegistry {
    /// Build a registry, validating the asset set.
    ///
    /// Fails fast on duplicate ids, negative economics, and merged partners
    /// that are not themselves configured.
    pub fn new(assets: Vec<AssetProfile>) -> Result<Self, OptimizerError> {
        if assets.is_empty() {
            return Err(OptimizerError::Config("no assets configured".into()));
        }
        for (i, asset) in assets.iter().enumerate() {
            if assets[..i].iter().any(|a| a.id == asset.id) {
                return Err(OptimizerError::Config(format!(
                    "duplicate asset id: {}",
                    asset.id
                )));
            }
            if !asset.power_efficiency.is_finite() || asset.power_efficiency < 0.0 {
                return Err(OptimizerError::Config(format!(
                    "asset {}: power_efficiency must be >= 0",
                    asset.id
                )));
            }
            if !asset.hashrate_per_watt.is_finite() || asset.hashrate_per_watt < 0.0 {
                return Err(OptimizerError::Config(format!(
                    "asset {}: hashrate_per_watt must be >= 0",
                    asset.id
                )));
            }
        }
        for asset in &assets {
            for partner in &asset.merged_assets {
                if !assets.iter().any(|a| &a.id == partner) {
                    return Err(OptimizerError::Config(format!(
                        "asset {} declares unknown merged partner {partner}",
                        asset.id
                    )));
                }
            }
        }
        Ok(Self { assets })
    }

    /// Look up a profile by id.
    pub fn get(&self, id: &str) -> Option<&AssetProfile> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Whether an id is configured.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Profiles in configuration (priority) order.
    pub fn iter(&self) -> impl Iterator<Item = &AssetProfile> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sensor data
// ---------------------------------------------------------------------------

/// One reading from the rig's sensor endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Water flow through the turbine, L/min.
    pub flow_rate: f64,
    /// Current turbine rotational speed.
    pub turbine_rpm: f64,
    /// Electrical power output, watts.
    pub power_output: f64,
    /// Generation efficiency, percent.
    pub efficiency: f64,
}

impl fmt::Display for SensorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flow={:.1} L/min rpm={:.0} power={:.0}W eff={:.1}%",
            self.flow_rate, self.turbine_rpm, self.power_output, self.efficiency,
        )
    }
}

// ---------------------------------------------------------------------------
// Estimates & decisions
// ---------------------------------------------------------------------------

/// Estimated daily revenue for one asset at the current power draw.
///
/// Recomputed every cycle; zero when the price feed was unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitEstimate {
    pub asset: String,
    /// USD per day.
    pub daily_revenue: f64,
}

impl fmt::Display for ProfitEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=${:.2}/day", self.asset, self.daily_revenue)
    }
}

/// Outcome of one hysteresis check against the alternatives.
#[derive(Debug, Clone)]
pub struct SwitchDecision {
    pub should_switch: bool,
    /// Asset currently being mined.
    pub current_asset: String,
    /// Recommended target; only set when `should_switch`.
    pub target_asset: Option<String>,
    pub current_profit: f64,
    pub best_profit: f64,
    /// Percentage improvement over the current asset. Infinite when the
    /// current profit is zero or negative (ratio undefined).
    pub gain_percent: f64,
    /// Every per-asset estimate computed this cycle, for observability.
    pub profits: Vec<ProfitEstimate>,
}

impl fmt::Display for SwitchDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.should_switch {
            write!(
                f,
                "SWITCH {} (${:.2}/day) -> {} (${:.2}/day) +{:.1}%",
                self.current_asset,
                self.current_profit,
                self.target_asset.as_deref().unwrap_or("?"),
                self.best_profit,
                self.gain_percent,
            )
        } else {
            write!(
                f,
                "HOLD {} (${:.2}/day)",
                self.current_asset, self.current_profit,
            )
        }
    }
}

/// Direction of a recommended turbine RPM adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurbineAction {
    Increase,
    Decrease,
    Optimal,
}

impl fmt::Display for TurbineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurbineAction::Increase => write!(f, "INCREASE"),
            TurbineAction::Decrease => write!(f, "DECREASE"),
            TurbineAction::Optimal => write!(f, "OPTIMAL"),
        }
    }
}

/// Recommended turbine tuning for this cycle.
#[derive(Debug, Clone, Copy)]
pub struct TurbineAdjustment {
    pub action: TurbineAction,
    pub target_rpm: f64,
    /// Expected fractional power gain from applying the adjustment.
    pub expected_gain: f64,
}

impl TurbineAdjustment {
    /// Whether the turbine is already within tolerance of its optimum.
    pub fn is_optimal(&self) -> bool {
        self.action == TurbineAction::Optimal
    }
}

impl fmt::Display for TurbineAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            TurbineAction::Optimal => write!(f, "rpm optimal at {:.0}", self.target_rpm),
            action => write!(
                f,
                "{action} to {:.0} rpm (expected +{:.1}%)",
                self.target_rpm,
                self.expected_gain * 100.0,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle records & optimizer state
// ---------------------------------------------------------------------------

/// One appended history entry per completed cycle. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub timestamp: DateTime<Utc>,
    /// Active asset at the end of the cycle; None only before bootstrap.
    pub asset: Option<String>,
    pub power_watts: f64,
    pub efficiency_pct: f64,
    /// Estimated daily profit for the active asset at recording time.
    pub daily_profit: f64,
}

/// Mutable optimizer state. Owned exclusively by the `OptimizationLoop`
/// and mutated only at cycle boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerState {
    /// Currently mined asset; None until the bootstrap cycle picks one.
    pub active_asset: Option<String>,
    /// Most recently observed rig power draw, watts.
    pub observed_power: f64,
    pub cycle_count: u64,
    pub switch_count: u64,
    pub start_time: DateTime<Utc>,
}

impl OptimizerState {
    pub fn new() -> Self {
        Self {
            active_asset: None,
            observed_power: 0.0,
            cycle_count: 0,
            switch_count: 0,
            start_time: Utc::now(),
        }
    }

    /// Whether the initial coin selection has happened.
    pub fn is_bootstrapped(&self) -> bool {
        self.active_asset.is_some()
    }

    /// Record a completed switch to a new asset.
    pub fn record_switch(&mut self, asset: &str) {
        self.active_asset = Some(asset.to_string());
        self.switch_count += 1;
    }

    /// Uptime since the optimizer started.
    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.start_time
    }
}

impl Default for OptimizerState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OptimizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "asset={} power={:.0}W cycles={} switches={}",
            self.active_asset.as_deref().unwrap_or("-"),
            self.observed_power,
            self.cycle_count,
            self.switch_count,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for HydroMine.
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Invalid power value: {0} W")]
    InvalidPower(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Actuator error switching to {asset}: {message}")]
    Actuator { asset: String, message: String },

    #[error("Feed error ({source_name}): {message}")]
    Feed { source_name: String, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
