//! Inbound data feeds.
//!
//! Defines the feed traits the decision engine consumes and provides
//! production implementations:
//! - CoinGecko: real-time fiat prices
//! - Static table: network difficulty (pool API integration pending)
//! - Rig HTTP endpoint: turbine/flow/power sensor snapshots

pub mod coingecko;
pub mod difficulty;
pub mod sensors;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::SensorSnapshot;

/// Source of current fiat prices per asset.
///
/// An error means the price is unavailable right now; callers degrade to a
/// zero profit estimate rather than failing the cycle.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current USD price for the asset.
    async fn price_usd(&self, asset_id: &str) -> Result<f64>;
}

/// Source of current network difficulty per asset.
#[async_trait]
pub trait DifficultyFeed: Send + Sync {
    /// Current network difficulty. Non-positive or missing values are
    /// treated as 1.0 downstream to avoid division by zero.
    async fn difficulty(&self, asset_id: &str) -> Result<f64>;
}

/// Source of rig sensor readings.
#[async_trait]
pub trait SensorFeed: Send + Sync {
    /// Latest flow/RPM/power/efficiency snapshot.
    async fn snapshot(&self) -> Result<SensorSnapshot>;
}
