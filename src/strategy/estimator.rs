//! Profitability estimation.
//!
//! Converts rig power plus price/difficulty feed reads into a daily
//! revenue estimate per asset:
//!
//! `(hashrate / difficulty) * 86400 * block_reward * price * efficiency`
//!
//! plus a merged-mining bonus for assets that carry partner rewards.
//! A missing price degrades to a zero estimate; a missing difficulty
//! degrades to 1 so the division never blows up.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::feeds::{DifficultyFeed, PriceFeed};
use crate::types::{AssetProfile, AssetRegistry, OptimizerError, ProfitEstimate};

const SECONDS_PER_DAY: f64 = 86_400.0;

pub struct ProfitEstimator {
    registry: Arc<AssetRegistry>,
    prices: Arc<dyn PriceFeed>,
    difficulty: Arc<dyn DifficultyFeed>,
    /// Fraction of a merged partner's block reward credited as bonus.
    merged_reward_fraction: f64,
}

impl ProfitEstimator {
    pub fn new(
        registry: Arc<AssetRegistry>,
        prices: Arc<dyn PriceFeed>,
        difficulty: Arc<dyn DifficultyFeed>,
        merged_reward_fraction: f64,
    ) -> Self {
        Self {
            registry,
            prices,
            difficulty,
            merged_reward_fraction,
        }
    }

    /// Estimate daily revenue for one asset at the given power draw.
    ///
    /// Unknown assets and negative power are configuration errors and fail
    /// fast. Feed unavailability is not: a missing primary price yields a
    /// zero estimate, a missing partner price drops only that bonus.
    pub async fn estimate(&self, asset_id: &str, power_watts: f64) -> Result<ProfitEstimate> {
        let asset = self
            .registry
            .get(asset_id)
            .ok_or_else(|| OptimizerError::UnknownAsset(asset_id.to_string()))?;

        if !power_watts.is_finite() || power_watts < 0.0 {
            return Err(OptimizerError::InvalidPower(power_watts).into());
        }

        let price = match self.prices.price_usd(asset_id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(asset = asset_id, error = %e, "Price unavailable, estimate is zero");
                return Ok(ProfitEstimate {
                    asset: asset_id.to_string(),
                    daily_revenue: 0.0,
                });
            }
        };

        let blocks_per_day = self.blocks_per_day(asset, power_watts).await;
        let mut daily_revenue = blocks_per_day * asset.block_reward * price;
        daily_revenue *= asset.power_efficiency;

        // Merged mining: partner rewards come at no extra power cost.
        for partner_id in &asset.merged_assets {
            // Registry construction guarantees partners are configured.
            let Some(partner) = self.registry.get(partner_id) else {
                continue;
            };
            match self.prices.price_usd(partner_id).await {
                Ok(partner_price) => {
                    let bonus = blocks_per_day
                        * partner.block_reward
                        * partner_price
                        * self.merged_reward_fraction;
                    daily_revenue += bonus;
                    debug!(
                        asset = asset_id,
                        partner = partner_id.as_str(),
                        bonus = format!("${bonus:.2}"),
                        "Merged mining bonus applied"
                    );
                }
                Err(e) => {
                    warn!(
                        asset = asset_id,
                        partner = partner_id.as_str(),
                        error = %e,
                        "Partner price unavailable, bonus skipped"
                    );
                }
            }
        }

        Ok(ProfitEstimate {
            asset: asset_id.to_string(),
            daily_revenue,
        })
    }

    /// Estimate every configured asset in registry (priority) order.
    pub async fn estimate_all(&self, power_watts: f64) -> Result<Vec<ProfitEstimate>> {
        let mut estimates = Vec::with_capacity(self.registry.len());
        for asset in self.registry.iter() {
            estimates.push(self.estimate(&asset.id, power_watts).await?);
        }
        Ok(estimates)
    }

    async fn blocks_per_day(&self, asset: &AssetProfile, power_watts: f64) -> f64 {
        let difficulty = match self.difficulty.difficulty(&asset.id).await {
            Ok(d) if d > 0.0 => d,
            _ => 1.0,
        };
        let hashrate = power_watts * asset.hashrate_per_watt;
        (hashrate / difficulty) * SECONDS_PER_DAY
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
