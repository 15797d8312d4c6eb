//! Static difficulty feed.
//!
//! Serves the per-asset default difficulties from configuration. Real pool
//! API integration is out of scope for now; the trait seam keeps the
//! estimator unchanged when it lands.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use super::DifficultyFeed;
use crate::types::AssetRegistry;

pub struct StaticDifficultyFeed {
    difficulties: HashMap<String, f64>,
}

impl StaticDifficultyFeed {
    /// Build from the configured per-asset defaults.
    pub fn from_registry(registry: &AssetRegistry) -> Self {
        let difficulties = registry
            .iter()
            .map(|a| (a.id.clone(), a.default_difficulty))
            .collect();
        Self { difficulties }
    }
}

#[async_trait]
impl DifficultyFeed for StaticDifficultyFeed {
    async fn difficulty(&self, asset_id: &str) -> Result<f64> {
        // Unknown assets fall back to 1.0, mirroring the estimator's own
        // division-by-zero guard.
        Ok(self.difficulties.get(asset_id).copied().unwrap_or(1.0))
    }
}
