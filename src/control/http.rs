//! HTTP mining controller client.
//!
//! Drives the rig's mining controller API:
//! - `POST {base}/api/mining/stop` : body `{"coin": ...}`
//! - `POST {base}/api/mining/start`: body `{"coin", "pool_url", "algorithm"}`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use super::MinerController;
use crate::types::AssetProfile;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpMinerController {
    client: Client,
    base_url: String,
}

impl HttpMinerController {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build controller HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MinerController for HttpMinerController {
    async fn stop(&self, asset_id: &str) -> Result<()> {
        let url = format!("{}/api/mining/stop", self.base_url);
        self.client
            .post(&url)
            .json(&json!({ "coin": asset_id }))
            .send()
            .await
            .with_context(|| format!("Failed to stop {asset_id} worker"))?
            .error_for_status()
            .with_context(|| format!("Controller rejected stop for {asset_id}"))?;

        info!(asset = asset_id, "Mining stopped");
        Ok(())
    }

    async fn start(&self, asset: &AssetProfile) -> Result<()> {
        let url = format!("{}/api/mining/start", self.base_url);
        self.client
            .post(&url)
            .json(&json!({
                "coin": asset.id,
                "pool_url": asset.pool_url,
                "algorithm": asset.algorithm,
            }))
            .send()
            .await
            .with_context(|| format!("Failed to start {} worker", asset.id))?
            .error_for_status()
            .with_context(|| format!("Controller rejected start for {}", asset.id))?;

        info!(
            asset = %asset.id,
            algorithm = %asset.algorithm,
            pool = %asset.pool_url,
            "Mining started"
        );
        Ok(())
    }
}
