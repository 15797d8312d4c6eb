//! CoinGecko price feed.
//!
//! Fetches spot prices from the CoinGecko simple-price API.
//!
//! API: `https://api.coingecko.com/api/v3/simple/price`
//! Auth: none for the public tier. Rate limit: ~30 req/min.
//!
//! Requests carry a 5-second timeout so a slow upstream degrades one
//! cycle's estimate instead of stalling the loop.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::PriceFeed;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct CoinGeckoPriceFeed {
    client: Client,
    base_url: String,
    /// Asset id → CoinGecko coin id, e.g. "BTC" → "bitcoin".
    coin_ids: HashMap<String, String>,
}

impl CoinGeckoPriceFeed {
    pub fn new(coin_ids: HashMap<String, String>) -> Result<Self> {
        Self::with_base_url(coin_ids, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(coin_ids: HashMap<String, String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build CoinGecko HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            coin_ids,
        })
    }

    fn coin_id(&self, asset_id: &str) -> Result<&str> {
        self.coin_ids
            .get(asset_id)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("No CoinGecko id mapped for asset {asset_id}"))
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoPriceFeed {
    async fn price_usd(&self, asset_id: &str) -> Result<f64> {
        let coin_id = self.coin_id(asset_id)?;
        let url = format!(
            "{}/api/v3/simple/price?ids={coin_id}&vs_currencies=usd",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("CoinGecko request failed for {asset_id}"))?
            .error_for_status()
            .with_context(|| format!("CoinGecko returned an error status for {asset_id}"))?;

        // Payload shape: {"bitcoin": {"usd": 60000.0}}
        let body: HashMap<String, HashMap<String, f64>> = response
            .json()
            .await
            .with_context(|| format!("CoinGecko returned malformed JSON for {asset_id}"))?;

        let price = body
            .get(coin_id)
            .and_then(|prices| prices.get("usd"))
            .copied()
            .ok_or_else(|| anyhow!("CoinGecko response missing usd price for {coin_id}"))?;

        debug!(asset = asset_id, price, "Price fetched");
        Ok(price)
    }
}
