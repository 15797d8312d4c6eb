//! Rig sensor feed.
//!
//! Polls the rig controller's sensor endpoint for the latest
//! flow/RPM/power/efficiency reading.
//!
//! API: `GET {base}/api/sensors/latest`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::SensorFeed;
use crate::types::SensorSnapshot;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpSensorFeed {
    client: Client,
    base_url: String,
}

impl HttpSensorFeed {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build sensor HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SensorFeed for HttpSensorFeed {
    async fn snapshot(&self) -> Result<SensorSnapshot> {
        let url = format!("{}/api/sensors/latest", self.base_url);

        let snapshot: SensorSnapshot = self
            .client
            .get(&url)
            .send()
            .await
            .context("Sensor endpoint unreachable")?
            .error_for_status()
            .context("Sensor endpoint returned an error status")?
            .json()
            .await
            .context("Sensor endpoint returned malformed JSON")?;

        debug!(%snapshot, "Sensor snapshot fetched");
        Ok(snapshot)
    }
}
