//! Outbound control surfaces.
//!
//! Defines the `MinerController` (actuator) and `Notifier` traits the
//! optimization loop drives, plus the HTTP controller and notifier
//! implementations.

pub mod http;
pub mod notify;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::AssetProfile;

/// Abstraction over the mining controller.
///
/// Implementors stop the current worker and start a new one against a
/// pool endpoint. Both operations must be safe to call twice with the
/// same target.
#[async_trait]
pub trait MinerController: Send + Sync {
    /// Stop mining the given asset. No-op when nothing is running.
    async fn stop(&self, asset_id: &str) -> Result<()>;

    /// Start mining the given asset on its configured pool.
    async fn start(&self, asset: &AssetProfile) -> Result<()>;
}

/// Fire-and-forget notification sink.
///
/// Delivery failures are non-critical and must be swallowed by the
/// implementation (warn-logged at most), never surfaced to the loop.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}
