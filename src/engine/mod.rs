//! Optimization engine.
//!
//! `OptimizationLoop` orchestrates one decision cycle: record power,
//! advise the turbine, estimate profitability, apply the switch policy,
//! drive the miner controller, emit threshold alerts, and append the
//! cycle record. The binary calls `run_cycle` on a fixed cadence; cycles
//! never overlap because the loop owns its state behind `&mut self`.

pub mod history;

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::AlertsConfig;
use crate::control::{MinerController, Notifier};
use crate::strategy::{ProfitEstimator, SwitchPolicy, TurbineAdvisor};
use crate::types::{
    AssetRegistry, CycleRecord, OptimizerError, OptimizerState, SensorSnapshot, TurbineAdjustment,
};
use history::CycleHistory;

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// Summary of a completed fetch→estimate→decide→act cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub active_asset: Option<String>,
    /// Estimated daily profit for the active asset this cycle.
    pub daily_profit: f64,
    pub turbine: TurbineAdjustment,
    pub switched: bool,
    pub alerts_emitted: u32,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle #{}: asset={} profit=${:.2}/day turbine={} switched={} alerts={}",
            self.cycle_number,
            self.active_asset.as_deref().unwrap_or("-"),
            self.daily_profit,
            self.turbine.action,
            self.switched,
            self.alerts_emitted,
        )
    }
}

// ---------------------------------------------------------------------------
// Optimization loop
// ---------------------------------------------------------------------------

pub struct OptimizationLoop {
    registry: Arc<AssetRegistry>,
    estimator: ProfitEstimator,
    policy: SwitchPolicy,
    advisor: TurbineAdvisor,
    controller: Arc<dyn MinerController>,
    notifier: Arc<dyn Notifier>,
    alerts: AlertsConfig,
    state: OptimizerState,
    history: CycleHistory,
}

impl OptimizationLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<AssetRegistry>,
        estimator: ProfitEstimator,
        policy: SwitchPolicy,
        advisor: TurbineAdvisor,
        controller: Arc<dyn MinerController>,
        notifier: Arc<dyn Notifier>,
        alerts: AlertsConfig,
        history_cap: usize,
    ) -> Self {
        Self {
            registry,
            estimator,
            policy,
            advisor,
            controller,
            notifier,
            alerts,
            state: OptimizerState::new(),
            history: CycleHistory::new(history_cap),
        }
    }

    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    pub fn history(&self) -> &CycleHistory {
        &self.history
    }

    /// Run one decision cycle against a sensor snapshot.
    ///
    /// Feed unavailability degrades inside the estimator; actuator failure
    /// aborts only the switch. Anything that does escape is caught at the
    /// loop boundary in `main`, so a failed cycle never kills the process.
    pub async fn run_cycle(&mut self, snapshot: &SensorSnapshot) -> Result<CycleReport> {
        self.state.observed_power = snapshot.power_output;
        let power = snapshot.power_output;

        // 1. Turbine tuning.
        let adjustment =
            self.advisor
                .advise(snapshot.turbine_rpm, snapshot.flow_rate, power);
        if !adjustment.is_optimal() {
            info!(rpm = snapshot.turbine_rpm, %adjustment, "Turbine off optimum");
            self.notifier
                .notify(&format!("Turbine adjustment: {adjustment}"))
                .await;
        }

        // 2. Coin selection.
        let (switched, daily_profit) = match self.state.active_asset.clone() {
            Some(current) => self.check_switch(&current, power).await?,
            None => self.bootstrap(power).await?,
        };

        // 3. Threshold alerts.
        let alerts_emitted = self.emit_alerts(snapshot).await;

        // 4. History.
        self.history.push(CycleRecord {
            timestamp: chrono::Utc::now(),
            asset: self.state.active_asset.clone(),
            power_watts: power,
            efficiency_pct: snapshot.efficiency,
            daily_profit,
        });
        self.state.cycle_count += 1;

        Ok(CycleReport {
            cycle_number: self.state.cycle_count,
            active_asset: self.state.active_asset.clone(),
            daily_profit,
            turbine: adjustment,
            switched,
            alerts_emitted,
        })
    }

    /// Hysteresis check for an already-active asset.
    async fn check_switch(&mut self, current: &str, power: f64) -> Result<(bool, f64)> {
        let estimates = self.estimator.estimate_all(power).await?;
        let current_profit = estimates
            .iter()
            .find(|e| e.asset == current)
            .map(|e| e.daily_revenue)
            .unwrap_or(0.0);

        let decision = self.policy.decide(current, current_profit, &estimates);
        info!(%decision, "Switch policy decided");

        if !decision.should_switch {
            return Ok((false, current_profit));
        }

        // Invariant: the policy only targets configured assets.
        let target = decision
            .target_asset
            .as_deref()
            .ok_or_else(|| OptimizerError::Config("switch decision without target".into()))?;

        match self.execute_switch(Some(current), target).await {
            Ok(()) => {
                self.state.record_switch(target);
                self.notifier
                    .notify(&format!(
                        "Mining switched to {target} (+{:.1}% expected)",
                        decision.gain_percent
                    ))
                    .await;
                Ok((true, decision.best_profit))
            }
            Err(e) => {
                // Keep mining the previous asset; next cycle retries.
                error!(error = %e, target, "Switch failed, staying on current asset");
                self.notifier
                    .notify(&format!("Switch to {target} failed: {e}"))
                    .await;
                Ok((false, current_profit))
            }
        }
    }

    /// Initial coin selection: pick the maximum estimate and switch
    /// unconditionally (no penalty check: nothing is running yet).
    async fn bootstrap(&mut self, power: f64) -> Result<(bool, f64)> {
        let estimates = self.estimator.estimate_all(power).await?;
        let Some(best) = SwitchPolicy::best(&estimates) else {
            warn!("No assets to bootstrap from");
            return Ok((false, 0.0));
        };
        let target = best.asset.clone();
        let best_profit = best.daily_revenue;

        info!(
            asset = %target,
            profit = format!("${best_profit:.2}/day"),
            "Initial coin selection"
        );

        match self.execute_switch(None, &target).await {
            Ok(()) => {
                self.state.record_switch(&target);
                self.notifier
                    .notify(&format!("Mining started on {target}"))
                    .await;
                Ok((true, best_profit))
            }
            Err(e) => {
                // Still unbootstrapped; retried next cycle.
                error!(error = %e, target = %target, "Bootstrap switch failed");
                self.notifier
                    .notify(&format!("Failed to start mining {target}: {e}"))
                    .await;
                Ok((false, 0.0))
            }
        }
    }

    /// Stop the old worker (if any) and start the new one.
    async fn execute_switch(&self, from: Option<&str>, to: &str) -> Result<()> {
        let profile = self
            .registry
            .get(to)
            .ok_or_else(|| OptimizerError::UnknownAsset(to.to_string()))?;

        if let Some(from) = from {
            self.controller
                .stop(from)
                .await
                .map_err(|e| OptimizerError::Actuator {
                    asset: to.to_string(),
                    message: format!("stop {from}: {e}"),
                })?;
        }

        self.controller
            .start(profile)
            .await
            .map_err(|e| OptimizerError::Actuator {
                asset: to.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Efficiency and flow threshold alerts. Low/high efficiency are
    /// mutually exclusive; low flow is independent.
    async fn emit_alerts(&self, snapshot: &SensorSnapshot) -> u32 {
        let mut emitted = 0;

        if snapshot.efficiency < self.alerts.efficiency_low_pct {
            warn!(efficiency = snapshot.efficiency, "Efficiency low");
            self.notifier
                .notify(&format!(
                    "ALERT: efficiency low ({:.1}%) - check turbine alignment",
                    snapshot.efficiency
                ))
                .await;
            emitted += 1;
        } else if snapshot.efficiency > self.alerts.efficiency_high_pct {
            info!(efficiency = snapshot.efficiency, "Efficiency excellent");
            self.notifier
                .notify(&format!(
                    "Efficiency {:.1}% - optimal performance",
                    snapshot.efficiency
                ))
                .await;
            emitted += 1;
        }

        if snapshot.flow_rate < self.alerts.flow_low_lpm {
            warn!(flow = snapshot.flow_rate, "Flow rate low");
            self.notifier
                .notify(&format!(
                    "ALERT: flow rate low ({:.1} L/min) - piezo backup recommended",
                    snapshot.flow_rate
                ))
                .await;
            emitted += 1;
        }

        emitted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
