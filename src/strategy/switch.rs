//! Switch hysteresis.
//!
//! Stays on the current asset unless an alternative beats it by more
//! than the switching penalty: the revenue lost to worker restart and
//! pool reconnection downtime. Pure function of its inputs: the loop
//! computes the per-asset estimates, the policy only compares them.

use tracing::debug;

use crate::types::{ProfitEstimate, SwitchDecision};

pub struct SwitchPolicy {
    /// Minimum fractional profit improvement required to switch.
    switching_penalty: f64,
}

impl SwitchPolicy {
    pub fn new(switching_penalty: f64) -> Self {
        Self { switching_penalty }
    }

    /// Pick the most profitable estimate.
    ///
    /// Ties go to the earliest entry, so a slice in registry order gives a
    /// deterministic, reproducible selection.
    pub fn best<'a>(estimates: &'a [ProfitEstimate]) -> Option<&'a ProfitEstimate> {
        let mut best: Option<&ProfitEstimate> = None;
        for estimate in estimates {
            match best {
                Some(b) if estimate.daily_revenue <= b.daily_revenue => {}
                _ => best = Some(estimate),
            }
        }
        best
    }

    /// Decide whether to leave `current_asset` given this cycle's estimates.
    ///
    /// When `current_profit` is zero or negative the improvement ratio is
    /// undefined; the policy then switches to any alternative with positive
    /// profit and reports an infinite gain.
    pub fn decide(
        &self,
        current_asset: &str,
        current_profit: f64,
        estimates: &[ProfitEstimate],
    ) -> SwitchDecision {
        let hold = |profits: Vec<ProfitEstimate>, best_profit: f64| SwitchDecision {
            should_switch: false,
            current_asset: current_asset.to_string(),
            target_asset: None,
            current_profit,
            best_profit,
            gain_percent: 0.0,
            profits,
        };

        let Some(best) = Self::best(estimates) else {
            return hold(estimates.to_vec(), current_profit);
        };

        if best.asset == current_asset {
            return hold(estimates.to_vec(), best.daily_revenue);
        }

        let (should_switch, gain_percent) = if current_profit <= 0.0 {
            (best.daily_revenue > 0.0, f64::INFINITY)
        } else {
            let gain = (best.daily_revenue - current_profit) / current_profit;
            (gain > self.switching_penalty, gain * 100.0)
        };

        if !should_switch {
            debug!(
                current = current_asset,
                candidate = %best.asset,
                gain = format!("{gain_percent:.1}%"),
                penalty = format!("{:.1}%", self.switching_penalty * 100.0),
                "Candidate below switching penalty"
            );
            return hold(estimates.to_vec(), best.daily_revenue);
        }

        SwitchDecision {
            should_switch: true,
            current_asset: current_asset.to_string(),
            target_asset: Some(best.asset.clone()),
            current_profit,
            best_profit: best.daily_revenue,
            gain_percent,
            profits: estimates.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
