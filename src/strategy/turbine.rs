//! Turbine RPM adviser.
//!
//! Derives the optimal runner speed from the site's physics: water
//! velocity via the free-fall relation `v = sqrt(2 g h)`, then
//! `optimal_rpm = tsr * v * 60 / (pi * d)` for the configured tip-speed
//! ratio and runner diameter. Deviations beyond the threshold get a
//! directional adjustment; smaller ones are left alone to avoid hunting.

use crate::config::TurbineConfig;
use crate::types::{TurbineAction, TurbineAdjustment};

const GRAVITY_MS2: f64 = 9.81;
/// Cap on the fractional power gain attributed to an RPM correction.
const MAX_GAIN_FACTOR: f64 = 0.15;

pub struct TurbineAdvisor {
    head_m: f64,
    diameter_m: f64,
    tip_speed_ratio: f64,
    rpm_deviation_threshold: f64,
}

impl TurbineAdvisor {
    pub fn new(
        head_m: f64,
        diameter_m: f64,
        tip_speed_ratio: f64,
        rpm_deviation_threshold: f64,
    ) -> Self {
        Self {
            head_m,
            diameter_m,
            tip_speed_ratio,
            rpm_deviation_threshold,
        }
    }

    pub fn from_config(cfg: &TurbineConfig) -> Self {
        Self::new(
            cfg.head_m,
            cfg.diameter_m,
            cfg.optimal_tip_speed_ratio,
            cfg.rpm_deviation_threshold,
        )
    }

    /// Physically optimal runner speed for the configured site.
    pub fn optimal_rpm(&self) -> f64 {
        let water_velocity = (2.0 * GRAVITY_MS2 * self.head_m).sqrt();
        (self.tip_speed_ratio * water_velocity * 60.0) / (std::f64::consts::PI * self.diameter_m)
    }

    /// Recommend an adjustment toward the optimum.
    ///
    /// `flow_rate` and `power_output` are part of the stable interface but
    /// unused until cavitation modelling lands.
    pub fn advise(&self, current_rpm: f64, flow_rate: f64, power_output: f64) -> TurbineAdjustment {
        let _ = (flow_rate, power_output);

        let optimal_rpm = self.optimal_rpm();
        let diff = optimal_rpm - current_rpm;

        if diff.abs() > self.rpm_deviation_threshold {
            let action = if diff > 0.0 {
                TurbineAction::Increase
            } else {
                TurbineAction::Decrease
            };
            return TurbineAdjustment {
                action,
                target_rpm: optimal_rpm,
                expected_gain: (diff.abs() / optimal_rpm) * MAX_GAIN_FACTOR,
            };
        }

        TurbineAdjustment {
            action: TurbineAction::Optimal,
            target_rpm: current_rpm,
            expected_gain: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
