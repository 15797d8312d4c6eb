//! Decision engine: profitability estimation, switch hysteresis, and
//! turbine tuning.

pub mod estimator;
pub mod switch;
pub mod turbine;

pub use estimator::ProfitEstimator;
pub use switch::SwitchPolicy;
pub use turbine::TurbineAdvisor;
