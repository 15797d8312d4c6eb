//! HydroMine: profit-switching optimizer for a hydro-powered mining rig.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires up the feed/controller/notifier collaborators, and runs the
//! fetch→estimate→decide→act loop with graceful shutdown.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use hydromine::config::AppConfig;
use hydromine::control::http::HttpMinerController;
use hydromine::control::notify::{LogNotifier, WebhookNotifier};
use hydromine::control::Notifier;
use hydromine::engine::OptimizationLoop;
use hydromine::feeds::coingecko::CoinGeckoPriceFeed;
use hydromine::feeds::difficulty::StaticDifficultyFeed;
use hydromine::feeds::sensors::HttpSensorFeed;
use hydromine::feeds::SensorFeed;
use hydromine::strategy::{ProfitEstimator, SwitchPolicy, TurbineAdvisor};
use hydromine::types::AssetRegistry;

const BANNER: &str = r#"
 _   _           _           __  __ _
| | | |_   _  __| |_ __ ___ |  \/  (_)_ __   ___
| |_| | | | |/ _` | '__/ _ \| |\/| | | '_ \ / _ \
|  _  | |_| | (_| | | | (_) | |  | | | | | |  __/
|_| |_|\__, |\__,_|_|  \___/|_|  |_|_|_| |_|\___|
       |___/
  Hydro-Powered Profit-Switching Optimizer
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        cycle_interval_secs = cfg.optimizer.cycle_interval_secs,
        switching_penalty = cfg.optimizer.switching_penalty,
        assets = cfg.assets.len(),
        "HydroMine starting up"
    );

    // -- Validate configuration & build components ------------------------

    // Fails fast on duplicate ids, bad economics, or unknown merged partners.
    let registry = Arc::new(
        AssetRegistry::new(cfg.assets.clone()).context("Invalid asset configuration")?,
    );
    for asset in registry.iter() {
        info!(asset = %asset, "Configured asset");
    }

    let prices = Arc::new(
        CoinGeckoPriceFeed::new(cfg.price_feed.coingecko_ids.clone())
            .context("Failed to build price feed")?,
    );
    let difficulty = Arc::new(StaticDifficultyFeed::from_registry(&registry));
    let sensors = HttpSensorFeed::new(&cfg.endpoints.sensor_base_url)
        .context("Failed to build sensor feed")?;
    let controller = Arc::new(
        HttpMinerController::new(&cfg.endpoints.controller_base_url)
            .context("Failed to build miner controller")?,
    );

    let notifier: Arc<dyn Notifier> = match cfg.endpoints.webhook_url.as_deref() {
        Some(url) => {
            info!(url, "Using webhook notifier");
            Arc::new(WebhookNotifier::new(url))
        }
        None => Arc::new(LogNotifier),
    };

    let estimator = ProfitEstimator::new(
        registry.clone(),
        prices,
        difficulty,
        cfg.optimizer.merged_reward_fraction,
    );

    let mut engine = OptimizationLoop::new(
        registry,
        estimator,
        SwitchPolicy::new(cfg.optimizer.switching_penalty),
        TurbineAdvisor::from_config(&cfg.turbine),
        controller,
        notifier,
        cfg.alerts.clone(),
        cfg.history.max_records,
    );

    // -- Main loop --------------------------------------------------------

    let cycle_interval = Duration::from_secs(cfg.optimizer.cycle_interval_secs);
    let backoff = Duration::from_secs(cfg.optimizer.failure_backoff_secs);
    let mut interval = tokio::time::interval(cycle_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut consecutive_failures: u32 = 0;

    info!(
        interval_secs = cfg.optimizer.cycle_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match run_cycle(&sensors, &mut engine).await {
                    Ok(()) => {
                        consecutive_failures = 0;
                    }
                    Err(e) => {
                        consecutive_failures += 1;
                        error!(
                            error = %e,
                            consecutive_failures,
                            "Cycle failed: backing off before next attempt"
                        );
                        if consecutive_failures >= cfg.optimizer.max_consecutive_failures {
                            error!(
                                failures = consecutive_failures,
                                "Circuit breaker tripped. Shutting down."
                            );
                            break;
                        }
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(
        state = %engine.state(),
        history = engine.history().len(),
        "HydroMine shut down cleanly."
    );

    Ok(())
}

/// Fetch the latest sensor snapshot and run one optimization cycle.
async fn run_cycle(sensors: &HttpSensorFeed, engine: &mut OptimizationLoop) -> Result<()> {
    let snapshot = sensors.snapshot().await.context("Sensor fetch failed")?;
    info!(%snapshot, "Cycle starting");

    let report = engine.run_cycle(&snapshot).await?;
    info!(
        cycle = report.cycle_number,
        asset = report.active_asset.as_deref().unwrap_or("-"),
        profit = format!("${:.2}/day", report.daily_profit),
        turbine = %report.turbine.action,
        switched = report.switched,
        alerts = report.alerts_emitted,
        "Cycle complete"
    );

    if report.active_asset.is_none() {
        warn!("No active asset after cycle: bootstrap will retry");
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hydromine=info"));

    let json_logging = std::env::var("HYDROMINE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
