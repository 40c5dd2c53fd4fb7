//! Production-cycle worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cpilot_worker::collaborators;
use cpilot_worker::{CycleConfig, CycleRunner, Scheduler, SchedulerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("cpilot=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting cpilot-worker");

    let scheduler_config = SchedulerConfig::from_env();
    if scheduler_config.user_ids.is_empty() {
        error!("CYCLE_USER_IDS is empty, nothing to schedule");
        std::process::exit(1);
    }
    info!(
        users = scheduler_config.user_ids.len(),
        run_once = scheduler_config.run_once,
        dry_run = scheduler_config.options.dry_run,
        "Scheduler config loaded"
    );

    let collab = match collaborators::build_from_env().await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build collaborators: {e:#}");
            std::process::exit(1);
        }
    };
    let settings = Arc::clone(&collab.settings);
    let runner = CycleRunner::new(CycleConfig::from_env(), collab);
    let scheduler = Scheduler::new(runner, settings, scheduler_config);

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx.send(true).ok();
    });

    scheduler.run(shutdown_rx).await;
    info!("cpilot-worker stopped");
}
