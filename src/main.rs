//! PracticeHub Server: in-process job engine and progress sync
//!
//! Main entry point that builds the services, starts their periodic sweeps
//! and waits for a shutdown signal. Routing layers and processor adapters
//! attach to the services built here.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use practicehub_cache::MemoryCacheProvider;
use practicehub_core::config::AppConfig;
use practicehub_core::error::AppError;
use practicehub_sync::ProgressStore;
use practicehub_worker::{JobEngine, SweepScheduler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PRACTICEHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PracticeHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Services ─────────────────────────────────────────
    let cache = Arc::new(MemoryCacheProvider::new(&config.cache));
    let jobs = Arc::new(JobEngine::new(config.worker.clone()));
    let progress = Arc::new(ProgressStore::new(config.progress.clone()));
    tracing::info!(
        "Services initialized (registered job types: {:?})",
        jobs.registered_types()
    );

    // ── Step 2: Periodic sweeps ──────────────────────────────────
    let scheduler = SweepScheduler::new().await?;
    scheduler
        .register(jobs.clone(), config.worker.sweep_interval())
        .await?;
    scheduler
        .register(progress.clone(), config.progress.sweep_interval())
        .await?;
    scheduler
        .register(cache.clone(), config.cache.check_period())
        .await?;
    scheduler.start().await?;

    tracing::info!("PracticeHub ready");

    // ── Step 3: Wait for shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    scheduler.shutdown().await?;
    jobs.shutdown();

    let job_stats = jobs.get_stats();
    let progress_stats = progress.get_stats();
    tracing::info!(
        "PracticeHub shut down gracefully (jobs={}, users={}, solved={})",
        job_stats.total,
        progress_stats.total_users,
        progress_stats.total_solved
    );
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
