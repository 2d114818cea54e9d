//! Scheduler for the periodic sweeps of every store.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use practicehub_core::error::AppError;
use practicehub_core::traits::sweeper::Sweeper;

/// Runs each registered [`Sweeper`] at its own fixed interval.
pub struct SweepScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler").finish()
    }
}

impl SweepScheduler {
    /// Create a new sweep scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Run `sweeper` every `every`. A zero interval is rejected.
    pub async fn register(
        &self,
        sweeper: Arc<dyn Sweeper>,
        every: Duration,
    ) -> Result<(), AppError> {
        let name = sweeper.name();
        if every.is_zero() {
            return Err(AppError::configuration(format!(
                "Sweep interval for '{}' must be greater than zero",
                name
            )));
        }

        let job = CronJob::new_repeated_async(every, move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                match sweeper.sweep().await {
                    Ok(removed) => {
                        tracing::debug!("Sweep '{}' removed {} entries", sweeper.name(), removed)
                    }
                    Err(e) => tracing::error!("Sweep '{}' failed: {}", sweeper.name(), e),
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create '{}' sweep: {}", name, e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add '{}' sweep: {}", name, e)))?;

        tracing::info!("Registered: {} sweep (every {}s)", name, every.as_secs());
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Sweep scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Sweep scheduler shut down");
        Ok(())
    }
}
