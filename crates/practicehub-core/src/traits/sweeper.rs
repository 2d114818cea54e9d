//! Periodic eviction of aged in-memory state.

use async_trait::async_trait;

use crate::result::AppResult;

/// A store that can evict records older than its horizon.
///
/// The scheduler calls [`Sweeper::sweep`] on a fixed period; each store
/// decides its own horizon and which records are eligible.
#[async_trait]
pub trait Sweeper: Send + Sync + 'static {
    /// Short name used in logs (e.g. `"jobs"`).
    fn name(&self) -> &'static str;

    /// Evict expired records. Returns how many were removed.
    async fn sweep(&self) -> AppResult<usize>;
}
