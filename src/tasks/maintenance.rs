//! Cache Maintenance Task
//!
//! Background task that periodically runs the clean-up hook of every cache
//! in a registry, dropping expired slots and compacting storage.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::CacheRegistry;

/// Spawns a background task that periodically cleans up every registered
/// cache.
///
/// Caches created after the task starts are picked up on the next run.
/// Must be called from within a tokio runtime.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it during
/// shutdown.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(CacheRegistry::new());
/// let handle = spawn_maintenance_task(registry.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_maintenance_task(registry: Arc<CacheRegistry>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache maintenance task with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.clean_up_all();

            if removed > 0 {
                info!(
                    "Cache maintenance: removed {} expired entries across {} caches",
                    removed,
                    registry.len()
                );
            } else {
                debug!("Cache maintenance: no expired entries found");
            }
        }
    })
}
