//! TTL Autopurge Task
//!
//! Background task that sweeps stale entries when the cache's purge deadline
//! passes. The cache only records the deadline; this task is what acts on it.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::LruCache;

/// Spawns a background task that runs [`LruCache::tick`] whenever the purge
/// deadline comes due.
///
/// The task holds only a weak reference between sweeps, so dropping the last
/// `Arc` to the cache ends it within `idle_interval`. While no deadline is
/// armed it wakes every `idle_interval` to look for a new one.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Mutex::new(LruCache::new(config)?));
/// let purge_handle = spawn_autopurge_task(&cache, Duration::from_secs(1));
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_autopurge_task<K, V>(
    cache: &Arc<Mutex<LruCache<K, V>>>,
    idle_interval: Duration,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    let cache = Arc::downgrade(cache);

    tokio::spawn(async move {
        info!(
            "Starting TTL autopurge task with idle interval of {:?}",
            idle_interval
        );

        loop {
            let wait = {
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let guard = cache.lock().await;
                guard
                    .next_purge_in()
                    .map_or(idle_interval, |due| due.min(idle_interval))
            };

            tokio::time::sleep(wait).await;

            let Some(cache) = cache.upgrade() else {
                break;
            };
            let (purged, remaining) = {
                let mut guard = cache.lock().await;
                (guard.tick(), guard.len())
            };

            if purged {
                info!("TTL autopurge: {} entries remain", remaining);
            } else {
                debug!("TTL autopurge: nothing due");
            }
        }

        debug!("Cache dropped, stopping TTL autopurge task");
    })
}
