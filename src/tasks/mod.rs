//! Background Tasks Module
//!
//! Contains background tasks that drive a shared cache from a tokio runtime.
//!
//! # Tasks
//! - Autopurge: Sweeps stale entries when the cache's purge deadline passes

mod autopurge;

pub use autopurge::spawn_autopurge_task;
