//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: Removes expired in-memory cache entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
