/*!
 * Delay Map Library
 * Concurrent key-value store whose readers wait, up to a timeout, for keys
 * that have not been written yet
 */

pub mod core;
pub mod map;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{WaitError, WaitResult};
pub use crate::core::sync::{DelayMapConfig, WaitSignal, WakeReason, WakeResult};
pub use map::{DelayMap, DelayMapStats};
pub use monitoring::init_tracing;
