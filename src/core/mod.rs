/*!
 * Core Module
 * Wait primitives, configuration, limits and error handling
 */

pub mod errors;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use sync::{DelayMapConfig, WaitSignal, WakeReason, WakeResult};
