/*!
 * Synchronization Primitives
 *
 * One-shot wait/notify primitives used by the delay map:
 * - `WaitSignal`: shared per-key completion that parks threads and wakes tasks
 * - `DelayMapConfig`: timeout and sizing presets
 *
 * # Architecture
 *
 * A `WaitSignal` is created the first time a reader misses on a key and is
 * shared by `Arc` among every reader that misses on the same key until a
 * writer (or a close) fires it. Firing is a broadcast and is sticky, so a
 * reader that reaches the wait after the fire returns without parking.
 */

mod config;
mod signal;
mod wake;

pub use config::DelayMapConfig;
pub use signal::WaitSignal;
pub use wake::{WakeReason, WakeResult};
