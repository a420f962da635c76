/*!
 * Delay Map Module
 *
 * Concurrent key-value store with time-bounded blocking reads
 */

mod delay_map;
mod stats;
mod types;

pub use delay_map::DelayMap;
pub use types::DelayMapStats;
