/*!
 * Delay Map Types
 */

use serde::{Deserialize, Serialize};

/// Delay map statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayMapStats {
    /// Values written with `set`
    pub sets: u64,
    /// Reads answered without waiting
    pub fast_path_hits: u64,
    /// Reads that missed and joined a wait signal
    pub waits_started: u64,
    /// Waiting reads that ended with a value
    pub waits_fulfilled: u64,
    /// Reads that gave up at their deadline
    pub timeouts: u64,
    /// Waiting reads woken without a value (close, or set-then-delete)
    pub cancelled_waits: u64,
    /// Wait signals allocated on a first miss
    pub signals_created: u64,
    /// Wait signals fired or discarded and removed from the registry
    pub signals_retired: u64,
    /// Calls to `close`
    pub closes: u64,
}

impl DelayMapStats {
    /// Waits that have not finished yet (approximate under concurrency)
    pub fn waits_in_flight(&self) -> u64 {
        self.waits_started
            .saturating_sub(self.waits_fulfilled + self.timeouts + self.cancelled_waits)
    }
}
