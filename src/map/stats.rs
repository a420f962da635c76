/*!
 * Lock-Free Delay Map Statistics
 * Atomic counters updated on every protocol transition
 */

use super::types::DelayMapStats;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic delay map statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with the map's lock
/// - All operations use relaxed ordering
#[repr(C, align(64))]
pub(crate) struct AtomicDelayMapStats {
    sets: AtomicU64,
    fast_path_hits: AtomicU64,
    waits_started: AtomicU64,
    waits_fulfilled: AtomicU64,
    timeouts: AtomicU64,
    cancelled_waits: AtomicU64,
    signals_created: AtomicU64,
    signals_retired: AtomicU64,
    closes: AtomicU64,
}

impl AtomicDelayMapStats {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            sets: AtomicU64::new(0),
            fast_path_hits: AtomicU64::new(0),
            waits_started: AtomicU64::new(0),
            waits_fulfilled: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            cancelled_waits: AtomicU64::new(0),
            signals_created: AtomicU64::new(0),
            signals_retired: AtomicU64::new(0),
            closes: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub(crate) fn inc_sets(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Hot path - called on every immediate hit
    #[inline(always)]
    pub(crate) fn inc_fast_path_hits(&self) {
        self.fast_path_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_waits_started(&self) {
        self.waits_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_waits_fulfilled(&self) {
        self.waits_fulfilled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Woken by close, or by a set whose value was deleted before the re-check
    #[inline(always)]
    pub(crate) fn inc_cancelled_waits(&self) {
        self.cancelled_waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_signals_created(&self) {
        self.signals_created.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn add_signals_retired(&self, count: u64) {
        self.signals_retired.fetch_add(count, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn inc_closes(&self) {
        self.closes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats (no locks required)
    ///
    /// # Note
    /// Values may not be perfectly consistent with each other due to concurrent updates,
    /// but each individual value is accurate.
    #[inline]
    pub(crate) fn snapshot(&self) -> DelayMapStats {
        DelayMapStats {
            sets: self.sets.load(Ordering::Relaxed),
            fast_path_hits: self.fast_path_hits.load(Ordering::Relaxed),
            waits_started: self.waits_started.load(Ordering::Relaxed),
            waits_fulfilled: self.waits_fulfilled.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cancelled_waits: self.cancelled_waits.load(Ordering::Relaxed),
            signals_created: self.signals_created.load(Ordering::Relaxed),
            signals_retired: self.signals_retired.load(Ordering::Relaxed),
            closes: self.closes.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicDelayMapStats {
    fn default() -> Self {
        Self::new()
    }
}
