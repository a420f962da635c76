/*!
 * Limits and Constants
 *
 * Centralized location for default timeouts and sizing hints.
 * Organized by concern so presets in `DelayMapConfig` read from one place.
 */

use std::time::Duration;

// =============================================================================
// WAIT TIMEOUTS
// =============================================================================

/// Default maximum wait for a missing key (1 second)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Low-latency wait (100ms)
/// For request/reply correlation where a late reply is as good as none
pub const LOW_LATENCY_WAIT_TIMEOUT: Duration = Duration::from_millis(100);

/// Long wait (30 seconds)
/// For producers that may be doing I/O before the value exists
pub const LONG_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// SIZING
// =============================================================================

/// Initial store capacity (0 entries)
/// The store grows on demand; presets only pre-size when traffic is known
pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

/// Pre-sized store for low-latency correlation tables (64 entries)
/// [PERF] Avoids rehashing during the first burst of in-flight requests
pub const LOW_LATENCY_INITIAL_CAPACITY: usize = 64;
