/*!
 * Delay Map Configuration
 *
 * Construction-time settings for wait timeout and store sizing
 */

use crate::core::limits::{
    DEFAULT_INITIAL_CAPACITY, DEFAULT_WAIT_TIMEOUT, LONG_WAIT_TIMEOUT,
    LOW_LATENCY_INITIAL_CAPACITY, LOW_LATENCY_WAIT_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay map configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayMapConfig {
    /// Maximum time a `get` waits for a missing key
    pub timeout: Duration,
    /// Entries to pre-allocate in the store (also used after `close`)
    pub initial_capacity: usize,
}

impl Default for DelayMapConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl DelayMapConfig {
    /// Configuration for request/reply correlation with short deadlines
    pub const fn low_latency() -> Self {
        Self {
            timeout: LOW_LATENCY_WAIT_TIMEOUT,
            initial_capacity: LOW_LATENCY_INITIAL_CAPACITY,
        }
    }

    /// Configuration for producers expected to take seconds
    pub const fn long_wait() -> Self {
        Self {
            timeout: LONG_WAIT_TIMEOUT,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Override the wait timeout
    pub const fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Override the initial store capacity
    pub const fn with_initial_capacity(self, initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_ordered() {
        assert!(DelayMapConfig::low_latency().timeout < DelayMapConfig::default().timeout);
        assert!(DelayMapConfig::default().timeout < DelayMapConfig::long_wait().timeout);
    }

    #[test]
    fn test_builder_overrides() {
        let config = DelayMapConfig::default()
            .with_timeout(Duration::from_millis(250))
            .with_initial_capacity(16);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.initial_capacity, 16);
    }
}
