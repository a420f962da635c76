/*!
 * Error Types
 * Wait outcome errors with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for waits that report why no value was obtained
pub type WaitResult<T> = Result<T, WaitError>;

/// Reasons a blocking read ended without a value
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum WaitError {
    #[error("Wait operation timed out")]
    #[diagnostic(
        code(delay_map::timeout),
        help("No value was set for the key before the deadline. Increase the timeout or check the producer.")
    )]
    Timeout,

    #[error("Map was closed while waiting")]
    #[diagnostic(
        code(delay_map::closed),
        help("close() wakes every pending reader and clears the map.")
    )]
    Closed,

    #[error("Value was removed before it could be read")]
    #[diagnostic(
        code(delay_map::removed),
        help("A set() woke this reader but the key was deleted before the reader re-checked it.")
    )]
    Removed,
}

impl WaitError {
    /// True when the wait ended because its deadline passed
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout)
    }
}
