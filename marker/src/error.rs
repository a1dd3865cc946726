//! Marker Error Types
//!
//! This module defines the [`MarkerError`] enum, which covers everything that can go wrong while
//! loading a transcript, parsing its annotations, or attributing alignment credit to groups.
//!
//! Failures of the program being graded are *not* represented here: those are folded into the
//! observed output by the session driver and scored like any other output.
//!
//! # Example
//!
//! ```rust
//! use marker::error::MarkerError;
//!
//! fn check_weight(weight: u32) -> Result<(), MarkerError> {
//!     if weight > 100 {
//!         return Err(MarkerError::WeightOverflow(weight));
//!     }
//!     Ok(())
//! }
//! ```

/// Represents all error types that can occur in the marker system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    /// Malformed transcript annotation. `offset` counts characters into the transcript text
    /// after input markers have been removed.
    #[error("Transcript parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// Explicit group weights add up to more than 100.
    #[error("Group weights must add up to 100 or less (got {0})")]
    WeightOverflow(u32),

    /// The same group name was declared twice with different weights.
    #[error("Group '{group}' declared with weight {first} and again with weight {second}")]
    ConflictingWeight {
        group: String,
        first: u32,
        second: u32,
    },

    /// The alignment dropped or duplicated expected characters.
    #[error("Too many gaps in expected output: {actual} characters for {expected} group ids")]
    TooManyGaps { expected: usize, actual: usize },

    /// I/O error (file not found, unreadable, too large).
    #[error("I/O error: {0}")]
    IoError(String),

    /// The execution configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
