//! Parser Trait
//!
//! This module defines the [`Parser`] trait, which provides a generic interface for parsing
//! various data formats into strongly-typed Rust structures. Implementations of this trait
//! are responsible for validating the input and converting it into the appropriate domain
//! model, returning detailed errors on failure.
//!
//! # Example
//!
//! ```rust
//! use marker::error::MarkerError;
//! use marker::traits::parser::Parser;
//! use util::execution_config::ExecutionConfig;
//!
//! struct LineCounter;
//!
//! impl<'a> Parser<&'a str, usize> for LineCounter {
//!     fn parse(&self, raw: &'a str, _config: &ExecutionConfig) -> Result<usize, MarkerError> {
//!         Ok(raw.lines().count())
//!     }
//! }
//!
//! let lines = LineCounter.parse("a\nb\n", &ExecutionConfig::default_config()).unwrap();
//! assert_eq!(lines, 2);
//! ```

use util::execution_config::ExecutionConfig;

use crate::error::MarkerError;

/// A generic trait for parsing data into a strongly-typed Rust structure.
///
/// # Type Parameters
///
/// * `Input` - The input type to be parsed.
/// * `Output` - The output type produced by the parser.
pub trait Parser<Input, Output> {
    /// Parse an input value into the target type.
    ///
    /// # Errors
    ///
    /// Returns a [`MarkerError`] if the input does not conform to the expected format.
    fn parse(&self, input: Input, config: &ExecutionConfig) -> Result<Output, MarkerError>;
}
