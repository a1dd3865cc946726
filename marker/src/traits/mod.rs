//!
//! Traits Module
//!
//! This module contains the seams of the marker system.
//!
//! - [`parser`]: turning raw input (a transcript) into a strongly-typed structure.
//! - [`comparator`]: aligning observed output against expected output.
//! - [`feedback`]: turning per-group scores into human readable feedback.

pub mod comparator;
pub mod feedback;
pub mod parser;
