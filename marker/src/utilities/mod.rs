//! # Utilities
//!
//! This module contains helper functions used throughout the `marker` crate.
//!
//! Currently, this module exports the following sub-module:
//! - [`file_loader`]: Loading and validating transcript files.

pub mod file_loader;
