//! Shared configuration for the dialog grading crates.
//!
//! - [`execution_config`]: timing limits and scoring constants for a grading run.
//! - [`config`]: process-level settings read from the environment (logging).

pub mod config;
pub mod execution_config;
