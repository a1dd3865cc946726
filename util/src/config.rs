//! Process-level configuration for the grading binaries.
//!
//! `AppConfig` holds the values read from `.env` and environment variables that
//! only matter to an executable (where logs go, how verbose they are). Grading
//! behaviour itself is never read from here; it travels in
//! [`ExecutionConfig`](crate::execution_config::ExecutionConfig).

use std::env;

/// Represents the application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub log_dir: String,
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every value has a default, so this never fails.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_file: lookup("LOG_FILE").unwrap_or_else(|| "grader.log".into()),
            log_to_stdout: lookup("LOG_TO_STDOUT")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".into()),
        }
    }
}
