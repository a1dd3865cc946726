use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExecutionLimits {
    /// Hard wall clock for an external process, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Time given to a freshly spawned process to reach its first prompt.
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,

    /// Bounded wait per output poll. A poll that sees nothing means the
    /// program is either thinking or waiting for input.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum observed output, in characters.
    #[serde(default = "default_max_output_len")]
    pub max_output_len: usize,

    /// Close the child's stdin once the last recorded input was written.
    #[serde(default)]
    pub close_stdin_after_all_inputs: bool,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            warmup_ms: default_warmup_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_output_len: default_max_output_len(),
            close_stdin_after_all_inputs: false,
        }
    }
}

impl ExecutionLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Scoring constants for the alignment and the transcript syntax.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MarkingOptions {
    #[serde(default = "default_match_score")]
    pub match_score: i64,

    #[serde(default = "default_substitution_score")]
    pub substitution_score: i64,

    /// Charged once when a gap run starts, on top of `gap_extend`.
    #[serde(default = "default_gap_open")]
    pub gap_open: i64,

    #[serde(default = "default_gap_extend")]
    pub gap_extend: i64,

    #[serde(default = "default_gap_marker")]
    pub gap_marker: char,

    /// Weighted regions are delimited by this character, doubled.
    #[serde(default = "default_region_delimiter")]
    pub region_delimiter: char,

    /// Width the default group's full output is padded to.
    #[serde(default = "default_pad_width")]
    pub pad_width: usize,
}

impl Default for MarkingOptions {
    fn default() -> Self {
        Self {
            match_score: default_match_score(),
            substitution_score: default_substitution_score(),
            gap_open: default_gap_open(),
            gap_extend: default_gap_extend(),
            gap_marker: default_gap_marker(),
            region_delimiter: default_region_delimiter(),
            pad_width: default_pad_width(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OutputOptions {
    /// Log every consumed chunk of program output at debug level.
    #[serde(default)]
    pub echo_output: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub execution: ExecutionLimits,

    #[serde(default)]
    pub marking: MarkingOptions,

    #[serde(default)]
    pub output: OutputOptions,
}

impl ExecutionConfig {
    pub fn default_config() -> Self {
        ExecutionConfig {
            execution: ExecutionLimits::default(),
            marking: MarkingOptions::default(),
            output: OutputOptions::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let cfg: ExecutionConfig =
            serde_json::from_str(raw).map_err(|e| format!("Invalid config JSON format: {e}"))?;
        if let Err(e) = cfg.validate() {
            warn!(error = %e, "Rejected execution config");
            return Err(e);
        }
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let file_contents = fs::read_to_string(path)
            .map_err(|_| format!("Failed to read config file at {path:?}"))?;
        let cfg = Self::from_json_str(&file_contents)?;
        info!(path = %path.display(), "Loaded execution config");
        Ok(cfg)
    }

    /// Rejects values that would make a grading run meaningless or hang.
    pub fn validate(&self) -> Result<(), String> {
        let exec = &self.execution;
        if !(exec.timeout_secs.is_finite() && exec.timeout_secs > 0.0) {
            return Err(format!(
                "timeout_secs must be a positive number, got {}",
                exec.timeout_secs
            ));
        }
        if Duration::try_from_secs_f64(exec.timeout_secs).is_err() {
            return Err(format!(
                "timeout_secs is too large to be a duration, got {}",
                exec.timeout_secs
            ));
        }
        if exec.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than zero".to_string());
        }

        let marking = &self.marking;
        if marking.gap_open > 0 || marking.gap_extend > 0 {
            return Err(format!(
                "gap penalties must not be positive (gap_open = {}, gap_extend = {})",
                marking.gap_open, marking.gap_extend
            ));
        }
        if marking.match_score <= marking.substitution_score {
            return Err(format!(
                "match_score ({}) must be greater than substitution_score ({})",
                marking.match_score, marking.substitution_score
            ));
        }
        if marking.region_delimiter == marking.gap_marker {
            return Err("region_delimiter and gap_marker must differ".to_string());
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return Err(format!("Failed to create config directory: {e:?}"));
            }
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config to JSON: {e}"))?;

        fs::write(path, json).map_err(|e| format!("Failed to write config file to disk: {e:?}"))?;

        Ok(())
    }
}

//Default Functions

fn default_timeout_secs() -> f64 {
    10.0
}

fn default_warmup_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_output_len() -> usize {
    2000
}

fn default_match_score() -> i64 {
    1
}

fn default_substitution_score() -> i64 {
    -1
}

fn default_gap_open() -> i64 {
    -3
}

fn default_gap_extend() -> i64 {
    -1
}

fn default_gap_marker() -> char {
    '~'
}

fn default_region_delimiter() -> char {
    '`'
}

fn default_pad_width() -> usize {
    80
}
