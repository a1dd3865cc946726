//! # Session Driver
//!
//! Runs a target and records the dialog it has with the recorded inputs of a transcript.
//!
//! - [`exec`]: external executables over real pipes, with timing heuristics to decide when the
//!   program wants input.
//! - [`script`]: in-process programs driven through an injected console.
//!
//! Both drivers build the observed output in an [`ObservedOutput`], which enforces the output cap.

pub mod exec;
pub mod script;

use crate::error::SessionError;
use tracing::{debug, warn};

/// Accumulated observed output of one session, bounded by a character cap.
#[derive(Debug)]
pub struct ObservedOutput {
    text: String,
    chars: usize,
    max_len: usize,
    echo: bool,
}

impl ObservedOutput {
    pub fn new(max_len: usize, echo: bool) -> Self {
        Self {
            text: String::new(),
            chars: 0,
            max_len,
            echo,
        }
    }

    /// Appends text, failing once the total grows past the cap.
    pub fn push(&mut self, text: &str) -> Result<(), SessionError> {
        if self.echo {
            debug!(output = %text, "Program output");
        }
        self.text.push_str(text);
        self.chars += text.chars().count();
        if self.chars > self.max_len {
            warn!(limit = self.max_len, "Output cap exceeded");
            return Err(SessionError::OutputTooLarge(self.max_len));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
