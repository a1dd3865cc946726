//! Session Error Types
//!
//! Everything that can end a grading session early. None of these abort grading: the driver
//! renders them into the observed output, which is then scored like any other output.

use std::io;

/// Boxed error returned by an in-process [`Program`](crate::session::script::Program).
pub type ProgramError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The program wanted input after every recorded input was used up.
    #[error("the program is waiting for input, but every recorded input has already been given")]
    InputExhausted,

    /// The program was given input and then went quiet without exiting.
    #[error("the program was given input, but has not produced any new output")]
    StalledAfterInput,

    #[error("the program has printed too much text (limit is {0} characters)")]
    OutputTooLarge(usize),

    #[error("the program did not finish within {0} seconds")]
    ProcessTimeout(f64),

    #[error("failed to start the program: {0}")]
    Spawn(String),

    #[error("I/O error while talking to the program: {0}")]
    Io(#[from] io::Error),

    /// An in-process program returned an error of its own.
    #[error("{0}")]
    Program(String),

    /// An in-process program panicked.
    #[error("the program panicked: {0}")]
    Panicked(String),

    /// The target could not be prepared.
    #[error("failed to prepare the program: {0}")]
    Target(String),
}

impl SessionError {
    /// Text scored in place of the program's output: the error and a backtrace of the driver.
    pub fn render(&self) -> String {
        format!(
            "Exception: {self}\n{}",
            std::backtrace::Backtrace::force_capture()
        )
    }
}
