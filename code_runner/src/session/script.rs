//! In-process program driver.
//!
//! A [`Program`] never touches the process's real stdin or stdout. It receives an
//! [`ExecutionContext`] carrying its arguments, its working directory and a [`ConsoleIo`] to
//! read input and print through. The driver supplies a console that answers `input` from the
//! recorded inputs and records everything that would have been shown on a terminal.
//!
//! ```rust
//! use code_runner::session::script::{ExecutionContext, FnProgram, Program};
//!
//! let echo = FnProgram::new("echo", |ctx: &mut ExecutionContext<'_>| {
//!     let n = ctx.input("Enter: ")?;
//!     ctx.println(&format!("You said {n}"))?;
//!     Ok(())
//! });
//! assert_eq!(echo.name(), "echo");
//! ```

use crate::error::{ProgramError, SessionError};
use crate::session::ObservedOutput;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, warn};
use util::execution_config::ExecutionConfig;

/// Console seen by an in-process program.
pub trait ConsoleIo {
    /// Shows `prompt` and returns the next line of input, without its newline.
    fn input(&mut self, prompt: &str) -> Result<String, SessionError>;

    /// Shows `text` as is.
    fn print(&mut self, text: &str) -> Result<(), SessionError>;
}

/// Everything a program may know about the environment it runs in.
pub struct ExecutionContext<'a> {
    /// `args[0]` is the program name.
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub io: &'a mut dyn ConsoleIo,
}

impl ExecutionContext<'_> {
    pub fn input(&mut self, prompt: &str) -> Result<String, SessionError> {
        self.io.input(prompt)
    }

    pub fn print(&mut self, text: &str) -> Result<(), SessionError> {
        self.io.print(text)
    }

    pub fn println(&mut self, text: &str) -> Result<(), SessionError> {
        self.io.print(text)?;
        self.io.print("\n")
    }
}

/// A program that can be graded in-process.
pub trait Program: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, ctx: &mut ExecutionContext<'_>) -> Result<(), ProgramError>;
}

/// Adapts a closure into a [`Program`].
pub struct FnProgram<F> {
    name: String,
    body: F,
}

impl<F> FnProgram<F>
where
    F: Fn(&mut ExecutionContext<'_>) -> Result<(), ProgramError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> Program for FnProgram<F>
where
    F: Fn(&mut ExecutionContext<'_>) -> Result<(), ProgramError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &mut ExecutionContext<'_>) -> Result<(), ProgramError> {
        (self.body)(ctx)
    }
}

/// Console that replays recorded inputs and records the dialog.
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    observed: ObservedOutput,
}

impl ScriptedConsole {
    pub fn new(inputs: VecDeque<String>, observed: ObservedOutput) -> Self {
        Self { inputs, observed }
    }

    pub fn into_output(self) -> String {
        self.observed.into_string()
    }
}

impl ConsoleIo for ScriptedConsole {
    fn input(&mut self, prompt: &str) -> Result<String, SessionError> {
        self.observed.push(prompt)?;
        let Some(line) = self.inputs.pop_front() else {
            warn!("Program wants more input than was recorded");
            return Err(SessionError::InputExhausted);
        };
        debug!(input = %line, remaining = self.inputs.len(), "Giving input");
        self.observed.push(&line)?;
        self.observed.push("\n")?;
        Ok(line)
    }

    fn print(&mut self, text: &str) -> Result<(), SessionError> {
        self.observed.push(text)
    }
}

/// Runs `program` in-process against `inputs`.
///
/// Errors raised by the console (such as running out of input) surface as themselves even
/// when the program propagated them through its own error type. Panics are caught.
pub fn run_program(
    program: &dyn Program,
    args: &[String],
    working_dir: PathBuf,
    inputs: VecDeque<String>,
    config: &ExecutionConfig,
) -> Result<String, SessionError> {
    let observed = ObservedOutput::new(
        config.execution.max_output_len,
        config.output.echo_output,
    );
    let mut console = ScriptedConsole::new(inputs, observed);

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(program.name().to_string());
    argv.extend(args.iter().cloned());

    let result = {
        let mut ctx = ExecutionContext {
            args: argv,
            working_dir,
            io: &mut console,
        };
        panic::catch_unwind(AssertUnwindSafe(|| program.run(&mut ctx)))
    };

    match result {
        Ok(Ok(())) => Ok(console.into_output()),
        Ok(Err(err)) => Err(match err.downcast::<SessionError>() {
            Ok(session_error) => *session_error,
            Err(other) => SessionError::Program(other.to_string()),
        }),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(program = program.name(), %message, "Program panicked");
            Err(SessionError::Panicked(message))
        }
    }
}

/// Runs `program` on a thread of its own, bounded by the configured wall clock.
///
/// A program still running at the deadline is abandoned; its thread lives on until the process
/// exits, but its output is no longer read.
pub async fn run_program_with_timeout(
    program: Box<dyn Program>,
    args: Vec<String>,
    working_dir: PathBuf,
    inputs: VecDeque<String>,
    config: ExecutionConfig,
) -> Result<String, SessionError> {
    let limit = config.execution.timeout();
    let timeout_secs = config.execution.timeout_secs;
    let (tx, rx) = oneshot::channel();

    std::thread::Builder::new()
        .name(format!("program-{}", program.name()))
        .spawn(move || {
            let result = run_program(program.as_ref(), &args, working_dir, inputs, &config);
            let _ = tx.send(result);
        })?;

    match timeout(limit, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(SessionError::Panicked(
            "the program thread ended without a result".to_string(),
        )),
        Err(_) => {
            warn!(timeout_secs, "Program timed out");
            Err(SessionError::ProcessTimeout(timeout_secs))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
