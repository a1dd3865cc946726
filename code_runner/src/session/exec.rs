//! External process driver.
//!
//! The child's stdout and stderr share one pipe, so the driver sees them in the order the
//! program wrote them. A single reader task drains that pipe into a channel, so output is
//! collected as it arrives no matter when the driver looks at it. The driver polls that channel
//! with a bounded wait. A quiet poll while the child is alive means it is either busy or blocked
//! on input; the driver answers the first quiet poll with the next recorded input and treats a
//! second quiet poll right after an input as a stall.
//!
//! The whole run is bounded by a wall clock. Whatever happens, the child is killed and the
//! reader is stopped before returning.

use crate::error::SessionError;
use crate::session::ObservedOutput;
use std::collections::VecDeque;
use std::io::{ErrorKind, PipeReader};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};
use util::execution_config::ExecutionConfig;

const READ_BUFFER_SIZE: usize = 4096;

/// Runs `program` with `args` in `working_dir`, answering its prompts from `inputs`.
///
/// # Returns
///
/// - `Ok(String)`: Everything the program printed, with each given input echoed on its own line.
/// - `Err(SessionError)`: The session ended early; see [`SessionError`] for the causes.
pub async fn run_executable(
    program: &Path,
    args: &[String],
    working_dir: &Path,
    inputs: VecDeque<String>,
    config: &ExecutionConfig,
) -> Result<String, SessionError> {
    let limits = &config.execution;

    let (output, stdout_writer) = std::io::pipe()?;
    let stderr_writer = stdout_writer.try_clone()?;

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::piped())
        .stdout(stdout_writer)
        .stderr(stderr_writer)
        .kill_on_drop(true);
    let spawned = command.spawn();
    // The command keeps its copies of the write end alive; EOF needs only the child's.
    drop(command);
    let mut child =
        spawned.map_err(|e| SessionError::Spawn(format!("{}: {e}", program.display())))?;
    info!(program = %program.display(), pid = ?child.id(), "Process spawned");

    let stdin = child.stdin.take();
    let (tx, rx) = mpsc::unbounded_channel();
    let reader = spawn_reader(output, tx)?;

    let result = timeout(
        limits.timeout(),
        drive(&mut child, stdin, rx, inputs, config),
    )
    .await;

    if let Err(e) = child.start_kill() {
        if e.kind() != ErrorKind::InvalidInput {
            warn!(error = %e, "Failed to kill process");
        }
    }
    if let Err(e) = child.wait().await {
        warn!(error = %e, "Failed to reap process");
    }
    if let Some(reader) = reader {
        reader.abort();
    }

    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(timeout_secs = limits.timeout_secs, "Process timed out");
            Err(SessionError::ProcessTimeout(limits.timeout_secs))
        }
    }
}

async fn drive(
    child: &mut Child,
    mut stdin: Option<ChildStdin>,
    mut rx: UnboundedReceiver<String>,
    mut inputs: VecDeque<String>,
    config: &ExecutionConfig,
) -> Result<String, SessionError> {
    let limits = &config.execution;
    let mut observed = ObservedOutput::new(limits.max_output_len, config.output.echo_output);
    let mut gave_input = false;

    sleep(limits.warmup()).await;

    loop {
        match timeout(limits.poll_interval(), rx.recv()).await {
            Ok(Some(chunk)) => {
                gave_input = false;
                observed.push(&chunk)?;
            }
            // Every write end closed.
            Ok(None) => break,
            Err(_) => {
                if child.try_wait()?.is_some() {
                    drain_after_exit(&mut rx, &mut observed, limits.poll_interval()).await?;
                    break;
                }

                if gave_input {
                    if stdin.is_none() {
                        debug!("Program went quiet after its stdin was closed");
                        break;
                    }
                    warn!("Program stalled after input");
                    return Err(SessionError::StalledAfterInput);
                }

                let Some(input) = inputs.pop_front() else {
                    warn!("Program wants more input than was recorded");
                    return Err(SessionError::InputExhausted);
                };
                let line = format!("{input}\n");
                observed.push(&line)?;
                debug!(input = %input, remaining = inputs.len(), "Giving input");

                if let Some(pipe) = stdin.as_mut() {
                    if let Err(e) = write_line(pipe, &line).await {
                        if e.kind() != ErrorKind::BrokenPipe {
                            return Err(e.into());
                        }
                        stdin = None;
                    }
                }
                if inputs.is_empty() && limits.close_stdin_after_all_inputs {
                    stdin = None;
                }
                gave_input = true;
            }
        }
    }

    Ok(observed.into_string())
}

async fn write_line(pipe: &mut ChildStdin, line: &str) -> std::io::Result<()> {
    pipe.write_all(line.as_bytes()).await?;
    pipe.flush().await
}

/// Collects what the exited child left in the pipe. A descendant that inherited the pipe can
/// keep it open, so the wait is bounded by `grace`.
async fn drain_after_exit(
    rx: &mut UnboundedReceiver<String>,
    observed: &mut ObservedOutput,
    grace: Duration,
) -> Result<(), SessionError> {
    let drain = async {
        while let Some(chunk) = rx.recv().await {
            observed.push(&chunk)?;
        }
        Ok::<(), SessionError>(())
    };
    match timeout(grace, drain).await {
        Ok(result) => result,
        Err(_) => {
            debug!("Pipe still open after the program exited");
            Ok(())
        }
    }
}

#[cfg(unix)]
fn spawn_reader(
    output: PipeReader,
    tx: UnboundedSender<String>,
) -> Result<Option<AbortHandle>, SessionError> {
    let receiver =
        tokio::net::unix::pipe::Receiver::from_owned_fd(std::os::fd::OwnedFd::from(output))?;
    Ok(Some(tokio::spawn(pump(receiver, tx)).abort_handle()))
}

/// Without a reactor-backed pipe the reader runs on its own thread and ends at EOF.
#[cfg(not(unix))]
fn spawn_reader(
    mut output: PipeReader,
    tx: UnboundedSender<String>,
) -> Result<Option<AbortHandle>, SessionError> {
    use std::io::Read;

    std::thread::Builder::new()
        .name("dialog-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            let mut decoder = Utf8Decoder::default();
            loop {
                let n = match output.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                let text = decoder.feed(&buf[..n]);
                if !text.is_empty() && tx.send(text).is_err() {
                    return;
                }
            }
            if let Some(rest) = decoder.finish() {
                let _ = tx.send(rest);
            }
        })?;
    Ok(None)
}

/// Forwards everything read from `reader` as UTF-8 text until EOF or until nobody listens.
async fn pump<R: AsyncRead + Unpin>(mut reader: R, tx: UnboundedSender<String>) {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let mut decoder = Utf8Decoder::default();
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let text = decoder.feed(&buf[..n]);
        if !text.is_empty() && tx.send(text).is_err() {
            return;
        }
    }
    if let Some(rest) = decoder.finish() {
        let _ = tx.send(rest);
    }
}

/// Decodes a byte stream whose reads may end inside a multi-byte character.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Returns the longest decodable prefix seen so far; an incomplete tail waits for more bytes.
    fn feed(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let split = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => self.pending.len(),
        };
        let rest = self.pending.split_off(split);
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = rest;
        text
    }

    fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
    }
}
