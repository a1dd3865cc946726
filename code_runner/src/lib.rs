//! # Code Runner
//!
//! Grades a program's console dialog against an annotated transcript.
//!
//! [`grade`] ties the pieces together:
//! 1. Loads and parses the transcript (fatal on failure).
//! 2. Materialises the [`Target`]; a failure here yields a single `load-tests` record.
//! 3. Runs the target, feeding it the recorded inputs ([`session`]).
//! 4. Scores the observed output, or the output file if one was named, with the marker.
//!
//! Faults of the graded program never escape as errors: they become the observed output and
//! are scored like anything else.

pub mod error;
pub mod session;
pub mod target;

pub use error::SessionError;
pub use target::Target;

use marker::MarkingJob;
use marker::error::MarkerError;
use marker::types::{GradeOutcome, GroupScores, LOAD_TESTS_GROUP_NAME, ScoreRecord};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use util::execution_config::ExecutionConfig;

/// Grades `target` against the transcript at `transcript_path`.
///
/// # Arguments
/// * `transcript_path` - Annotated transcript.
/// * `target` - What to run.
/// * `args` - Positional arguments for the target.
/// * `output_file` - If set, the contents of this file are scored instead of the console dialog.
///   A stale copy is removed before the target runs.
/// * `working_dir` - Directory the target runs in.
/// * `config` - Execution and marking configuration.
///
/// # Returns
/// * `Ok(GradeOutcome)` - Per-group records, whether or not the program behaved.
/// * `Err(MarkerError)` - The transcript or configuration is unusable.
pub async fn grade(
    transcript_path: &Path,
    target: Target,
    args: &[String],
    output_file: Option<&Path>,
    working_dir: &Path,
    config: &ExecutionConfig,
) -> Result<GradeOutcome, MarkerError> {
    config.validate().map_err(MarkerError::InvalidConfig)?;
    let expectation = marker::load_expectation(transcript_path, config)?;

    if let Some(path) = output_file {
        remove_stale(path)?;
    }

    let target = match target.resolve() {
        Ok(target) => target,
        Err(e) => {
            warn!(error = %e, "Target could not be prepared");
            return Ok(load_tests_failure(&e));
        }
    };

    let inputs = expectation.inputs.clone();
    let observed = match run_session(target, args, working_dir, inputs, config).await {
        Ok(dialog) => match output_file {
            Some(path) => read_output_file(path),
            None => dialog,
        },
        Err(e) => {
            warn!(error = %e, "Session ended with an error");
            e.render()
        }
    };

    let outcome = MarkingJob::new(&expectation, observed, config.clone()).outcome()?;
    info!(
        transcript = %transcript_path.display(),
        passed = outcome.is_passed(),
        score = outcome.scores().total_score(),
        max_score = outcome.scores().total_max_score(),
        "Grading complete"
    );
    Ok(outcome)
}

async fn run_session(
    target: Target,
    args: &[String],
    working_dir: &Path,
    inputs: VecDeque<String>,
    config: &ExecutionConfig,
) -> Result<String, SessionError> {
    match target {
        Target::Executable(path) => {
            session::exec::run_executable(&path, args, working_dir, inputs, config).await
        }
        Target::Program(program) => {
            session::script::run_program_with_timeout(
                program,
                args.to_vec(),
                working_dir.to_path_buf(),
                inputs,
                config.clone(),
            )
            .await
        }
        Target::Deferred(_) => Err(SessionError::Target(
            "target was not resolved before running".to_string(),
        )),
    }
}

fn remove_stale(path: &Path) -> Result<(), MarkerError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "Removed stale output file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MarkerError::IoError(format!(
            "Failed to remove stale output file {}: {e}",
            path.display()
        ))),
    }
}

fn read_output_file(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Output file missing");
            format!("File not found: {}. Did you write it?", path.display())
        }
    }
}

fn load_tests_failure(error: &SessionError) -> GradeOutcome {
    let scores: GroupScores = std::iter::once(ScoreRecord {
        group_name: LOAD_TESTS_GROUP_NAME.to_string(),
        expected: String::new(),
        observed: error.render(),
        score: 0.0,
        max_score: 1.0,
        passed: false,
    })
    .collect();
    GradeOutcome::from_scores(scores)
}
