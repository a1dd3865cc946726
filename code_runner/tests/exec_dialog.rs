#![cfg(unix)]

use code_runner::{Target, grade};
use marker::error::MarkerError;
use marker::types::{DEFAULT_GROUP_NAME, GradeOutcome, LOAD_TESTS_GROUP_NAME};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use util::execution_config::ExecutionConfig;

const ECHO_TRANSCRIPT: &str = "Enter: <<7>>\nYou said 7\n";

fn fast_config() -> ExecutionConfig {
    let mut config = ExecutionConfig::default_config();
    config.execution.warmup_ms = 50;
    config.execution.poll_interval_ms = 300;
    config.execution.timeout_secs = 10.0;
    config
}

fn write_transcript(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("dialog.txt");
    fs::write(&path, text).unwrap();
    path
}

fn sh(script: &str) -> (Target, Vec<String>) {
    (
        Target::executable("/bin/sh"),
        vec!["-c".to_string(), script.to_string()],
    )
}

async fn run(
    transcript: &Path,
    script: &str,
    extra_args: &[&str],
    output_file: Option<&Path>,
    config: &ExecutionConfig,
) -> Result<GradeOutcome, MarkerError> {
    let (target, mut args) = sh(script);
    args.extend(extra_args.iter().map(|s| s.to_string()));
    let working_dir = transcript.parent().unwrap_or(Path::new("."));
    grade(transcript, target, &args, output_file, working_dir, config).await
}

#[tokio::test]
async fn test_echo_program_passes() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, ECHO_TRANSCRIPT);

    let outcome = run(
        &transcript,
        r#"printf 'Enter: '; read n; echo "You said $n""#,
        &[],
        None,
        &fast_config(),
    )
    .await
    .unwrap();

    assert!(outcome.is_passed(), "got {outcome:?}");
    for record in outcome.scores().iter() {
        assert!((record.score - record.max_score).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_wrong_echo_gets_partial_credit() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, ECHO_TRANSCRIPT);

    let outcome = run(
        &transcript,
        r#"printf 'Enter: '; read n; echo "You said 8""#,
        &[],
        None,
        &fast_config(),
    )
    .await
    .unwrap();

    let GradeOutcome::PartialCredit(scores) = outcome else {
        panic!("expected partial credit");
    };
    let default = scores.get(DEFAULT_GROUP_NAME).unwrap();
    assert!(!default.passed);
    assert!(default.score < default.max_score);
    assert!(default.score > 0.0);
    assert!(default.observed.starts_with("Enter: 7\nYou said 8\n"));
    assert!(default.expected.starts_with("Enter: 7\nYou said 7\n"));
}

#[tokio::test]
async fn test_weighted_region_scores_independently() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(
        &dir,
        "Number: <<4>>\nDouble: ``8;double;60``\n",
    );

    let outcome = run(
        &transcript,
        r#"printf 'Number: '; read n; echo "Double: 9""#,
        &[],
        None,
        &fast_config(),
    )
    .await
    .unwrap();

    let scores = outcome.scores();
    assert!(!scores.get("double").unwrap().passed);
    assert_eq!(scores.get("double").unwrap().observed, "9");
    assert!(scores.get(DEFAULT_GROUP_NAME).unwrap().passed);
    assert!((scores.total_score() - 0.4).abs() < 1e-9);
}

#[tokio::test]
async fn test_stderr_is_part_of_the_dialog() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "oops\n");

    let outcome = run(&transcript, "echo oops >&2", &[], None, &fast_config())
        .await
        .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_interleaved_streams_keep_write_order() {
    let dir = TempDir::new().unwrap();
    let expected: String = (0..10).map(|i| format!("out{i}\nerr{i}\n")).collect();
    let transcript = write_transcript(&dir, &expected);
    let script = "for i in 0 1 2 3 4 5 6 7 8 9; do echo out$i; echo err$i >&2; done";

    for _ in 0..5 {
        let outcome = run(&transcript, script, &[], None, &fast_config())
            .await
            .unwrap();
        assert!(outcome.is_passed(), "got {outcome:?}");
    }
}

#[tokio::test]
async fn test_program_runs_in_working_dir() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "from the working dir\n");
    fs::write(dir.path().join("note.txt"), "from the working dir\n").unwrap();

    let outcome = run(&transcript, "cat note.txt", &[], None, &fast_config())
        .await
        .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_arguments_reach_the_program() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "first=alpha second=beta\n");

    let outcome = run(
        &transcript,
        r#"echo "first=$1 second=$2""#,
        &["sh", "alpha", "beta"],
        None,
        &fast_config(),
    )
    .await
    .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_input_exhausted_fails_every_group() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "Enter: ``ok;answer;50``\n");

    let outcome = run(
        &transcript,
        "printf 'Enter: '; read n; echo ok",
        &[],
        None,
        &fast_config(),
    )
    .await
    .unwrap();

    assert!(!outcome.is_passed());
    let default = outcome.scores().get(DEFAULT_GROUP_NAME).unwrap();
    assert!(!default.passed);
    assert!(default.observed.starts_with("Exception: the program is waiting for input"));
}

#[tokio::test]
async fn test_stall_after_input() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, ECHO_TRANSCRIPT);

    let outcome = run(
        &transcript,
        "printf 'Enter: '; read n; sleep 30",
        &[],
        None,
        &fast_config(),
    )
    .await
    .unwrap();

    let default = outcome.scores().get(DEFAULT_GROUP_NAME).unwrap();
    assert!(!default.passed);
    assert!(
        default.observed.starts_with(
            "Exception: the program was given input, but has not produced any new output"
        ),
        "got {:?}",
        default.observed
    );
}

#[tokio::test]
async fn test_quiet_after_closed_stdin_ends_the_dialog() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "x: <<1>>\n");
    let mut config = fast_config();
    config.execution.close_stdin_after_all_inputs = true;

    let outcome = run(
        &transcript,
        "printf 'x: '; read a; sleep 30",
        &[],
        None,
        &config,
    )
    .await
    .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_hung_program_times_out() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "never printed\n");
    let mut config = fast_config();
    config.execution.warmup_ms = 0;
    config.execution.poll_interval_ms = 5000;
    config.execution.timeout_secs = 0.3;

    let started = Instant::now();
    let outcome = run(&transcript, "sleep 30", &[], None, &config)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    let default = outcome.scores().get(DEFAULT_GROUP_NAME).unwrap();
    assert!(!default.passed);
    assert!(
        default
            .observed
            .starts_with("Exception: the program did not finish within 0.3 seconds"),
        "got {:?}",
        default.observed
    );
}

#[tokio::test]
async fn test_runaway_output_is_capped() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "y\n");
    let mut config = fast_config();
    config.execution.max_output_len = 100;

    let outcome = run(&transcript, "yes", &[], None, &config).await.unwrap();
    let default = outcome.scores().get(DEFAULT_GROUP_NAME).unwrap();
    assert!(
        default.observed.starts_with(
            "Exception: the program has printed too much text (limit is 100 characters)"
        ),
        "got {:?}",
        default.observed
    );
}

#[tokio::test]
async fn test_output_file_is_scored_instead_of_dialog() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "hello <<Ada>>\n");
    let output = dir.path().join("out.txt");
    let out_arg = output.display().to_string();

    let outcome = run(
        &transcript,
        r#"read n; echo "hello $n" > "$1""#,
        &["sh", &out_arg],
        Some(&output),
        &fast_config(),
    )
    .await
    .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_stale_output_file_is_not_scored() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "hello <<Ada>>\n");
    let output = dir.path().join("out.txt");
    fs::write(&output, "hello Ada\n").unwrap();

    let outcome = run(&transcript, "read n", &[], Some(&output), &fast_config())
        .await
        .unwrap();

    let default = outcome.scores().get(DEFAULT_GROUP_NAME).unwrap();
    assert!(!default.passed);
    assert!(
        default
            .observed
            .starts_with(&format!("File not found: {}. Did you write it?", output.display()))
    );
    assert!(!output.exists());
}

#[tokio::test]
async fn test_failed_factory_yields_load_tests_record() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, ECHO_TRANSCRIPT);

    let target = Target::deferred(|| Err("compilation failed".into()));
    let outcome = grade(&transcript, target, &[], None, dir.path(), &fast_config())
        .await
        .unwrap();

    let scores = outcome.scores();
    assert_eq!(scores.len(), 1);
    let record = scores.get(LOAD_TESTS_GROUP_NAME).unwrap();
    assert_eq!(record.expected, "");
    assert!(record.observed.contains("compilation failed"));
    assert_eq!(record.score, 0.0);
    assert_eq!(record.max_score, 1.0);
    assert!(!record.passed);
}

#[tokio::test]
async fn test_deferred_executable_runs() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "built\n");

    let target = Target::deferred(|| Ok(Target::executable("/bin/sh")));
    let args = vec!["-c".to_string(), "echo built".to_string()];
    let outcome = grade(&transcript, target, &args, None, dir.path(), &fast_config())
        .await
        .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_malformed_transcript_is_fatal() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "``never closed;g;10");

    let err = run(&transcript, "true", &[], None, &fast_config())
        .await
        .unwrap_err();
    assert!(matches!(err, MarkerError::Parse { offset: 0, .. }));
}

#[tokio::test]
async fn test_missing_executable_is_scored_as_failure() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "hi\n");

    let target = Target::executable(dir.path().join("not-there"));
    let outcome = grade(&transcript, target, &[], None, dir.path(), &fast_config())
        .await
        .unwrap();
    let default = outcome.scores().get(DEFAULT_GROUP_NAME).unwrap();
    assert!(default.observed.starts_with("Exception: failed to start the program"));
}
