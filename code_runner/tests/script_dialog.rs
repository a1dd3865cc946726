use code_runner::session::script::{ExecutionContext, FnProgram};
use code_runner::{SessionError, Target, grade};
use marker::types::DEFAULT_GROUP_NAME;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use util::execution_config::ExecutionConfig;

fn write_transcript(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("dialog.txt");
    fs::write(&path, text).unwrap();
    path
}

fn echo_with(reply: &'static str) -> Target {
    Target::program(FnProgram::new("echo", move |ctx: &mut ExecutionContext<'_>| {
        let n = ctx.input("Enter: ")?;
        let shown = if reply.is_empty() { n.as_str() } else { reply };
        ctx.println(&format!("You said {shown}"))?;
        Ok(())
    }))
}

#[tokio::test]
async fn test_in_process_program_passes() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "Enter: <<7>>\nYou said 7\n");

    let outcome = grade(
        &transcript,
        echo_with(""),
        &[],
        None,
        dir.path(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_in_process_program_wrong_answer() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "Enter: <<7>>\nYou said ``7;answer;25``\n");

    let outcome = grade(
        &transcript,
        echo_with("8"),
        &[],
        None,
        dir.path(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();

    let scores = outcome.scores();
    let answer = scores.get("answer").unwrap();
    assert!(!answer.passed);
    assert_eq!(answer.expected, "7");
    assert_eq!(answer.observed, "8");
    assert!(scores.get(DEFAULT_GROUP_NAME).unwrap().passed);
    assert!((scores.total_score() - 0.75).abs() < 1e-9);
}

#[tokio::test]
async fn test_in_process_program_error_is_scored() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "Result: 3\n");

    let failing = Target::program(FnProgram::new("failing", |ctx: &mut ExecutionContext<'_>| {
        ctx.print("Result: ")?;
        Err(SessionError::Program("bad operand".to_string()).into())
    }));
    let outcome = grade(
        &transcript,
        failing,
        &[],
        None,
        dir.path(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();

    let default = outcome.scores().get(DEFAULT_GROUP_NAME).unwrap();
    assert!(!default.passed);
    assert!(default.observed.starts_with("Exception: bad operand\n"));
}

#[tokio::test]
async fn test_in_process_output_file() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "total <<5>>\n");
    let output = dir.path().join("report.txt");

    let writer_path = output.clone();
    let writer = Target::program(FnProgram::new("writer", move |ctx: &mut ExecutionContext<'_>| {
        let n = ctx.input("")?;
        fs::write(&writer_path, format!("total {n}\n"))?;
        Ok(())
    }));

    let outcome = grade(
        &transcript,
        writer,
        &[],
        Some(&output),
        dir.path(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_in_process_program_sees_working_dir() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "greeting: hello\n");
    fs::write(dir.path().join("greeting.txt"), "hello").unwrap();

    let reader = Target::program(FnProgram::new("reader", |ctx: &mut ExecutionContext<'_>| {
        let greeting = fs::read_to_string(ctx.working_dir.join("greeting.txt"))?;
        ctx.println(&format!("greeting: {greeting}"))?;
        Ok(())
    }));

    let outcome = grade(
        &transcript,
        reader,
        &[],
        None,
        dir.path(),
        &ExecutionConfig::default_config(),
    )
    .await
    .unwrap();
    assert!(outcome.is_passed(), "got {outcome:?}");
}

#[tokio::test]
async fn test_silent_in_process_loop_times_out() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(&dir, "done\n");
    let mut config = ExecutionConfig::default_config();
    config.execution.timeout_secs = 0.3;

    let stuck = Target::program(FnProgram::new("stuck", |_ctx: &mut ExecutionContext<'_>| {
        loop {
            std::thread::sleep(Duration::from_millis(20));
        }
    }));

    let started = Instant::now();
    let outcome = grade(&transcript, stuck, &[], None, dir.path(), &config)
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
