use clap::Parser;
use code_runner::{Target, grade};
use marker::feedback::auto_feedback::AutoFeedback;
use marker::report::DialogReport;
use std::path::{self, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_appender::rolling;
use util::config::AppConfig;
use util::execution_config::ExecutionConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Grade a program's console dialog against a transcript")]
struct Args {
    /// Annotated transcript
    transcript: PathBuf,
    /// Program to run
    executable: PathBuf,
    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
    /// Score the contents of this file instead of the console dialog
    #[arg(long)]
    output_file: Option<PathBuf>,
    /// Directory the program runs in; defaults to the current directory
    #[arg(long)]
    working_dir: Option<PathBuf>,
    /// JSON execution config; defaults apply to anything left out
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let app_config = AppConfig::from_env();
    let _log_guard = init_logging(&app_config);
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match ExecutionConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "Failed to load config");
                eprintln!("{e}");
                return ExitCode::from(2);
            }
        },
        None => ExecutionConfig::default_config(),
    };

    let working_dir = match &args.working_dir {
        Some(dir) => dir.clone(),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!(error = %e, "Failed to read the current directory");
                eprintln!("{e}");
                return ExitCode::from(2);
            }
        },
    };
    // Resolved against where the grader started, not the program's working directory.
    let executable = match path::absolute(&args.executable) {
        Ok(executable) => executable,
        Err(e) => {
            error!(error = %e, "Failed to resolve the executable path");
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let outcome = match grade(
        &args.transcript,
        Target::executable(executable),
        &args.args,
        args.output_file.as_deref(),
        &working_dir,
        &config,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Grading failed");
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let label = args.transcript.display().to_string();
    let response = match marker::report_outcome(label, &outcome, &AutoFeedback).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Report failed");
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        print_summary(response.data());
    }

    if outcome.is_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_summary(report: &DialogReport) {
    println!("{:<24} {:>8} {:>8}  result", "group", "score", "max");
    for record in &report.groups {
        println!(
            "{:<24} {:>8.2} {:>8.2}  {}",
            record.group_name,
            record.score,
            record.max_score,
            if record.passed { "passed" } else { "FAILED" }
        );
    }
    for entry in report.feedback.iter().filter(|f| !f.message.is_empty()) {
        println!("  {}: {}", entry.group, entry.message);
    }
    println!("total: {:.2} / {:.2}", report.mark.earned, report.mark.total);
}

fn init_logging(config: &AppConfig) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all(&config.log_dir).ok();

    let file_appender = rolling::daily(&config.log_dir, &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config.log_to_stdout {
        registry.with(console_layer).init();
    } else {
        registry.init();
    }

    guard
}
