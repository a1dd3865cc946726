//! # Marker Library
//!
//! This module provides the core logic for grading a console dialog against an annotated
//! transcript. It parses transcripts, aligns observed output against the expected output with
//! a pluggable comparator, attributes the alignment to weighted groups, and generates a report
//! with feedback.
//!
//! ## Key Concepts
//! - **Transcript**: expected output annotated with recorded inputs (`<<...>>`) and weighted
//!   regions (``` ``text;name;weight`` ```).
//! - **MarkingJob**: grades one observed output against one parsed transcript.
//! - **Comparators**: pluggable alignment strategies (affine gap by default).
//! - **Feedback**: automated feedback per group.
//! - **Reports**: structured output summarizing scores and feedback per group.

pub mod comparators;
pub mod error;
pub mod feedback;
pub mod parsers;
pub mod report;
pub mod scorer;
pub mod traits;
pub mod types;
pub mod utilities;

use crate::comparators::affine_gap::AffineGapComparator;
use crate::error::MarkerError;
use crate::feedback::auto_feedback::AutoFeedback;
use crate::parsers::transcript_parser::TranscriptParser;
use crate::report::{DialogReport, DialogReportResponse};
use crate::traits::comparator::OutputComparator;
use crate::traits::feedback::Feedback;
use crate::traits::parser::Parser;
use crate::types::{GradeOutcome, ParsedExpectation};

use std::path::Path;
use tracing::{debug, info};
use util::execution_config::ExecutionConfig;

/// Parses transcript text with the marking options of `config`.
pub fn parse_transcript(
    text: &str,
    config: &ExecutionConfig,
) -> Result<ParsedExpectation, MarkerError> {
    TranscriptParser.parse(text, config)
}

/// Loads and parses a transcript file.
pub fn load_expectation(
    path: &Path,
    config: &ExecutionConfig,
) -> Result<ParsedExpectation, MarkerError> {
    let text = utilities::file_loader::load_transcript(path)?;
    let parsed = parse_transcript(&text, config)?;
    info!(
        transcript = %path.display(),
        inputs = parsed.inputs.len(),
        groups = parsed.group_names.len(),
        "Transcript loaded"
    );
    Ok(parsed)
}

/// Generates feedback for `outcome` and wraps both in a report.
pub async fn report_outcome(
    transcript_label: impl Into<String>,
    outcome: &GradeOutcome,
    feedback: &dyn Feedback,
) -> Result<DialogReportResponse, MarkerError> {
    let entries = feedback.assemble_feedback(outcome.scores()).await?;
    Ok(DialogReport::new(transcript_label, outcome.scores(), entries).into())
}

/// Represents a marking job for one observed output.
///
/// # Fields
/// - `expectation`: The parsed transcript.
/// - `observed`: Everything the program produced (or the rendered failure).
/// - `comparator`: Strategy for aligning observed against expected output.
/// - `feedback`: Strategy for turning group scores into feedback.
pub struct MarkingJob<'a> {
    expectation: &'a ParsedExpectation,
    observed: String,
    transcript_label: String,
    comparator: Box<dyn OutputComparator + 'a>,
    feedback: Box<dyn Feedback + 'a>,
    config: ExecutionConfig,
}

impl<'a> MarkingJob<'a> {
    /// Create a new marking job.
    ///
    /// # Arguments
    /// * `expectation` - The parsed transcript.
    /// * `observed` - The observed output to grade.
    /// * `config` - Execution configuration; its marking options seed the default comparator.
    pub fn new(
        expectation: &'a ParsedExpectation,
        observed: impl Into<String>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            expectation,
            observed: observed.into(),
            transcript_label: String::new(),
            comparator: Box::new(AffineGapComparator::from_options(&config.marking)),
            feedback: Box::new(AutoFeedback),
            config,
        }
    }

    /// Name the transcript in the generated report.
    pub fn with_transcript_label(mut self, label: impl Into<String>) -> Self {
        self.transcript_label = label.into();
        self
    }

    /// Set a custom output comparator strategy for this marking job.
    ///
    /// # Arguments
    /// * `comparator` - An implementation of the `OutputComparator` trait.
    pub fn with_comparator<C: OutputComparator + 'a>(mut self, comparator: C) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// Set a custom feedback strategy for this marking job.
    ///
    /// # Arguments
    /// * `feedback` - An implementation of the `Feedback` trait.
    pub fn with_feedback<F: Feedback + 'a>(mut self, feedback: F) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    /// Align and score the observed output.
    ///
    /// # Returns
    /// * `Ok(GradeOutcome::Passed)` if every group passed, `Ok(GradeOutcome::PartialCredit)`
    ///   otherwise. Both carry every group's record.
    /// * `Err(MarkerError)` if the configuration is invalid or the alignment is inconsistent
    ///   with the transcript.
    pub fn outcome(&self) -> Result<GradeOutcome, MarkerError> {
        self.config
            .validate()
            .map_err(MarkerError::InvalidConfig)?;

        let alignment = self
            .comparator
            .align(&self.observed, &self.expectation.expected_text);
        debug!(
            score = alignment.score,
            columns = alignment.columns.len(),
            "Alignment computed"
        );

        let scores = scorer::score_groups(&alignment, self.expectation, &self.config.marking)?;
        for record in scores.iter() {
            info!(
                group = %record.group_name,
                score = record.score,
                max_score = record.max_score,
                passed = record.passed,
                "Group scored"
            );
        }
        Ok(GradeOutcome::from_scores(scores))
    }

    /// Run the marking process and generate a report.
    ///
    /// # Steps
    /// 1. Aligns observed against expected output with the configured comparator.
    /// 2. Attributes the alignment to the transcript's groups.
    /// 3. Generates feedback for every group.
    /// 4. Builds the report.
    pub async fn mark(self) -> Result<(GradeOutcome, DialogReportResponse), MarkerError> {
        let outcome = self.outcome()?;
        let report = report_outcome(self.transcript_label, &outcome, self.feedback.as_ref()).await?;
        Ok((outcome, report))
    }
}
