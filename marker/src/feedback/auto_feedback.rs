//! # AutoFeedback Strategy
//!
//! This module provides the `AutoFeedback` strategy for the marker system.
//! It implements the [`Feedback`] trait to generate template-based feedback for each group of a
//! graded transcript.
//!
//! ## Overview
//!
//! - A group that passed gets `All output matched`.
//! - Any other group gets the share of its credit that was earned, followed by the first line
//!   where the expected and observed text differ.

use crate::error::MarkerError;
use crate::traits::feedback::{Feedback, FeedbackEntry};
use crate::types::{GroupScores, ScoreRecord};
use async_trait::async_trait;

/// Automatic feedback strategy: one template-based entry per group.
#[derive(Debug)]
pub struct AutoFeedback;

#[async_trait]
impl Feedback for AutoFeedback {
    async fn assemble_feedback(
        &self,
        scores: &GroupScores,
    ) -> Result<Vec<FeedbackEntry>, MarkerError> {
        Ok(scores
            .iter()
            .map(|record| FeedbackEntry {
                group: record.group_name.clone(),
                message: summarize(record),
            })
            .collect())
    }
}

fn summarize(record: &ScoreRecord) -> String {
    if record.passed {
        return "All output matched".to_string();
    }

    let mut parts = Vec::new();
    if record.max_score > 0.0 {
        let percent = (record.score / record.max_score * 100.0).round();
        parts.push(format!("Matched {percent}% of this group"));
    }
    let expected = record.expected.trim_end_matches(' ');
    let observed = record.observed.trim_end_matches(' ');
    if let Some((line, expected, observed)) = first_difference(expected, observed) {
        parts.push(format!(
            "line {line}: expected {expected:?}, got {observed:?}"
        ));
    }
    parts.join("; ")
}

/// 1-based number and contents of the first line that differs, or `None` if all lines agree.
fn first_difference<'a>(expected: &'a str, observed: &'a str) -> Option<(usize, &'a str, &'a str)> {
    let mut expected_lines = expected.lines();
    let mut observed_lines = observed.lines();
    let mut number = 0;
    loop {
        number += 1;
        match (expected_lines.next(), observed_lines.next()) {
            (None, None) => return None,
            (e, o) if e == o => continue,
            (e, o) => return Some((number, e.unwrap_or(""), o.unwrap_or(""))),
        }
    }
}
