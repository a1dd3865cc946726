//! # Dialog Report Module
//!
//! This module defines the data structures and response envelope for returning the result of
//! grading one transcript. It provides a standardized, serializable format for per-group
//! records, the overall mark and feedback.
//!
//! ## Overview
//!
//! The main types are:
//! - [`DialogReport`]: All grading data for one run.
//! - [`DialogReportResponse`]: A response envelope that wraps a [`DialogReport`] with success and
//!   message fields.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Grading complete.",
//!   "data": {
//!     "created_at": "2025-01-01T00:00:00+00:00",
//!     "transcript": "tests/echo.txt",
//!     "passed": false,
//!     "mark": { "earned": 0.85, "total": 1.0 },
//!     "groups": [
//!       {
//!         "group_name": "answer", "expected": "7", "observed": "8",
//!         "score": 0.0, "max_score": 0.15, "passed": false
//!       },
//!       ...
//!     ],
//!     "feedback": [
//!       { "group": "answer", "message": "..." },
//!       ...
//!     ]
//!   }
//! }
//! ```

use crate::traits::feedback::FeedbackEntry;
use crate::types::{GroupScores, ScoreRecord};
use chrono::Utc;
use serde::Serialize;

/// Round a float to two decimal places.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub earned: f64,
    pub total: f64,
}

/// Final report for one graded transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogReport {
    /// RFC 3339 timestamp of when the report was generated.
    pub created_at: String,
    /// Path of the transcript that was graded.
    pub transcript: String,
    /// True iff every group passed.
    pub passed: bool,
    /// Sum over all groups, rounded to two decimals.
    pub mark: Score,
    pub groups: Vec<ScoreRecord>,
    pub feedback: Vec<FeedbackEntry>,
}

impl DialogReport {
    pub fn new(
        transcript: impl Into<String>,
        scores: &GroupScores,
        feedback: Vec<FeedbackEntry>,
    ) -> Self {
        Self {
            created_at: Utc::now().to_rfc3339(),
            transcript: transcript.into(),
            passed: scores.all_passed(),
            mark: Score {
                earned: round2(scores.total_score()),
                total: round2(scores.total_max_score()),
            },
            groups: scores.iter().cloned().collect(),
            feedback,
        }
    }
}

/// The response envelope for grading results.
///
/// - `success`: Always true for a completed grading run, even if groups failed.
/// - `message`: A human-readable message (e.g., "Grading complete.").
/// - `data`: The [`DialogReport`] containing all grading details.
#[derive(Debug, Clone, Serialize)]
pub struct DialogReportResponse {
    success: bool,
    message: String,
    data: DialogReport,
}

impl DialogReportResponse {
    pub fn data(&self) -> &DialogReport {
        &self.data
    }
}

impl From<DialogReport> for DialogReportResponse {
    fn from(report: DialogReport) -> Self {
        DialogReportResponse {
            success: true,
            message: "Grading complete.".to_string(),
            data: report,
        }
    }
}
