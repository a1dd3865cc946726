//! # Types Module
//!
//! This module defines the core data structures shared by the transcript parser, the alignment
//! engine and the group scorer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Group id of the implicit region covering everything outside an explicit region.
pub const DEFAULT_GROUP: char = '.';

/// Name under which the default group is reported.
pub const DEFAULT_GROUP_NAME: &str = "everything-else";

/// Name of the single record produced when the target could not even be prepared.
pub const LOAD_TESTS_GROUP_NAME: &str = "load-tests";

/// Everything a transcript says about the expected interaction.
///
/// Built once per grading run and never mutated afterwards; the session driver takes its own
/// copy of `inputs` to consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExpectation {
    /// Recorded inputs, in the order they appear in the transcript.
    pub inputs: VecDeque<String>,
    /// The transcript with every annotation stripped.
    pub expected_text: String,
    /// Weight (0..=100) of each group, the default group included. Sums to exactly 100.
    pub group_weights: BTreeMap<char, u32>,
    /// Human readable name of each group.
    pub group_names: BTreeMap<char, String>,
    /// One group id per character of `expected_text`.
    pub group_sequence: Vec<char>,
}

impl ParsedExpectation {
    pub fn default_weight(&self) -> u32 {
        self.group_weights
            .get(&DEFAULT_GROUP)
            .copied()
            .unwrap_or_default()
    }

    pub fn group_id(&self, name: &str) -> Option<char> {
        self.group_names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id)
    }

    pub fn weight_of(&self, name: &str) -> Option<u32> {
        self.group_id(name)
            .and_then(|id| self.group_weights.get(&id).copied())
    }
}

/// Result for one weighted group of the expected output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub group_name: String,
    /// Expected text attributed to this group (the whole padded output for the default group).
    pub expected: String,
    /// Observed text aligned against this group (the whole padded output for the default group).
    pub observed: String,
    /// Partial credit in `[0, max_score]`.
    pub score: f64,
    /// `weight / 100`.
    pub max_score: f64,
    /// True iff every aligned character of the group matched.
    pub passed: bool,
}

/// Score records keyed by group name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupScores(BTreeMap<String, ScoreRecord>);

impl GroupScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: ScoreRecord) {
        self.0.insert(record.group_name.clone(), record);
    }

    pub fn get(&self, group_name: &str) -> Option<&ScoreRecord> {
        self.0.get(group_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.0.values()
    }

    pub fn all_passed(&self) -> bool {
        self.0.values().all(|r| r.passed)
    }

    pub fn total_score(&self) -> f64 {
        self.0.values().map(|r| r.score).sum()
    }

    pub fn total_max_score(&self) -> f64 {
        self.0.values().map(|r| r.max_score).sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, ScoreRecord> {
        self.0
    }
}

impl FromIterator<ScoreRecord> for GroupScores {
    fn from_iter<I: IntoIterator<Item = ScoreRecord>>(iter: I) -> Self {
        let mut scores = GroupScores::new();
        for record in iter {
            scores.insert(record);
        }
        scores
    }
}

/// Outcome of grading one transcript.
///
/// Both variants carry the full per-group breakdown; the variant only says whether every group
/// passed, so callers that want partial credit never have to dig it out of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeOutcome {
    Passed(GroupScores),
    PartialCredit(GroupScores),
}

impl GradeOutcome {
    pub fn from_scores(scores: GroupScores) -> Self {
        if scores.all_passed() {
            GradeOutcome::Passed(scores)
        } else {
            GradeOutcome::PartialCredit(scores)
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, GradeOutcome::Passed(_))
    }

    pub fn scores(&self) -> &GroupScores {
        match self {
            GradeOutcome::Passed(s) | GradeOutcome::PartialCredit(s) => s,
        }
    }

    pub fn into_scores(self) -> GroupScores {
        match self {
            GradeOutcome::Passed(s) | GradeOutcome::PartialCredit(s) => s,
        }
    }
}

/// One column of an alignment. `None` marks a gap on that side; a column never has two gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedColumn {
    pub observed: Option<char>,
    pub expected: Option<char>,
}

impl AlignedColumn {
    pub fn is_match(&self) -> bool {
        matches!((self.observed, self.expected), (Some(o), Some(e)) if o == e)
    }
}

/// A global alignment of observed against expected output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub score: i64,
    pub columns: Vec<AlignedColumn>,
    pub gap_marker: char,
}

impl AlignmentResult {
    /// Observed output with the gap marker at every gap column.
    pub fn observed_aligned(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.observed.unwrap_or(self.gap_marker))
            .collect()
    }

    /// Expected output with the gap marker at every gap column.
    pub fn expected_aligned(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.expected.unwrap_or(self.gap_marker))
            .collect()
    }

    /// The observed output with gaps removed.
    pub fn observed_text(&self) -> String {
        self.columns.iter().filter_map(|c| c.observed).collect()
    }

    /// The expected output with gaps removed.
    pub fn expected_text(&self) -> String {
        self.columns.iter().filter_map(|c| c.expected).collect()
    }

    pub fn has_gaps(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.observed.is_none() || c.expected.is_none())
    }
}
