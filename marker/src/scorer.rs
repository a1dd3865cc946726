//! # Scorer Module
//!
//! This module attributes the credit of an alignment to the weighted groups of a transcript.
//! The primary function, [`score_groups`], walks the aligned columns once and produces one
//! [`ScoreRecord`] per declared group.

use crate::error::MarkerError;
use crate::types::{AlignmentResult, DEFAULT_GROUP, GroupScores, ParsedExpectation, ScoreRecord};
use std::collections::BTreeMap;
use util::execution_config::MarkingOptions;

#[derive(Debug, Default)]
struct GroupTally {
    total: usize,
    matches: usize,
    expected: String,
    observed: String,
}

/// Assigns a group id to every column of an alignment.
///
/// A column holding an expected character takes the next id of `group_sequence`. A gap in the
/// expected output inherits the id of the column before it, or the default group at the start.
///
/// # Returns
///
/// - `Ok(Vec<char>)`: One id per column.
/// - `Err(MarkerError::TooManyGaps)`: The alignment does not carry exactly one column per
///   expected character.
pub fn project_group_ids(
    alignment: &AlignmentResult,
    group_sequence: &[char],
) -> Result<Vec<char>, MarkerError> {
    let actual = alignment
        .columns
        .iter()
        .filter(|c| c.expected.is_some())
        .count();
    if actual != group_sequence.len() {
        return Err(MarkerError::TooManyGaps {
            expected: group_sequence.len(),
            actual,
        });
    }

    let mut ids = Vec::with_capacity(alignment.columns.len());
    let mut sequence = group_sequence.iter();
    let mut previous = DEFAULT_GROUP;
    for column in &alignment.columns {
        if column.expected.is_some() {
            previous = sequence.next().copied().unwrap_or(DEFAULT_GROUP);
        }
        ids.push(previous);
    }
    Ok(ids)
}

/// Computes a [`ScoreRecord`] for every group declared by `parsed`.
///
/// # Arguments
///
/// * `alignment` - Global alignment of the observed output against `parsed.expected_text`.
/// * `parsed` - The transcript the alignment was computed for.
/// * `options` - Marking options; only `pad_width` is read here.
///
/// # Behavior
///
/// - `score = matches / columns * weight / 100` and `passed` iff every column of the group
///   matched. A gap column never matches.
/// - A group that owns no columns cannot have failed, so it is awarded its full weight.
/// - The default group reports the whole observed and expected output instead of its own
///   characters, right-padded with spaces to `pad_width`. Longer output is left as is.
pub fn score_groups(
    alignment: &AlignmentResult,
    parsed: &ParsedExpectation,
    options: &MarkingOptions,
) -> Result<GroupScores, MarkerError> {
    let ids = project_group_ids(alignment, &parsed.group_sequence)?;

    let mut tallies: BTreeMap<char, GroupTally> = BTreeMap::new();
    for (column, id) in alignment.columns.iter().zip(ids) {
        let tally = tallies.entry(id).or_default();
        tally.total += 1;
        if column.is_match() {
            tally.matches += 1;
        }
        if let Some(c) = column.expected {
            tally.expected.push(c);
        }
        if let Some(c) = column.observed {
            tally.observed.push(c);
        }
    }

    let mut scores = GroupScores::new();
    for (id, name) in &parsed.group_names {
        let weight = parsed.group_weights.get(id).copied().unwrap_or_default();
        let max_score = f64::from(weight) / 100.0;
        let tally = tallies.remove(id).unwrap_or_default();

        let (score, passed) = if tally.total == 0 {
            (max_score, true)
        } else {
            (
                tally.matches as f64 / tally.total as f64 * max_score,
                tally.matches == tally.total,
            )
        };

        let (expected, observed) = if *id == DEFAULT_GROUP {
            (
                pad(&alignment.expected_text(), options.pad_width),
                pad(&alignment.observed_text(), options.pad_width),
            )
        } else {
            (tally.expected, tally.observed)
        };

        scores.insert(ScoreRecord {
            group_name: name.clone(),
            expected,
            observed,
            score,
            max_score,
            passed,
        });
    }

    Ok(scores)
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}
