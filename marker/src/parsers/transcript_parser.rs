//!
//! Transcript Parser Module
//!
//! This module turns an annotated transcript into a [`ParsedExpectation`]. A transcript is the
//! literal text a program is expected to print, with two kinds of annotation:
//!
//! - `<<text>>` marks a recorded input. The markers are removed (the text itself stays, since a
//!   well-formed transcript echoes what was typed) and `text` is queued as the next input.
//! - A weighted region is written ``` ``text;name;weight`` ```. The markers, name and weight
//!   are removed, leaving `text`, and every character of `text` is attributed to group `name`.
//!
//! Inputs are extracted first so region text never contains input markers.
//!
//! # Error Handling
//!
//! Unterminated or malformed regions fail with [`MarkerError::Parse`] carrying the character
//! offset of the region start. Explicit weights adding up to more than 100 fail with
//! [`MarkerError::WeightOverflow`].

use crate::error::MarkerError;
use crate::traits::parser::Parser;
use crate::types::{DEFAULT_GROUP, DEFAULT_GROUP_NAME, ParsedExpectation};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use util::execution_config::ExecutionConfig;

static INPUT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<<(.*?)>>").expect("input marker pattern is valid"));

pub struct TranscriptParser;

impl<'a> Parser<&'a str, ParsedExpectation> for TranscriptParser {
    fn parse(
        &self,
        input: &'a str,
        config: &ExecutionConfig,
    ) -> Result<ParsedExpectation, MarkerError> {
        let (inputs, without_inputs) = extract_inputs(input);
        let groups = extract_groups(&without_inputs, config.marking.region_delimiter)?;

        Ok(ParsedExpectation {
            inputs,
            expected_text: groups.expected_text,
            group_weights: groups.weights,
            group_names: groups.names,
            group_sequence: groups.sequence,
        })
    }
}

/// Collects every `<<...>>` span in order and replaces it with its inner text.
fn extract_inputs(text: &str) -> (VecDeque<String>, String) {
    let inputs = INPUT_MARKER
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    let stripped = INPUT_MARKER.replace_all(text, "$1").into_owned();
    (inputs, stripped)
}

struct ExtractedGroups {
    weights: BTreeMap<char, u32>,
    names: BTreeMap<char, String>,
    sequence: Vec<char>,
    expected_text: String,
}

struct Region<'a> {
    text: &'a str,
    name: &'a str,
    weight: u32,
}

fn extract_groups(text: &str, delimiter: char) -> Result<ExtractedGroups, MarkerError> {
    let marker: String = [delimiter, delimiter].iter().collect();

    let mut weights = BTreeMap::from([(DEFAULT_GROUP, 0u32)]);
    let mut names = BTreeMap::from([(DEFAULT_GROUP, DEFAULT_GROUP_NAME.to_string())]);
    let mut ids_by_name: HashMap<String, char> = HashMap::new();
    let mut next_id = 'a';

    let mut sequence = Vec::with_capacity(text.len());
    let mut expected_text = String::with_capacity(text.len());
    let mut rest = text;
    let mut offset = 0usize;

    while let Some(c) = rest.chars().next() {
        if !rest.starts_with(&marker) {
            sequence.push(DEFAULT_GROUP);
            expected_text.push(c);
            offset += 1;
            rest = &rest[c.len_utf8()..];
            continue;
        }

        let body = &rest[marker.len()..];
        let close = body.find(&marker).ok_or_else(|| MarkerError::Parse {
            offset,
            message: format!("unterminated region, no closing {marker}"),
        })?;
        let region =
            parse_region(&body[..close]).map_err(|message| MarkerError::Parse { offset, message })?;

        let id = match ids_by_name.get(region.name) {
            Some(&id) => {
                let first = weights.get(&id).copied().unwrap_or_default();
                if first != region.weight {
                    return Err(MarkerError::ConflictingWeight {
                        group: region.name.to_string(),
                        first,
                        second: region.weight,
                    });
                }
                id
            }
            None => {
                let id = next_id;
                next_id = char::from_u32(id as u32 + 1).ok_or_else(|| MarkerError::Parse {
                    offset,
                    message: "too many weighted regions".to_string(),
                })?;
                ids_by_name.insert(region.name.to_string(), id);
                names.insert(id, region.name.to_string());
                weights.insert(id, region.weight);
                id
            }
        };

        sequence.extend(std::iter::repeat_n(id, region.text.chars().count()));
        expected_text.push_str(region.text);

        let consumed = marker.len() * 2 + close;
        offset += rest[..consumed].chars().count();
        rest = &rest[consumed..];
    }

    let total: u32 = weights.values().sum();
    if total > 100 {
        return Err(MarkerError::WeightOverflow(total));
    }
    weights.insert(DEFAULT_GROUP, 100 - total);

    Ok(ExtractedGroups {
        weights,
        names,
        sequence,
        expected_text,
    })
}

/// Splits `text;name;weight`. The text ends at the first `;`, the weight starts after the last.
fn parse_region(inner: &str) -> Result<Region<'_>, String> {
    let (text, rest) = inner
        .split_once(';')
        .ok_or_else(|| format!("expected `text;name;weight` in region, found {inner:?}"))?;
    let (name, weight) = rest
        .rsplit_once(';')
        .ok_or_else(|| format!("expected `text;name;weight` in region, found {inner:?}"))?;

    if name.is_empty() {
        return Err("region group name is empty".to_string());
    }
    if weight.is_empty() || !weight.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "region weight must be a non-negative integer, found {weight:?}"
        ));
    }
    let weight: u32 = weight
        .parse()
        .map_err(|_| format!("region weight {weight} is out of range"))?;
    if weight > 100 {
        return Err(format!("region weight {weight} exceeds 100"));
    }

    Ok(Region { text, name, weight })
}
