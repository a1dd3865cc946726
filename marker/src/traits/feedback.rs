//!
//! # Feedback Trait
//!
//! This module defines the [`Feedback`] trait and the [`FeedbackEntry`] struct, which are used to
//! implement pluggable feedback strategies for the marker system.
//!

use crate::error::MarkerError;
use crate::types::GroupScores;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackEntry {
    pub group: String,
    pub message: String,
}

/// A trait for pluggable feedback strategies in the marker system.
///
/// Implement this trait to define how feedback is generated from the per-group scores of one
/// grading run.
///
/// # Returns
/// - `Ok(Vec<FeedbackEntry>)`: One entry per group, in the iteration order of `scores`.
/// - `Err(MarkerError)`: If feedback generation fails.
#[async_trait]
pub trait Feedback: Send + Sync {
    async fn assemble_feedback(
        &self,
        scores: &GroupScores,
    ) -> Result<Vec<FeedbackEntry>, MarkerError>;
}
