//! # Feedback Strategies Module
//!
//! This module provides pluggable feedback strategies for the marker system.
//! Each strategy implements the [`Feedback`](crate::traits::feedback::Feedback) trait and produces
//! a list of [`FeedbackEntry`](crate::traits::feedback::FeedbackEntry)s from the per-group scores
//! of one grading run.
//!
//! ## Available Strategies
//!
//! - [`auto_feedback`]: Summarises how much of each group matched and where it first diverged.

pub mod auto_feedback;
