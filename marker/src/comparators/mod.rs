//! # Comparators
//!
//! This module provides the strategies used to line up a program's observed output against the
//! expected output of a transcript.
//!
//! All comparators in this module adhere to the
//! [`OutputComparator`](crate::traits::comparator::OutputComparator) trait, which defines a
//! common interface for alignment. This allows the marking job to swap strategies freely.
//!
//! The available comparators are:
//! - [`affine_gap`]: Global character alignment with affine gap penalties.

pub mod affine_gap;
