//! # Parsers
//!
//! This module is responsible for turning annotated transcripts into the structures the rest of
//! the marker works with.
//!
//! The parsers implemented in this module adhere to the [`Parser`](crate::traits::parser::Parser)
//! trait, so the marking job can hold them behind a common interface.
//!
//! The available parsers are:
//! - [`transcript_parser`]: Extracts recorded inputs and weighted regions from a transcript.

pub mod transcript_parser;
