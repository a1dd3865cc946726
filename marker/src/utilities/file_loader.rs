//!
//! File Loader Utility
//!
//! This module provides utilities for loading and validating transcript files before they are
//! parsed.
//!
//! # Functionality
//!
//! - Checks the existence and type of the transcript file.
//! - Enforces a maximum transcript size.
//! - Reads the transcript as UTF-8 text.
//!
//! # Error Handling
//!
//! Returns [`MarkerError::IoError`] with a general message; the specific cause (including the
//! path) is logged at error level.

use crate::error::MarkerError;
use std::fs;
use std::path::Path;
use tracing::error;

/// Maximum allowed size for a transcript.
pub const MAX_TRANSCRIPT_SIZE: u64 = 2 * 1024 * 1024; // 2MB

/// Checks that a file exists, is a file, and (optionally) does not exceed a maximum size.
///
/// # Errors
///
/// Returns [`MarkerError::IoError`] if the file is missing, not a file, unreadable, or too large.
fn check_file(path: &Path, max_size: Option<u64>) -> Result<(), MarkerError> {
    if !path.exists() {
        let specific_error = format!("File not found: {}", path.display());
        error!("{}", specific_error);
        return Err(MarkerError::IoError("File not found".to_string()));
    }

    if !path.is_file() {
        let specific_error = format!("Not a file: {}", path.display());
        error!("{}", specific_error);
        return Err(MarkerError::IoError("Invalid file type".to_string()));
    }

    let metadata = fs::metadata(path).map_err(|e| {
        let specific_error = format!("File unreadable: {} - {}", path.display(), e);
        error!("{}", specific_error);
        MarkerError::IoError("File unreadable".to_string())
    })?;

    if let Some(max) = max_size {
        if metadata.len() > max {
            let specific_error = format!(
                "File too large: {} ({} bytes, max {} bytes)",
                path.display(),
                metadata.len(),
                max
            );
            error!("{}", specific_error);
            return Err(MarkerError::IoError("File too large".to_string()));
        }
    }

    Ok(())
}

/// Loads a transcript file as text.
///
/// # Errors
///
/// Returns [`MarkerError::IoError`] if the file is missing, not a regular file, larger than
/// [`MAX_TRANSCRIPT_SIZE`], or not valid UTF-8.
pub fn load_transcript(path: &Path) -> Result<String, MarkerError> {
    check_file(path, Some(MAX_TRANSCRIPT_SIZE))?;

    fs::read_to_string(path).map_err(|e| {
        let specific_error = format!("Failed to read transcript {}: {}", path.display(), e);
        error!("{}", specific_error);
        MarkerError::IoError("Failed to read transcript".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_loads_fixture() {
        let path = PathBuf::from("src/test_files/dialog/echo.txt");
        let text = load_transcript(&path).unwrap();
        assert_eq!(text, "Enter: <<7>>\nYou said 7\n");
    }

    #[test]
    fn test_missing_file() {
        let path = PathBuf::from("src/test_files/dialog/does_not_exist.txt");
        match load_transcript(&path) {
            Err(MarkerError::IoError(msg)) => assert_eq!(msg, "File not found"),
            other => panic!("Expected IoError for missing file, got: {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_rejected() {
        let path = PathBuf::from("src/test_files/dialog");
        match load_transcript(&path) {
            Err(MarkerError::IoError(msg)) => assert_eq!(msg, "Invalid file type"),
            other => panic!("Expected IoError for directory, got: {:?}", other),
        }
    }

    #[test]
    fn test_too_large() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.txt");
        fs::write(&path, vec![b'x'; MAX_TRANSCRIPT_SIZE as usize + 1]).unwrap();
        match load_transcript(&path) {
            Err(MarkerError::IoError(msg)) => assert_eq!(msg, "File too large"),
            other => panic!("Expected IoError for large file, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.txt");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        match load_transcript(&path) {
            Err(MarkerError::IoError(msg)) => assert_eq!(msg, "Failed to read transcript"),
            other => panic!("Expected IoError for invalid UTF-8, got: {:?}", other),
        }
    }
}
