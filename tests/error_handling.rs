//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned when media
//! cannot be opened or holds nothing to extract.

#![cfg(feature = "ffmpeg")]

use subextract::{FfmpegFeed, SubtitleError};

#[test]
fn open_nonexistent_file() {
    let result = FfmpegFeed::open("this_file_does_not_exist.mkv");

    let error = result.err().expect("Opening a missing file should fail");
    assert!(matches!(error, SubtitleError::FileOpen { .. }));
    assert!(
        error.to_string().contains("Failed to open media file"),
        "Error message should mention file open failure: {error}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mkv");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = FfmpegFeed::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn error_messages() {
    assert_eq!(SubtitleError::NoCues.to_string(), "No cues extracted");
    assert_eq!(
        SubtitleError::NoSubtitleStream.to_string(),
        "No subtitle stream found in file"
    );
}
