//! Error types for the `subextract` crate.
//!
//! The cue pipeline itself never fails: markup, dialogue records, entities
//! and timing all degrade to a best-effort value. [`SubtitleError`] covers
//! the edges around it, namely opening and decoding media, feeding events
//! and writing the finished track.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all fallible `subextract` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubtitleError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the feed.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a (selectable) subtitle stream.
    #[error("No subtitle stream found in file")]
    NoSubtitleStream,

    /// Subtitle data could not be decoded.
    #[error("Failed to decode subtitle: {0}")]
    SubtitleDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// The feed was exhausted without producing a single non-empty cue.
    #[error("No cues extracted")]
    NoCues,

    /// A caller-supplied option could not be interpreted.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for SubtitleError {
    fn from(error: ffmpeg_next::Error) -> Self {
        SubtitleError::FfmpegError(error.to_string())
    }
}
