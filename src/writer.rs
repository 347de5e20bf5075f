//! Serialising a finished track.
//!
//! SubRip output follows the usual layout: a 1-based index line, an
//! `HH:MM:SS,mmm --> HH:MM:SS,mmm` line, the text, and a blank separator
//! line. WebVTT and a raw one-line-per-cue dump are also available.
//!
//! # Example
//!
//! ```
//! use subextract::{Cue, SubtitleFormat, format_cues};
//!
//! let cues = vec![Cue::new(1_000, 3_500, "Hello")];
//! assert_eq!(
//!     format_cues(&cues, SubtitleFormat::Srt),
//!     "1\n00:00:01,000 --> 00:00:03,500\nHello\n\n",
//! );
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cue::Cue;
use crate::error::SubtitleError;
use crate::options::WriterOptions;

/// UTF-8 byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output format for a subtitle track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtitleFormat {
    /// SubRip Text (.srt).
    #[default]
    Srt,
    /// Web Video Text Tracks (.vtt).
    WebVtt,
    /// Raw text, one entry per cue with timestamps.
    Raw,
}

impl SubtitleFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::WebVtt => "vtt",
            SubtitleFormat::Raw => "txt",
        }
    }
}

impl Display for SubtitleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubtitleFormat::Srt => write!(f, "SRT"),
            SubtitleFormat::WebVtt => write!(f, "WebVTT"),
            SubtitleFormat::Raw => write!(f, "Raw"),
        }
    }
}

/// Format cues into a string in the given format.
pub fn format_cues(cues: &[Cue], format: SubtitleFormat) -> String {
    let mut output = String::new();

    match format {
        SubtitleFormat::Srt => {
            for (i, cue) in cues.iter().enumerate() {
                output.push_str(&format!(
                    "{}\n{} --> {}\n{}\n\n",
                    i + 1,
                    format_srt_timestamp(cue.start_ms),
                    format_srt_timestamp(cue.end_ms),
                    cue.text,
                ));
            }
        }
        SubtitleFormat::WebVtt => {
            output.push_str("WEBVTT\n\n");
            for (i, cue) in cues.iter().enumerate() {
                output.push_str(&format!(
                    "{}\n{} --> {}\n{}\n\n",
                    i + 1,
                    format_vtt_timestamp(cue.start_ms),
                    format_vtt_timestamp(cue.end_ms),
                    cue.text,
                ));
            }
        }
        SubtitleFormat::Raw => {
            for cue in cues {
                output.push_str(&format!(
                    "[{} --> {}] {}\n",
                    format_vtt_timestamp(cue.start_ms),
                    format_vtt_timestamp(cue.end_ms),
                    cue.text,
                ));
            }
        }
    }

    output
}

/// Write cues to any [`Write`] sink.
///
/// # Errors
///
/// Returns [`SubtitleError::IoError`] if the sink fails.
pub fn write_cues<W: Write>(
    mut sink: W,
    cues: &[Cue],
    format: SubtitleFormat,
    options: WriterOptions,
) -> Result<(), SubtitleError> {
    if options.with_bom {
        sink.write_all(UTF8_BOM)?;
    }
    sink.write_all(format_cues(cues, format).as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Write cues to a file, replacing it if it exists.
///
/// # Errors
///
/// Returns [`SubtitleError::IoError`] if the file cannot be created or
/// written.
pub fn save_cues<P: AsRef<Path>>(
    path: P,
    cues: &[Cue],
    format: SubtitleFormat,
    options: WriterOptions,
) -> Result<(), SubtitleError> {
    let path = path.as_ref();
    log::debug!("Writing {} cues to {} ({})", cues.len(), path.display(), format);
    let file = File::create(path)?;
    write_cues(BufWriter::new(file), cues, format, options)
}

/// Default output path for a media file: same name, subtitle extension.
///
/// `movie.mkv` becomes `movie.srt`; a name without extension gains one.
pub fn output_path_for<P: AsRef<Path>>(input: P, format: SubtitleFormat) -> PathBuf {
    input.as_ref().with_extension(format.extension())
}

/// Format milliseconds as a SubRip timestamp (`HH:MM:SS,mmm`).
///
/// Hours are zero-padded to two digits but not capped. Negative values are
/// clamped to zero.
pub fn format_srt_timestamp(milliseconds: i64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(milliseconds);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format milliseconds as a WebVTT timestamp (`HH:MM:SS.mmm`).
pub fn format_vtt_timestamp(milliseconds: i64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(milliseconds);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn split_millis(milliseconds: i64) -> (i64, i64, i64, i64) {
    let total = milliseconds.max(0);
    (
        total / 3_600_000,
        total % 3_600_000 / 60_000,
        total % 60_000 / 1000,
        total % 1000,
    )
}
