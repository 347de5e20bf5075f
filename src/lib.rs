//! # subextract
//!
//! Turn decoded subtitle events into a clean, time-ordered plain-text
//! subtitle track.
//!
//! Text subtitles come out of decoders as ASS/SSA event text: override
//! blocks, drawing commands, escapes, sometimes whole `Dialogue:` records,
//! and timing that is only partly filled in. `subextract` strips all of
//! that down to plain text with a definite `[start, end)` interval per
//! cue, then orders, de-duplicates and merges the cues into a track ready
//! to be written as SubRip.
//!
//! ## Quick Start
//!
//! ```
//! use subextract::{AssemblyOptions, CueAssembler, RawCue, SubtitleFormat, VecFeed, format_cues};
//!
//! let feed = VecFeed::new(vec![
//!     RawCue::new(0)
//!         .with_markup(r"Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,{\i1}Hello{\i0}")
//!         .with_pts(1_000)
//!         .with_time_base(1, 1000)
//!         .with_end_display_time(2000),
//! ]);
//!
//! let cues = CueAssembler::assemble(feed, AssemblyOptions::default())?;
//! assert_eq!(
//!     format_cues(&cues, SubtitleFormat::Srt),
//!     "1\n00:00:01,000 --> 00:00:03,000\nHello\n\n",
//! );
//! # Ok::<(), subextract::SubtitleError>(())
//! ```
//!
//! ## Pipeline
//!
//! For every event pulled from a [`DecoderFeed`]:
//!
//! 1. [`strip_markup`] removes override blocks and drawing spans;
//! 2. [`extract_dialogue_text`] unwraps a `Dialogue:` record if present;
//! 3. [`sanitize_text`] decodes entities and normalises whitespace;
//! 4. [`resolve_timing`] settles the display interval.
//!
//! Once the feed is exhausted, [`CueAssembler::finish`] sorts the cues,
//! collapses repeated lines and merges cues that touch or overlap.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` | [`FfmpegFeed`] decoding subtitle streams from media files |
//! | `cli` | The `subextract` command-line tool (implies `ffmpeg`) |

pub mod assembler;
pub mod cue;
pub mod dialogue;
pub mod error;
pub mod feed;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod markup;
pub mod options;
pub mod sanitize;
pub mod selection;
pub mod timing;
pub mod writer;

pub use assembler::{
    CueAssembler, build_cue, collapse_duplicate_lines, cue_text, merge_adjacent_cues, sort_cues,
};
pub use cue::{Cue, RawCue, RawFragment};
pub use dialogue::{event_text, extract_dialogue_text};
pub use error::SubtitleError;
pub use feed::{DecoderFeed, VecFeed, drain_feed};
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{FfmpegFeed, FfmpegLogLevel, set_ffmpeg_log_level};
pub use markup::{strip_html_tags, strip_markup};
pub use options::{AssemblyOptions, DEFAULT_MERGE_TOLERANCE_MS, WriterOptions};
pub use sanitize::{sanitize_text, unescape_entities};
pub use selection::{
    LanguageSelector, StreamSelector, SubtitleStreamInfo, normalize_language, select_streams,
    system_language,
};
pub use timing::{
    DEFAULT_DURATION_MS, TimeBase, rescale_to_millis, resolve_timing, resolve_timing_with_default,
};
pub use writer::{
    SubtitleFormat, format_cues, format_srt_timestamp, format_vtt_timestamp, output_path_for,
    save_cues, write_cues,
};
