//! Pipeline and writer configuration.
//!
//! [`AssemblyOptions`] tunes how the [`CueAssembler`](crate::CueAssembler)
//! turns events into cues; [`WriterOptions`] tunes file output. The
//! defaults reproduce the standard pipeline exactly.
//!
//! # Example
//!
//! ```
//! use subextract::AssemblyOptions;
//!
//! let options = AssemblyOptions::new()
//!     .with_merge_tolerance_ms(100)
//!     .with_stream_filter(Some(2));
//! assert_eq!(options.merge_tolerance_ms, 100);
//! ```

use crate::timing::DEFAULT_DURATION_MS;

/// Gap (or overlap) in milliseconds within which neighbouring cues merge.
pub const DEFAULT_MERGE_TOLERANCE_MS: i64 = 250;

/// Settings for cue assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Cues starting at most this long after the previous cue ends are
    /// merged into it. Defaults to 250.
    pub merge_tolerance_ms: i64,
    /// Duration given to events without timing, and to repaired events.
    /// Defaults to 2000.
    pub default_duration_ms: i64,
    /// Whether neighbouring cues are merged. Defaults to `true`.
    pub merge_adjacent: bool,
    /// Whether repeated adjacent lines inside a cue are collapsed.
    /// Defaults to `true`.
    pub collapse_duplicates: bool,
    /// Only accept events from this stream. `None` accepts every stream.
    pub stream_filter: Option<usize>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AssemblyOptions {
    /// Create options with the default settings.
    pub fn new() -> Self {
        Self {
            merge_tolerance_ms: DEFAULT_MERGE_TOLERANCE_MS,
            default_duration_ms: DEFAULT_DURATION_MS,
            merge_adjacent: true,
            collapse_duplicates: true,
            stream_filter: None,
        }
    }

    /// Set the merge tolerance. Negative values are clamped to zero.
    #[must_use]
    pub fn with_merge_tolerance_ms(mut self, tolerance: i64) -> Self {
        self.merge_tolerance_ms = tolerance.max(0);
        self
    }

    /// Set the fallback display duration. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_default_duration_ms(mut self, duration: i64) -> Self {
        self.default_duration_ms = duration.max(1);
        self
    }

    /// Enable or disable merging of neighbouring cues.
    #[must_use]
    pub fn with_merge_adjacent(mut self, merge: bool) -> Self {
        self.merge_adjacent = merge;
        self
    }

    /// Enable or disable collapsing of repeated adjacent lines.
    #[must_use]
    pub fn with_collapse_duplicates(mut self, collapse: bool) -> Self {
        self.collapse_duplicates = collapse;
        self
    }

    /// Restrict assembly to a single stream.
    #[must_use]
    pub fn with_stream_filter(mut self, stream_id: Option<usize>) -> Self {
        self.stream_filter = stream_id;
        self
    }

    /// Returns `true` if events from `stream_id` should be assembled.
    pub(crate) fn accepts_stream(&self, stream_id: usize) -> bool {
        self.stream_filter.is_none_or(|wanted| wanted == stream_id)
    }
}

/// Settings for writing a finished track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterOptions {
    /// Prefix the output with a UTF-8 byte order mark.
    pub with_bom: bool,
}

impl WriterOptions {
    /// Create writer options (no BOM).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the UTF-8 byte order mark.
    #[must_use]
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.with_bom = bom;
        self
    }
}
