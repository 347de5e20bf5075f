//! Subtitle event and cue types.
//!
//! A [`RawCue`] is one decoded subtitle event as delivered by a
//! [`DecoderFeed`](crate::DecoderFeed): text fragments plus whatever timing
//! the decoder managed to provide. A [`Cue`] is the finished, plain-text
//! unit with a definite `[start, end)` interval in milliseconds.

use crate::timing::TimeBase;

/// One piece of subtitle payload from a decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFragment {
    /// ASS/SSA event text: may contain override blocks, escapes, tags and
    /// a whole `Dialogue:` record.
    Markup(String),
    /// Already plain text, used as-is apart from entity decoding.
    Plain(String),
}

/// One decoded subtitle event.
///
/// Timing fields are all optional; [`resolve_timing`](crate::resolve_timing)
/// turns whatever is present into a definite interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCue {
    /// The stream this event was decoded from.
    pub stream_id: usize,
    /// Text fragments (one per subtitle rectangle), in display order.
    pub fragments: Vec<RawFragment>,
    /// Presentation timestamp of the event, in `time_base` units.
    pub pts: Option<i64>,
    /// Presentation timestamp of the packet that carried the event.
    pub packet_pts: Option<i64>,
    /// Time base of `pts`, `packet_pts` and `packet_duration`.
    pub time_base: Option<TimeBase>,
    /// Duration of the carrying packet, in `time_base` units.
    pub packet_duration: Option<i64>,
    /// On-screen duration in milliseconds, relative to the start.
    pub end_display_time: Option<i64>,
}

impl RawCue {
    /// Create an empty event for the given stream.
    pub fn new(stream_id: usize) -> Self {
        Self {
            stream_id,
            ..Self::default()
        }
    }

    /// Append a markup fragment.
    #[must_use]
    pub fn with_markup(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(RawFragment::Markup(text.into()));
        self
    }

    /// Append a plain-text fragment.
    #[must_use]
    pub fn with_plain(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(RawFragment::Plain(text.into()));
        self
    }

    /// Set the event presentation timestamp.
    #[must_use]
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Set the packet presentation timestamp.
    #[must_use]
    pub fn with_packet_pts(mut self, pts: i64) -> Self {
        self.packet_pts = Some(pts);
        self
    }

    /// Set the time base shared by all timestamp fields.
    #[must_use]
    pub fn with_time_base(mut self, numerator: i32, denominator: i32) -> Self {
        self.time_base = Some(TimeBase::new(numerator, denominator));
        self
    }

    /// Set the packet duration.
    #[must_use]
    pub fn with_packet_duration(mut self, duration: i64) -> Self {
        self.packet_duration = Some(duration);
        self
    }

    /// Set the relative on-screen duration in milliseconds.
    #[must_use]
    pub fn with_end_display_time(mut self, milliseconds: i64) -> Self {
        self.end_display_time = Some(milliseconds);
        self
    }
}

/// A timed, plain-text subtitle unit.
///
/// `end_ms >= start_ms >= 0` always holds for cues produced by the
/// [`CueAssembler`](crate::CueAssembler). The text has no markup and no
/// leading or trailing blank lines, but may span several lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cue {
    /// Start of the display interval, in milliseconds.
    pub start_ms: i64,
    /// End of the display interval (exclusive), in milliseconds.
    pub end_ms: i64,
    /// The cue text, lines separated by `\n`.
    pub text: String,
}

impl Cue {
    /// Create a cue.
    pub fn new(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }
}
