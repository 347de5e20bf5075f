//! Cue assembly: from decoded events to the final ordered track.
//!
//! [`CueAssembler`] processes each event as it arrives (strip markup,
//! unwrap dialogue records, sanitise, resolve timing) and keeps the
//! resulting cues. [`CueAssembler::finish`] then sorts them, collapses
//! repeated lines and merges neighbouring cues.
//!
//! # Example
//!
//! ```
//! use subextract::{AssemblyOptions, CueAssembler, RawCue, VecFeed};
//!
//! let feed = VecFeed::new(vec![
//!     RawCue::new(0).with_markup(r"{\i1}Hello{\i0}").with_pts(1_000_000).with_end_display_time(2000),
//!     RawCue::new(0).with_plain("World"),
//! ]);
//!
//! let cues = CueAssembler::assemble(feed, AssemblyOptions::default())?;
//! assert_eq!(cues.len(), 1);
//! assert_eq!((cues[0].start_ms, cues[0].end_ms), (0, 3000));
//! assert_eq!(cues[0].text, "World\nHello");
//! # Ok::<(), subextract::SubtitleError>(())
//! ```

use std::cmp::Ordering;

use crate::cue::{Cue, RawCue, RawFragment};
use crate::dialogue::event_text;
use crate::error::SubtitleError;
use crate::feed::DecoderFeed;
use crate::markup::strip_html_tags;
use crate::options::AssemblyOptions;
use crate::sanitize::sanitize_text;
use crate::timing::resolve_timing_with_default;

/// Collects cues from decoded events and produces the final track.
#[derive(Debug, Clone, Default)]
pub struct CueAssembler {
    options: AssemblyOptions,
    cues: Vec<Cue>,
    events_seen: usize,
    events_dropped: usize,
}

impl CueAssembler {
    /// Create an empty assembler.
    pub fn new(options: AssemblyOptions) -> Self {
        Self {
            options,
            cues: Vec::new(),
            events_seen: 0,
            events_dropped: 0,
        }
    }

    /// Run a whole feed through a fresh assembler and return the track.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the feed.
    pub fn assemble<F: DecoderFeed>(
        feed: F,
        options: AssemblyOptions,
    ) -> Result<Vec<Cue>, SubtitleError> {
        let mut assembler = Self::new(options);
        assembler.consume(feed)?;
        Ok(assembler.finish())
    }

    /// Turn one event into a cue and keep it.
    ///
    /// Returns the new cue, or `None` when the event belongs to a filtered
    /// stream or its text is empty after sanitising.
    pub fn push(&mut self, raw: &RawCue) -> Option<&Cue> {
        self.events_seen += 1;

        if !self.options.accepts_stream(raw.stream_id) {
            return None;
        }

        match build_cue(raw, self.options.default_duration_ms) {
            Some(cue) => {
                self.cues.push(cue);
                self.cues.last()
            }
            None => {
                log::trace!("Dropping empty event from stream {}", raw.stream_id);
                self.events_dropped += 1;
                None
            }
        }
    }

    /// Pull every event from `feed`, including its flush phase.
    ///
    /// Returns the number of cues added.
    ///
    /// # Errors
    ///
    /// Propagates the first error reported by the feed. Cues gathered
    /// before the error stay in the assembler.
    pub fn consume<F: DecoderFeed>(&mut self, mut feed: F) -> Result<usize, SubtitleError> {
        let before = self.cues.len();

        while let Some(event) = feed.next_event()? {
            self.push(&event);
        }

        let flushed = feed.flush()?;
        log::debug!("Feed flush released {} events", flushed.len());
        for event in &flushed {
            self.push(event);
        }

        Ok(self.cues.len() - before)
    }

    /// Number of cues collected so far.
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Returns `true` if no cue has been collected.
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cues collected so far, in arrival order.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Number of events pushed, whether or not they produced a cue.
    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Number of events dropped because their text was empty.
    pub fn events_dropped(&self) -> usize {
        self.events_dropped
    }

    /// Sort, collapse and merge the collected cues.
    pub fn finish(self) -> Vec<Cue> {
        let mut cues = self.cues;
        sort_cues(&mut cues);

        if self.options.collapse_duplicates {
            for cue in &mut cues {
                cue.text = collapse_duplicate_lines(&cue.text);
            }
        }

        let collected = cues.len();
        if self.options.merge_adjacent {
            cues = merge_adjacent_cues(cues, self.options.merge_tolerance_ms);
        }

        log::debug!(
            "Assembled {} cues from {} events ({} empty, {} after merging)",
            collected,
            self.events_seen,
            self.events_dropped,
            cues.len()
        );
        cues
    }
}

/// Build a cue from one event, or `None` if its text ends up empty.
pub fn build_cue(raw: &RawCue, default_duration_ms: i64) -> Option<Cue> {
    let text = cue_text(raw);
    if text.is_empty() {
        return None;
    }

    let (start_ms, end_ms) = resolve_timing_with_default(raw, default_duration_ms);
    Some(Cue {
        start_ms,
        end_ms,
        text,
    })
}

/// The sanitised plain text of an event; fragments become separate lines.
pub fn cue_text(raw: &RawCue) -> String {
    let joined = raw
        .fragments
        .iter()
        .map(|fragment| match fragment {
            RawFragment::Markup(markup) => strip_html_tags(&event_text(markup)),
            RawFragment::Plain(plain) => plain.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    sanitize_text(&joined)
}

/// Order cues by start, then end, then text.
pub fn sort_cues(cues: &mut [Cue]) {
    cues.sort_by(compare_cues);
}

fn compare_cues(a: &Cue, b: &Cue) -> Ordering {
    a.start_ms
        .cmp(&b.start_ms)
        .then(a.end_ms.cmp(&b.end_ms))
        .then_with(|| a.text.cmp(&b.text))
}

/// Drop lines identical to the line kept just before them.
///
/// Only adjacent repeats go; a line may still appear twice if something
/// else sits in between.
pub fn collapse_duplicate_lines(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if kept.last() != Some(&line) {
            kept.push(line);
        }
    }

    kept.join("\n")
        .trim_matches([' ', '\t', '\r', '\n'])
        .to_string()
}

/// Merge each cue into its predecessor when it starts no later than
/// `tolerance_ms` after the predecessor ends.
///
/// Identical texts only extend the end time; different texts are appended
/// as a new line. Expects cues sorted with [`sort_cues`].
pub fn merge_adjacent_cues(cues: Vec<Cue>, tolerance_ms: i64) -> Vec<Cue> {
    let mut merged: Vec<Cue> = Vec::with_capacity(cues.len());

    for cue in cues {
        if let Some(last) = merged.last_mut() {
            if cue.start_ms <= last.end_ms.saturating_add(tolerance_ms) {
                if cue.text != last.text {
                    last.text.push('\n');
                    last.text.push_str(&cue.text);
                }
                last.end_ms = last.end_ms.max(cue.end_ms);
                continue;
            }
        }
        merged.push(cue);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        CueAssembler, collapse_duplicate_lines, cue_text, merge_adjacent_cues, sort_cues,
    };
    use crate::cue::{Cue, RawCue};
    use crate::options::AssemblyOptions;

    #[test]
    fn sort_breaks_ties_on_text() {
        let mut cues = vec![
            Cue::new(1000, 2000, "b"),
            Cue::new(1000, 2000, "a"),
            Cue::new(500, 3000, "z"),
            Cue::new(1000, 1500, "c"),
        ];
        sort_cues(&mut cues);
        let texts: Vec<_> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["z", "c", "a", "b"]);
    }

    #[test]
    fn adjacent_duplicate_lines_collapse() {
        assert_eq!(collapse_duplicate_lines("line1\nline1\nline2"), "line1\nline2");
        assert_eq!(collapse_duplicate_lines("a\nb\na"), "a\nb\na");
        assert_eq!(collapse_duplicate_lines("x\nx\nx"), "x");
    }

    #[test]
    fn close_cues_merge() {
        let cues = vec![Cue::new(1000, 1500, "A"), Cue::new(1700, 2000, "B")];
        let merged = merge_adjacent_cues(cues, 250);
        assert_eq!(merged, vec![Cue::new(1000, 2000, "A\nB")]);
    }

    #[test]
    fn distant_cues_stay_apart() {
        let cues = vec![Cue::new(1000, 1500, "A"), Cue::new(1800, 2000, "B")];
        let merged = merge_adjacent_cues(cues.clone(), 250);
        assert_eq!(merged, cues);
    }

    #[test]
    fn gap_equal_to_tolerance_merges() {
        let cues = vec![Cue::new(0, 1000, "A"), Cue::new(1250, 2000, "B")];
        assert_eq!(merge_adjacent_cues(cues, 250).len(), 1);
    }

    #[test]
    fn identical_texts_only_extend() {
        let cues = vec![
            Cue::new(0, 1000, "Same"),
            Cue::new(900, 2500, "Same"),
            Cue::new(2600, 2700, "Same"),
        ];
        let merged = merge_adjacent_cues(cues, 250);
        assert_eq!(merged, vec![Cue::new(0, 2700, "Same")]);
    }

    #[test]
    fn merge_never_shortens() {
        let cues = vec![Cue::new(0, 5000, "Long"), Cue::new(100, 200, "Short")];
        let merged = merge_adjacent_cues(cues, 250);
        assert_eq!(merged, vec![Cue::new(0, 5000, "Long\nShort")]);
    }

    #[test]
    fn fragments_become_lines() {
        let event = RawCue::new(0)
            .with_markup(r"{\b1}Top{\b0}")
            .with_plain("  Bottom  ");
        assert_eq!(cue_text(&event), "Top\nBottom");
    }

    #[test]
    fn markup_fragments_lose_html_tags() {
        let event = RawCue::new(0).with_markup("<i>Hi</i> &amp; bye");
        assert_eq!(cue_text(&event), "Hi & bye");
    }

    #[test]
    fn empty_events_are_dropped() {
        let mut assembler = CueAssembler::new(AssemblyOptions::default());
        assert!(assembler.push(&RawCue::new(0).with_markup(r"{\p1}m 0 0 l 1 1")).is_none());
        assert!(assembler.push(&RawCue::new(0)).is_none());
        assert!(assembler.push(&RawCue::new(0).with_plain("kept")).is_some());
        assert_eq!(assembler.len(), 1);
        assert_eq!(assembler.events_seen(), 3);
        assert_eq!(assembler.events_dropped(), 2);
    }

    #[test]
    fn stream_filter_skips_other_streams() {
        let options = AssemblyOptions::default().with_stream_filter(Some(3));
        let mut assembler = CueAssembler::new(options);
        assert!(assembler.push(&RawCue::new(2).with_plain("other")).is_none());
        assert!(assembler.push(&RawCue::new(3).with_plain("wanted")).is_some());
        assert_eq!(assembler.events_dropped(), 0);
    }

    #[test]
    fn finish_respects_disabled_passes() {
        let options = AssemblyOptions::default()
            .with_merge_adjacent(false)
            .with_collapse_duplicates(false);
        let mut assembler = CueAssembler::new(options);
        assembler.push(&RawCue::new(0).with_plain("a\na").with_pts(0));
        assembler.push(&RawCue::new(0).with_plain("b").with_pts(100_000));

        let cues = assembler.finish();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "a\na");
    }
}
