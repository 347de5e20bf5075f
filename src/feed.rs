//! The decoder feed interface.
//!
//! A [`DecoderFeed`] is whatever produces decoded subtitle events: an
//! FFmpeg demuxer/decoder pair, a test fixture, a network receiver. The
//! assembler pulls events one at a time with [`DecoderFeed::next_event`]
//! until the feed is exhausted, then calls [`DecoderFeed::flush`] once to
//! drain anything the decoding layer still holds.
//!
//! [`VecFeed`] is an in-memory feed for tests and for callers that already
//! have their events at hand.

use std::collections::VecDeque;

use crate::cue::RawCue;
use crate::error::SubtitleError;

/// A source of decoded subtitle events.
pub trait DecoderFeed {
    /// Fetch the next event, or `Ok(None)` once the feed is exhausted.
    ///
    /// May block; waiting for input is the feed's business.
    fn next_event(&mut self) -> Result<Option<RawCue>, SubtitleError>;

    /// Drain events buffered inside the decoding layer.
    ///
    /// Called once, after [`next_event`](DecoderFeed::next_event) returned
    /// `Ok(None)`. The default implementation has nothing buffered.
    fn flush(&mut self) -> Result<Vec<RawCue>, SubtitleError> {
        Ok(Vec::new())
    }
}

impl<F: DecoderFeed + ?Sized> DecoderFeed for &mut F {
    fn next_event(&mut self) -> Result<Option<RawCue>, SubtitleError> {
        (**self).next_event()
    }

    fn flush(&mut self) -> Result<Vec<RawCue>, SubtitleError> {
        (**self).flush()
    }
}

/// An in-memory feed over a list of events.
///
/// Events added with [`with_buffered`](VecFeed::with_buffered) are held
/// back until [`flush`](DecoderFeed::flush), mimicking a decoder with
/// delayed output.
///
/// # Example
///
/// ```
/// use subextract::{DecoderFeed, RawCue, VecFeed};
///
/// let mut feed = VecFeed::new(vec![RawCue::new(0).with_plain("Hi")]);
/// assert!(feed.next_event().unwrap().is_some());
/// assert!(feed.next_event().unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VecFeed {
    pending: VecDeque<RawCue>,
    buffered: Vec<RawCue>,
}

impl VecFeed {
    /// Create a feed that yields `events` in order.
    pub fn new(events: impl IntoIterator<Item = RawCue>) -> Self {
        Self {
            pending: events.into_iter().collect(),
            buffered: Vec::new(),
        }
    }

    /// Add events that are only released by the flush phase.
    #[must_use]
    pub fn with_buffered(mut self, events: impl IntoIterator<Item = RawCue>) -> Self {
        self.buffered.extend(events);
        self
    }

    /// Number of events not yet handed out (including buffered ones).
    pub fn remaining(&self) -> usize {
        self.pending.len() + self.buffered.len()
    }
}

impl DecoderFeed for VecFeed {
    fn next_event(&mut self) -> Result<Option<RawCue>, SubtitleError> {
        Ok(self.pending.pop_front())
    }

    fn flush(&mut self) -> Result<Vec<RawCue>, SubtitleError> {
        Ok(std::mem::take(&mut self.buffered))
    }
}

/// Pull every event out of a feed, flush phase included.
pub fn drain_feed<F: DecoderFeed>(mut feed: F) -> Result<Vec<RawCue>, SubtitleError> {
    let mut events = Vec::new();
    while let Some(event) = feed.next_event()? {
        events.push(event);
    }
    events.extend(feed.flush()?);
    Ok(events)
}
