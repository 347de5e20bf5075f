//! FFmpeg-backed decoder feed.
//!
//! [`FfmpegFeed`] opens a media file, lists its subtitle streams and
//! decodes the selected ones into [`RawCue`] events. Streams are decoded
//! one after another, rewinding the demuxer in between, and each decoder
//! is flushed when its stream runs out of packets.
//!
//! FFmpeg's own console output is independent of the `log` crate; use
//! [`set_ffmpeg_log_level`] to quiet it.
//!
//! # Example
//!
//! ```no_run
//! use subextract::{AssemblyOptions, CueAssembler, FfmpegFeed, StreamSelector, SubtitleError};
//!
//! let mut feed = FfmpegFeed::open("input.mkv")?;
//! feed.select(&StreamSelector::All)?;
//! let cues = CueAssembler::assemble(&mut feed, AssemblyOptions::default())?;
//! println!("{} cues", cues.len());
//! # Ok::<(), SubtitleError>(())
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational, Rescale, Subtitle,
    codec::context::Context as CodecContext,
    decoder::Subtitle as SubtitleDecoder,
    format::context::Input,
    media::Type,
    subtitle::Rect,
    util::log::Level,
};

use crate::cue::{RawCue, RawFragment};
use crate::error::SubtitleError;
use crate::feed::DecoderFeed;
use crate::selection::{StreamSelector, SubtitleStreamInfo, select_streams};
use crate::timing::TimeBase;

/// The microsecond base FFmpeg uses for decoded subtitle timestamps.
const MICROSECONDS: Rational = Rational(1, 1_000_000);

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors too. The CLI default.
    #[default]
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }

    /// Parse a level name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "quiet" => Some(FfmpegLogLevel::Quiet),
            "fatal" => Some(FfmpegLogLevel::Fatal),
            "error" => Some(FfmpegLogLevel::Error),
            "warning" | "warn" => Some(FfmpegLogLevel::Warning),
            "info" => Some(FfmpegLogLevel::Info),
            "debug" => Some(FfmpegLogLevel::Debug),
            _ => None,
        }
    }
}

/// Set FFmpeg's internal log level. Does not affect the `log` crate.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// A stream currently being decoded.
struct ActiveStream {
    index: usize,
    time_base: Rational,
    decoder: SubtitleDecoder,
    events: usize,
}

impl ActiveStream {
    /// Decode one packet; `None` when it completed no subtitle.
    fn decode(&mut self, packet: &Packet) -> Option<RawCue> {
        let mut subtitle = Subtitle::new();
        match self.decoder.decode(packet, &mut subtitle) {
            Ok(true) => {
                self.events += 1;
                Some(self.raw_cue(&subtitle, packet))
            }
            Ok(false) => None,
            Err(error) => {
                log::warn!("Skipping undecodable packet in stream {}: {}", self.index, error);
                None
            }
        }
    }

    fn raw_cue(&self, subtitle: &Subtitle, packet: &Packet) -> RawCue {
        let valid_time_base = self.time_base.numerator() != 0 && self.time_base.denominator() != 0;

        let mut raw = RawCue::new(self.index);
        raw.time_base = valid_time_base
            .then(|| TimeBase::new(self.time_base.numerator(), self.time_base.denominator()));
        raw.pts = subtitle.pts().map(|pts| {
            if valid_time_base {
                pts.rescale(MICROSECONDS, self.time_base)
            } else {
                pts
            }
        });
        raw.packet_pts = packet.pts();
        raw.packet_duration = Some(packet.duration()).filter(|duration| *duration > 0);
        raw.end_display_time = Some(i64::from(subtitle.end()));

        for rect in subtitle.rects() {
            match rect {
                Rect::Ass(ass) if !ass.get().is_empty() => {
                    raw.fragments
                        .push(RawFragment::Markup(ass_event_text(ass.get()).to_string()));
                }
                Rect::Text(text) if !text.get().is_empty() => {
                    raw.fragments.push(RawFragment::Plain(text.get().to_string()));
                }
                _ => {}
            }
        }

        raw
    }
}

/// Decoded subtitle events from a media file.
pub struct FfmpegFeed {
    input: Input,
    path: PathBuf,
    streams: Vec<SubtitleStreamInfo>,
    queue: VecDeque<usize>,
    active: Option<ActiveStream>,
    streams_started: usize,
}

impl FfmpegFeed {
    /// Open a media file and list its subtitle streams.
    ///
    /// No stream is selected yet; call [`select`](FfmpegFeed::select).
    ///
    /// # Errors
    ///
    /// Returns [`SubtitleError::FileOpen`] if FFmpeg cannot open the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening media file: {}", path.display());

        ffmpeg_next::init().map_err(|error| SubtitleError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| SubtitleError::FileOpen {
            path: path.clone(),
            reason: error.to_string(),
        })?;

        let streams = input
            .streams()
            .filter(|stream| stream.parameters().medium() == Type::Subtitle)
            .map(|stream| {
                SubtitleStreamInfo::new(
                    stream.index(),
                    stream.parameters().id().name(),
                    stream.metadata().get("language"),
                )
            })
            .collect();

        Ok(Self {
            input,
            path,
            streams,
            queue: VecDeque::new(),
            active: None,
            streams_started: 0,
        })
    }

    /// The file this feed reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All subtitle streams in the container.
    pub fn subtitle_streams(&self) -> &[SubtitleStreamInfo] {
        &self.streams
    }

    /// Queue the streams picked by `selector` for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`SubtitleError::NoSubtitleStream`] if nothing matches.
    pub fn select(&mut self, selector: &StreamSelector) -> Result<Vec<usize>, SubtitleError> {
        let selected = select_streams(&self.streams, selector);
        if selected.is_empty() {
            return Err(SubtitleError::NoSubtitleStream);
        }
        self.queue = selected.iter().copied().collect();
        Ok(selected)
    }

    fn activate(&mut self, index: usize) -> Result<(), SubtitleError> {
        if self.streams_started > 0 {
            self.input.seek(0, ..)?;
        }
        self.streams_started += 1;

        let stream = self
            .input
            .stream(index)
            .ok_or(SubtitleError::NoSubtitleStream)?;
        let time_base = stream.time_base();
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context.decoder().subtitle().map_err(|error| {
            SubtitleError::SubtitleDecodeError(format!(
                "Failed to create subtitle decoder for stream {index}: {error}"
            ))
        })?;

        log::debug!("Decoding subtitle stream {} (time base {})", index, time_base);
        self.active = Some(ActiveStream {
            index,
            time_base,
            decoder,
            events: 0,
        });
        Ok(())
    }
}

impl DecoderFeed for FfmpegFeed {
    fn next_event(&mut self) -> Result<Option<RawCue>, SubtitleError> {
        loop {
            let Some(active) = self.active.as_mut() else {
                match self.queue.pop_front() {
                    Some(index) => {
                        self.activate(index)?;
                        continue;
                    }
                    None => return Ok(None),
                }
            };

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() != active.index {
                        continue;
                    }
                    if let Some(event) = active.decode(&packet) {
                        return Ok(Some(event));
                    }
                }
                Err(FfmpegError::Eof) => {
                    // Flush the decoder with empty packets until it is dry.
                    if let Some(event) = active.decode(&Packet::empty()) {
                        return Ok(Some(event));
                    }
                    log::debug!(
                        "Stream {} finished after {} events",
                        active.index,
                        active.events
                    );
                    self.active = None;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

/// The Text field of an event in FFmpeg's decoded ASS layout
/// (`ReadOrder,Layer,Style,Name,MarginL,MarginR,MarginV,Effect,Text`).
///
/// Anything else, including full `Dialogue:` lines from older FFmpeg
/// releases, is returned untouched.
fn ass_event_text(event: &str) -> &str {
    let mut fields = event.splitn(9, ',');
    let is_integer = |field: Option<&str>| {
        field.is_some_and(|f| !f.trim().is_empty() && f.trim().bytes().all(|b| b.is_ascii_digit()))
    };
    if !is_integer(fields.next()) || !is_integer(fields.next()) {
        return event;
    }
    fields.nth(6).unwrap_or(event)
}

#[cfg(test)]
mod tests {
    use super::{FfmpegLogLevel, ass_event_text};

    #[test]
    fn decoded_ass_layout_yields_text() {
        assert_eq!(ass_event_text("0,0,Default,,0,0,0,,Hello, world"), "Hello, world");
        assert_eq!(ass_event_text(r"12,1,Sign,,0,0,0,,{\an8}Top"), r"{\an8}Top");
    }

    #[test]
    fn other_layouts_are_untouched() {
        let dialogue = "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hi";
        assert_eq!(ass_event_text(dialogue), dialogue);
        assert_eq!(ass_event_text("0,0,short"), "0,0,short");
        assert_eq!(ass_event_text("plain text"), "plain text");
    }

    #[test]
    fn log_level_names() {
        assert_eq!(FfmpegLogLevel::from_name("WARN"), Some(FfmpegLogLevel::Warning));
        assert_eq!(FfmpegLogLevel::from_name("quiet"), Some(FfmpegLogLevel::Quiet));
        assert_eq!(FfmpegLogLevel::from_name("loud"), None);
    }
}
