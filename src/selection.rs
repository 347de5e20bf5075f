//! Subtitle stream selection.
//!
//! Which streams feed the assembler is policy supplied by the caller: an
//! explicit stream index, every stream, or every stream whose language tag
//! matches a target language (usually the user's own, see
//! [`system_language`]).
//!
//! # Example
//!
//! ```
//! use subextract::{LanguageSelector, StreamSelector, SubtitleStreamInfo, select_streams};
//!
//! let streams = vec![
//!     SubtitleStreamInfo::new(2, "ass", Some("eng")),
//!     SubtitleStreamInfo::new(3, "subrip", Some("fre")),
//!     SubtitleStreamInfo::new(4, "subrip", None),
//! ];
//! let selector = StreamSelector::Language(LanguageSelector::new("en"));
//! assert_eq!(select_streams(&streams, &selector), vec![2, 4]);
//! ```

use std::env;

/// Language assumed when the environment does not name one.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Description of one subtitle stream in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleStreamInfo {
    /// Stream index inside the container.
    pub index: usize,
    /// Codec name (e.g. `"ass"`, `"subrip"`).
    pub codec: String,
    /// Language tag from the stream metadata, if any.
    pub language: Option<String>,
}

impl SubtitleStreamInfo {
    /// Describe a stream.
    pub fn new(index: usize, codec: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            index,
            codec: codec.into(),
            language: language.map(str::to_string),
        }
    }
}

/// Matches stream language tags against a target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSelector {
    target: String,
}

impl LanguageSelector {
    /// Select streams in `target` (normalised with [`normalize_language`]).
    pub fn new(target: &str) -> Self {
        Self {
            target: normalize_language(target),
        }
    }

    /// Select streams in the language of the current environment.
    pub fn from_environment() -> Self {
        Self::new(&system_language())
    }

    /// The normalised target language.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns `true` if a stream tagged `language` should be used.
    ///
    /// Untagged streams always match. A tag matches when it equals the
    /// target, starts with it, or shares its first two letters.
    pub fn matches(&self, language: Option<&str>) -> bool {
        let tag = match language.map(str::to_lowercase) {
            Some(tag) if !tag.is_empty() => tag,
            _ => return true,
        };

        if tag.starts_with(&self.target) {
            return true;
        }

        match (tag.get(..2), self.target.get(..2)) {
            (Some(tag_prefix), Some(target_prefix)) => tag_prefix == target_prefix,
            _ => false,
        }
    }
}

/// Which subtitle streams to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSelector {
    /// Every subtitle stream.
    All,
    /// One stream by container index.
    Index(usize),
    /// Streams whose language matches.
    Language(LanguageSelector),
}

impl Default for StreamSelector {
    fn default() -> Self {
        StreamSelector::Language(LanguageSelector::from_environment())
    }
}

/// Indices of the streams picked by `selector`, in container order.
pub fn select_streams(streams: &[SubtitleStreamInfo], selector: &StreamSelector) -> Vec<usize> {
    let selected: Vec<usize> = streams
        .iter()
        .filter(|stream| match selector {
            StreamSelector::All => true,
            StreamSelector::Index(index) => stream.index == *index,
            StreamSelector::Language(language) => language.matches(stream.language.as_deref()),
        })
        .map(|stream| stream.index)
        .collect();

    log::debug!(
        "Selected subtitle streams {:?} of {} ({:?})",
        selected,
        streams.len(),
        selector
    );
    selected
}

/// Reduce a locale or language tag to a lowercase two-letter prefix.
///
/// Leading non-letters are skipped and only the first run of letters is
/// used, so `"en_US.UTF-8"` becomes `"en"` and `"C"` becomes `"c"`.
pub fn normalize_language(tag: &str) -> String {
    tag.trim_start_matches(|c: char| !c.is_ascii_alphabetic())
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .take(2)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// The user's language according to the `LANG` environment variable,
/// falling back to [`FALLBACK_LANGUAGE`].
pub fn system_language() -> String {
    language_from(env::var("LANG").ok().as_deref())
}

fn language_from(lang: Option<&str>) -> String {
    lang.map(normalize_language)
        .filter(|language| !language.is_empty())
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}
