//! Dialogue record extraction.
//!
//! Some decoders hand over a whole ASS `Dialogue:` record instead of just
//! its text, e.g.
//!
//! ```text
//! Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,Text here
//! ```
//!
//! [`extract_dialogue_text`] unwraps the free-text field from such records
//! and leaves anything else untouched. Parsing is a chain of pattern
//! attempts; the first one that matches wins.

use crate::markup::strip_markup;

/// Style-name marker used when a record is missing its trailing fields.
const DEFAULT_STYLE_MARKER: &str = "Default,";

/// Fields between the style field and the free text: name, three margins
/// and effect, each terminated by a comma.
const FIELDS_BEFORE_TEXT: usize = 6;

/// Strip markup from a raw event and unwrap its dialogue record, if any.
pub fn event_text(raw: &str) -> String {
    extract_dialogue_text(&strip_markup(raw))
}

/// Isolate the free-text field of a stripped dialogue event.
///
/// Recognised shapes, tried in order:
///
/// 1. `Dialogue: Marked=<int>,<time>,<time><tail>` (SSA v4)
/// 2. `Dialogue: <int>,<time>,<time><tail>` (ASS)
/// 3. `<int>,<int><tail>`, which is returned unchanged
///
/// Input matching none of them is plain dialogue and is returned unchanged.
///
/// For the two `Dialogue:` shapes the tail still holds the style, name,
/// margin and effect fields. When the record is truncated the text after a
/// `Default,` style marker is used instead. If the stripped event carries a
/// second line outside the record, it is appended as an extra line.
///
/// # Example
///
/// ```
/// use subextract::extract_dialogue_text;
///
/// let record = "Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,Text here";
/// assert_eq!(extract_dialogue_text(record), "Text here");
/// assert_eq!(extract_dialogue_text("Just words"), "Just words");
/// ```
pub fn extract_dialogue_text(stripped: &str) -> String {
    let tail = match marked_record_tail(stripped).or_else(|| layered_record_tail(stripped)) {
        Some(tail) => tail,
        None => {
            if bare_record_tail(stripped).is_some() {
                log::trace!("Bare integer record left as-is");
            }
            return stripped.to_string();
        }
    };

    let text = match free_text(tail) {
        Some(text) => text,
        None => match tail.find(DEFAULT_STYLE_MARKER) {
            Some(marker) => &tail[marker + DEFAULT_STYLE_MARKER.len()..],
            None => return tail.strip_prefix(',').unwrap_or(tail).to_string(),
        },
    };

    match trailing_line(stripped) {
        Some(second) => format!("{text}\n{second}"),
        None => text.to_string(),
    }
}

/// Shape 1: `Dialogue: Marked=<int>,<time>,<time><tail>`.
fn marked_record_tail(input: &str) -> Option<&str> {
    let mut cursor = Cursor::new(input);
    cursor.literal("Dialogue:")?;
    cursor.whitespace();
    cursor.literal("Marked=")?;
    cursor.integer()?;
    cursor.literal(",")?;
    cursor.time()?;
    cursor.literal(",")?;
    cursor.time()?;
    cursor.line_tail()
}

/// Shape 2: `Dialogue: <int>,<time>,<time><tail>`.
fn layered_record_tail(input: &str) -> Option<&str> {
    let mut cursor = Cursor::new(input);
    cursor.literal("Dialogue:")?;
    cursor.whitespace();
    cursor.integer()?;
    cursor.literal(",")?;
    cursor.time()?;
    cursor.literal(",")?;
    cursor.time()?;
    cursor.line_tail()
}

/// Shape 3: `<int>,<int><tail>`. Only confirms the structure.
fn bare_record_tail(input: &str) -> Option<&str> {
    let mut cursor = Cursor::new(input);
    cursor.integer()?;
    cursor.literal(",")?;
    cursor.integer()?;
    cursor.line_tail()
}

/// Locate the free text inside a record tail.
///
/// The tail starts at the comma that ends the end-time field and must
/// contain one further comma per field before the text. Real records put
/// style and name ahead of the four margin and effect fields, so six
/// commas follow the first one.
fn free_text(tail: &str) -> Option<&str> {
    let mut comma = tail.find(',')?;
    for _ in 0..FIELDS_BEFORE_TEXT {
        comma += 1 + tail[comma + 1..].find(',')?;
    }
    Some(&tail[comma + 1..])
}

/// Text after the first line break of the event, trimmed, if not blank.
fn trailing_line(stripped: &str) -> Option<&str> {
    let line_break = stripped.find(['\r', '\n'])?;
    let second = stripped[line_break + 1..].trim_matches([' ', '\t', '\r', '\n']);
    (!second.is_empty()).then_some(second)
}

/// A tiny `scanf`-style matcher over a string slice.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn literal(&mut self, expected: &str) -> Option<()> {
        self.rest = self.rest.strip_prefix(expected)?;
        Some(())
    }

    fn whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Optional leading whitespace, optional sign, then at least one digit.
    fn integer(&mut self) -> Option<i64> {
        let trimmed = self.rest.trim_start();
        let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
        let digits = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        if digits == 0 {
            return None;
        }
        let consumed = trimmed.len() - unsigned.len() + digits;
        let value = trimmed[..consumed].parse().unwrap_or(i64::MAX);
        self.rest = &trimmed[consumed..];
        Some(value)
    }

    /// `H:MM:SS.cc`, each component an integer.
    fn time(&mut self) -> Option<()> {
        self.integer()?;
        self.literal(":")?;
        self.integer()?;
        self.literal(":")?;
        self.integer()?;
        self.literal(".")?;
        self.integer()?;
        Some(())
    }

    /// The rest of the current line; must not be empty.
    fn line_tail(&mut self) -> Option<&'a str> {
        let end = self.rest.find(['\r', '\n']).unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let tail = &self.rest[..end];
        self.rest = &self.rest[end..];
        Some(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::{event_text, extract_dialogue_text};

    #[test]
    fn ass_record_yields_text_field() {
        let record = "Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,Text here";
        assert_eq!(extract_dialogue_text(record), "Text here");
    }

    #[test]
    fn text_field_may_contain_commas() {
        let record = "Dialogue: 0,0:00:01.00,0:00:04.00,Default,Bob,0,0,0,,Well, hello, there";
        assert_eq!(extract_dialogue_text(record), "Well, hello, there");
    }

    #[test]
    fn ssa_marked_record_yields_text_field() {
        let record = "Dialogue: Marked=0,0:00:01.00,0:00:04.00,Main,,0000,0000,0000,,Hi";
        assert_eq!(extract_dialogue_text(record), "Hi");
    }

    #[test]
    fn truncated_record_falls_back_to_default_style() {
        let record = "Dialogue: 0,0:42:29.20,0:42:31.08,Default,Chinese\nEnglish";
        assert_eq!(extract_dialogue_text(record), "Chinese\nEnglish");
    }

    #[test]
    fn truncated_record_without_style_marker() {
        let record = "Dialogue: 0,0:00:01.00,0:00:02.00,Narrow,words";
        assert_eq!(extract_dialogue_text(record), "Narrow,words");

        let record = "Dialogue: 0,0:00:01.00,0:00:02.00 no commas";
        assert_eq!(extract_dialogue_text(record), " no commas");
    }

    #[test]
    fn second_line_outside_record_is_appended() {
        let event = "Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,First\n  Second  ";
        assert_eq!(extract_dialogue_text(event), "First\nSecond");

        let event = "Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,Only\n   \n";
        assert_eq!(extract_dialogue_text(event), "Only");
    }

    #[test]
    fn record_without_tail_is_not_a_record() {
        let event = "Dialogue: 0,0:00:01.00,0:00:04.00";
        assert_eq!(extract_dialogue_text(event), event);
    }

    #[test]
    fn bare_integer_record_is_returned_unchanged() {
        assert_eq!(extract_dialogue_text("12,34 rest"), "12,34 rest");
        assert_eq!(
            extract_dialogue_text("0,0,Default,,0,0,0,,Hello"),
            "0,0,Default,,0,0,0,,Hello"
        );
    }

    #[test]
    fn plain_text_is_returned_unchanged() {
        assert_eq!(extract_dialogue_text("Hello there"), "Hello there");
        assert_eq!(extract_dialogue_text("Dialogue: nope"), "Dialogue: nope");
        assert_eq!(extract_dialogue_text(""), "");
    }

    #[test]
    fn event_text_strips_before_extracting() {
        let event = r"Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,{\i1}Hi{\i0}\Nthere";
        // The record ends at the break; "there" comes back as the trailing line.
        assert_eq!(event_text(event), "Hi\nthere");
        assert_eq!(event_text(r"{\b1}Bold{\b0}"), "Bold");
    }
}
