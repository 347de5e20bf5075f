//! Text normalisation for extracted cue text.
//!
//! [`sanitize_text`] takes markup-free text and makes it presentable:
//! entities are decoded, line endings unified, whitespace squeezed and
//! blank lines capped. The result may be empty, in which case the cue it
//! belongs to is dropped by the assembler.

/// Character substituted for numeric entities outside ASCII.
const NON_ASCII_REPLACEMENT: char = '?';

/// Largest code point a numeric entity may name.
const MAX_CODE_POINT: u64 = 0x10FFFF;

/// Normalise a piece of subtitle text.
///
/// Steps, in order:
///
/// 1. decode `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&#39;` and decimal
///    `&#NNN;` entities (see [`unescape_entities`]);
/// 2. turn every `\r` into `\n`;
/// 3. trim spaces and tabs from each line and squeeze internal runs of them
///    to a single space;
/// 4. cap runs of two or more newlines at exactly two;
/// 5. trim surrounding whitespace and blank lines.
///
/// # Example
///
/// ```
/// use subextract::sanitize_text;
///
/// assert_eq!(sanitize_text("a &amp; b &lt;c&gt;"), "a & b <c>");
/// assert_eq!(sanitize_text("  x\n\n\n\n y  "), "x\n\ny");
/// ```
pub fn sanitize_text(text: &str) -> String {
    let unescaped = unescape_entities(text).replace('\r', "\n");

    let squeezed = unescaped
        .split('\n')
        .map(squeeze_line)
        .collect::<Vec<_>>()
        .join("\n");

    cap_blank_lines(&squeezed)
        .trim_matches([' ', '\t', '\r', '\n'])
        .to_string()
}

/// Decode the HTML entities commonly found in subtitle text.
///
/// Decimal entities below 128 become the matching ASCII character; larger
/// code points up to U+10FFFF are replaced with `?`. Anything not
/// recognised, including a zero or oversized numeric entity, is copied
/// through starting at its `&`.
pub fn unescape_entities(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ampersand) = rest.find('&') {
        output.push_str(&rest[..ampersand]);
        rest = &rest[ampersand..];

        match decode_entity(rest) {
            Some((decoded, consumed)) => {
                output.push(decoded);
                rest = &rest[consumed..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Decode the entity at the start of `input`, returning the character and
/// the number of bytes it spans.
fn decode_entity(input: &str) -> Option<(char, usize)> {
    const NAMED: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
    ];

    if let Some((entity, decoded)) = NAMED.iter().find(|(entity, _)| input.starts_with(entity)) {
        return Some((*decoded, entity.len()));
    }

    // `&#` plus at least two more bytes, e.g. `&#9;`.
    if input.len() < 4 || !input.starts_with("&#") {
        return None;
    }

    let digits = &input[2..];
    let digit_count = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if !digits[digit_count..].starts_with(';') {
        return None;
    }

    let code = digits[..digit_count].bytes().fold(0u64, |code, digit| {
        code.saturating_mul(10)
            .saturating_add(u64::from(digit - b'0'))
    });
    if code == 0 || code > MAX_CODE_POINT {
        return None;
    }

    let decoded = if code < 128 {
        char::from(code as u8)
    } else {
        NON_ASCII_REPLACEMENT
    };
    Some((decoded, 2 + digit_count + 1))
}

/// Trim a line and squeeze its internal space/tab runs.
fn squeeze_line(line: &str) -> String {
    line.split([' ', '\t'])
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse every run of two or more newlines to exactly two.
fn cap_blank_lines(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut newline_run = 0usize;

    for character in text.chars() {
        if character == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                output.push('\n');
            }
        } else {
            newline_run = 0;
            output.push(character);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::{sanitize_text, unescape_entities};

    #[test]
    fn named_entities_are_decoded() {
        assert_eq!(sanitize_text("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(unescape_entities("&quot;hi&quot; it&#39;s"), "\"hi\" it's");
    }

    #[test]
    fn decoding_is_single_pass() {
        assert_eq!(unescape_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn numeric_entities() {
        assert_eq!(unescape_entities("&#65;&#66;"), "AB");
        assert_eq!(unescape_entities("caf&#233;"), "caf?");
        assert_eq!(unescape_entities("&#9731;"), "?");
    }

    #[test]
    fn malformed_or_unknown_entities_are_literal() {
        assert_eq!(unescape_entities("&nbsp;"), "&nbsp;");
        assert_eq!(unescape_entities("&#0;"), "&#0;");
        assert_eq!(unescape_entities("&#65"), "&#65");
        assert_eq!(unescape_entities("&#;"), "&#;");
        assert_eq!(unescape_entities("&#1114112;"), "&#1114112;");
        assert_eq!(unescape_entities("&#99999999999999999999;"), "&#99999999999999999999;");
        assert_eq!(unescape_entities("fish & chips &"), "fish & chips &");
    }

    #[test]
    fn whitespace_is_squeezed_per_line() {
        assert_eq!(sanitize_text("  one \t  two  \n\tthree   "), "one two\nthree");
    }

    #[test]
    fn carriage_returns_become_newlines() {
        assert_eq!(sanitize_text("a\rb"), "a\nb");
        assert_eq!(sanitize_text("a\r\nb"), "a\n\nb");
    }

    #[test]
    fn blank_lines_are_capped() {
        assert_eq!(sanitize_text("x\n\n\n\n y"), "x\n\ny");
        assert_eq!(sanitize_text("x\n \n\t\ny"), "x\n\ny");
        assert_eq!(sanitize_text("x\ny"), "x\ny");
    }

    #[test]
    fn outer_blank_lines_are_trimmed() {
        assert_eq!(sanitize_text("\n\n  hello \n\n"), "hello");
        assert_eq!(sanitize_text(" \n\t\n "), "");
        assert_eq!(sanitize_text(""), "");
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        assert_eq!(sanitize_text("  Grüße,   café  "), "Grüße, café");
    }
}
