//! Subtitle markup stripping.
//!
//! Decoded text subtitles usually arrive as ASS/SSA event text: brace
//! delimited override blocks (`{\i1}`, `{\pos(10,20)}`), backslash escapes
//! (`\N`, `\h`) and drawing spans switched on by `{\p1}` whose payload is
//! vector coordinates rather than words. [`strip_markup`] recovers the
//! visible text from one such fragment.
//!
//! # Example
//!
//! ```
//! use subextract::strip_markup;
//!
//! assert_eq!(strip_markup(r"{\i1}Hello{\i0}\Nworld"), "Hello\nworld");
//! assert_eq!(strip_markup(r"{\p1}m 0 0 l 10 10{\p0}text"), "text");
//! ```

/// Scanner state for [`strip_markup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// Outside any override block; characters are visible text.
    Text,
    /// Inside a `{...}` override block opened at the given byte offset.
    Tag { opened_at: usize },
}

/// Strip ASS/SSA override markup from a single fragment.
///
/// Override blocks vanish, `\N` / `\n` become line breaks and `\h` becomes
/// a space. Text inside a drawing span (`\p` with a non-zero scale) is
/// dropped until a `\p0` (or bare `\p`) switches drawing off again.
///
/// A `{` that is never closed is not treated as markup: everything from
/// the brace to the end of the input is kept verbatim.
///
/// Drawing state never carries over between calls.
pub fn strip_markup(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut output = String::with_capacity(raw.len());
    let mut mode = ScanMode::Text;
    let mut drawing = false;
    let mut position = 0;

    while position < bytes.len() {
        match mode {
            ScanMode::Tag { .. } => match bytes[position] {
                b'}' => {
                    mode = ScanMode::Text;
                    position += 1;
                }
                b'\\' if bytes.get(position + 1) == Some(&b'p') => {
                    position += 2;
                    // `\p` alone or with only zeros switches drawing off.
                    drawing = false;
                    while let Some(&digit) = bytes.get(position).filter(|b| b.is_ascii_digit()) {
                        if digit != b'0' {
                            drawing = true;
                        }
                        position += 1;
                    }
                }
                _ => position += 1,
            },
            ScanMode::Text => match (bytes[position], bytes.get(position + 1)) {
                (b'\\', Some(b'N' | b'n')) => {
                    output.push('\n');
                    position += 2;
                }
                (b'\\', Some(b'h')) => {
                    output.push(' ');
                    position += 2;
                }
                (b'{', _) => {
                    mode = ScanMode::Tag {
                        opened_at: position,
                    };
                    position += 1;
                }
                _ => {
                    let Some(character) = raw[position..].chars().next() else {
                        break;
                    };
                    if !drawing {
                        output.push(character);
                    }
                    position += character.len_utf8();
                }
            },
        }
    }

    if let ScanMode::Tag { opened_at } = mode {
        output.push_str(&raw[opened_at..]);
    }

    output
}

/// HTML formatting tags some decoders leave in subtitle text.
const HTML_TAGS: [&str; 6] = ["b", "i", "u", "s", "font", "br"];

/// Remove well-formed HTML formatting tags (`<i>`, `</b>`, `<br/>`,
/// `<font color="red">`).
///
/// Tag names are matched case-insensitively against a fixed set; only
/// `font` may carry attributes, and they must look like `name=value`.
/// Everything else, including a `<` in ordinary prose, backslashes and
/// braces, is copied through untouched.
///
/// # Example
///
/// ```
/// use subextract::strip_html_tags;
///
/// assert_eq!(strip_html_tags("<i>Hello</i> there"), "Hello there");
/// assert_eq!(strip_html_tags("a<b and c>d"), "a<b and c>d");
/// ```
pub fn strip_html_tags(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        output.push_str(&rest[..open]);
        rest = &rest[open..];

        match html_tag_len(rest) {
            Some(len) => rest = &rest[len..],
            None => {
                output.push('<');
                rest = &rest[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Byte length of the HTML tag at the start of `input`, if it is one.
fn html_tag_len(input: &str) -> Option<usize> {
    let body = input.strip_prefix('<')?;
    let (closing, body) = match body.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, body),
    };

    let name_len = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    let name = &body[..name_len];
    if !HTML_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name)) {
        return None;
    }

    let after_name = &body[name_len..];
    let close = after_name.find('>')?;
    let inner = &after_name[..close];
    let well_formed = match inner {
        "" | "/" => true,
        attributes => {
            !closing
                && name.eq_ignore_ascii_case("font")
                && attributes.starts_with([' ', '\t'])
                && attributes.contains('=')
                && !attributes.contains(['<', '\n', '\r'])
        }
    };

    well_formed.then(|| input.len() - after_name.len() + close + 1)
}
