//! Textual path forms: dotted/bracket notation and JSON Pointer.

use std::iter::Peekable;
use std::str::Chars;

use crate::types::{Pxth, Segment};
use crate::PxthError;

/// Check if a string represents a canonical non-negative integer index.
///
/// # Example
///
/// ```
/// use stocked_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index(""));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // First char can't be leading zero unless it's just "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Parses dotted/bracket notation into a path.
///
/// Surrounding whitespace is ignored and the empty string is the root.
///
/// # Example
///
/// ```
/// use stocked_path::{parse_pxth, Pxth};
///
/// let path = parse_pxth("   hello.tst[0].b   ").unwrap();
/// assert_eq!(path, Pxth::new(["hello", "tst", "0", "b"]));
/// assert_eq!(path.to_string(), "hello.tst.0.b");
/// assert!(parse_pxth("").unwrap().is_root());
/// ```
pub fn parse_pxth(text: &str) -> Result<Pxth, PxthError> {
    let text = text.trim();
    let mut segments: Vec<Segment> = Vec::new();
    if text.is_empty() {
        return Ok(Pxth::new(segments));
    }

    let mut chars = text.chars().peekable();
    let mut current = String::new();
    // Whether a dot-separated token is being read (at start and after `.`).
    let mut in_token = true;

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if in_token {
                    segments.push(Segment::from(std::mem::take(&mut current)));
                }
                in_token = true;
            }
            '[' => {
                if in_token && !current.is_empty() {
                    segments.push(Segment::from(std::mem::take(&mut current)));
                }
                segments.push(read_bracket(&mut chars, text)?);
                in_token = false;
            }
            _ => {
                in_token = true;
                current.push(ch);
            }
        }
    }
    if in_token {
        segments.push(Segment::from(current));
    }

    Ok(Pxth::new(segments))
}

fn read_bracket(chars: &mut Peekable<Chars<'_>>, text: &str) -> Result<Segment, PxthError> {
    let unterminated = || PxthError::Unterminated {
        text: text.to_string(),
    };

    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut key = String::new();
            loop {
                match chars.next().ok_or_else(unterminated)? {
                    '\\' => key.push(chars.next().ok_or_else(unterminated)?),
                    ch if ch == quote => break,
                    ch => key.push(ch),
                }
            }
            match chars.next() {
                Some(']') => Ok(Segment::from(key)),
                _ => Err(unterminated()),
            }
        }
        _ => {
            let mut token = String::new();
            loop {
                match chars.next().ok_or_else(unterminated)? {
                    ']' => break,
                    ch => token.push(ch),
                }
            }
            Ok(Segment::from(token.trim().to_string()))
        }
    }
}

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses a JSON Pointer string into a path.
///
/// # Errors
///
/// Returns [`PxthError::PointerInvalid`] when a non-empty pointer does not
/// start with `/`.
///
/// # Example
///
/// ```
/// use stocked_path::{parse_pointer, Pxth};
///
/// assert_eq!(parse_pointer("/a~0b/c~1d/1").unwrap(), Pxth::new(["a~b", "c/d", "1"]));
/// assert!(parse_pointer("").unwrap().is_root());
/// assert!(parse_pointer("foo").is_err());
/// ```
pub fn parse_pointer(pointer: &str) -> Result<Pxth, PxthError> {
    if pointer.is_empty() {
        return Ok(Pxth::root());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PxthError::PointerInvalid {
            pointer: pointer.to_string(),
        });
    };
    Ok(rest.split('/').map(unescape_component).collect())
}

/// Formats a path as a JSON Pointer. The root formats as the empty string.
pub fn format_pointer(path: &Pxth) -> String {
    let mut out = String::new();
    for segment in path.segments() {
        out.push('/');
        out.push_str(&escape_component(&segment.as_key()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        assert_eq!(parse_pxth("a.b.c").unwrap(), Pxth::new(["a", "b", "c"]));
        assert_eq!(parse_pxth("a[0].b").unwrap(), Pxth::new(["a", "0", "b"]));
        assert_eq!(parse_pxth("a.0.b").unwrap(), parse_pxth("a[0].b").unwrap());
        assert_eq!(parse_pxth("[0]").unwrap(), Pxth::new([0usize]));
        assert_eq!(parse_pxth("a[1][2]").unwrap(), Pxth::new(["a", "1", "2"]));
    }

    #[test]
    fn test_parse_quoted_brackets() {
        assert_eq!(
            parse_pxth("path[\"to\"][0].variable['yes']").unwrap(),
            Pxth::new(["path", "to", "0", "variable", "yes"])
        );
        assert_eq!(
            parse_pxth("a[\"b.c\"]").unwrap(),
            Pxth::new([Segment::Key("a".into()), Segment::Key("b.c".into())])
        );
        assert_eq!(
            parse_pxth("a[\"q\\\"x\"]").unwrap(),
            Pxth::new([Segment::Key("a".into()), Segment::Key("q\"x".into())])
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_pxth("a[0"), Err(PxthError::Unterminated { .. })));
        assert!(matches!(parse_pxth("a[\"b]"), Err(PxthError::Unterminated { .. })));
    }

    #[test]
    fn test_display_roundtrip() {
        for text in ["", "a", "a.b.0.c", "[\"a.b\"].c", "x[\"\"]", "[\"01\"].y"] {
            let path = parse_pxth(text).unwrap();
            assert_eq!(parse_pxth(&path.to_string()).unwrap(), path, "roundtrip of {text:?}");
        }
    }

    #[test]
    fn test_pointer_roundtrip() {
        for pointer in ["", "/", "/foo", "/foo/bar", "/a~0b", "/c~1d", "/a~0b/c~1d/1"] {
            let path = parse_pointer(pointer).unwrap();
            assert_eq!(format_pointer(&path), pointer, "roundtrip of {pointer:?}");
        }
    }
}
