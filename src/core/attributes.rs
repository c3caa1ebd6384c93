//! XML Attribute Parsing
//!
//! Parses the attribute section of a raw tag into spans. Lenient: anything
//! that is not `name = "value"` (or single-quoted) is skipped.

use memchr::memchr;

use super::scanner::is_whitespace;
use super::span::Span;
use super::token::{AttrSpans, NameSpans};

/// Result of parsing the attribute section of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagEnd {
    /// Index just past the closing `>` (input length if there is none)
    pub after: usize,
    /// A bare `/` was seen outside any value
    pub self_closing: bool,
}

/// Parse attributes from `tag[from..]` up to the closing `>`.
///
/// Spans are pushed into `attrs` offset by `base`, the position of `tag`
/// in the arena.
pub(crate) fn parse_attributes(
    tag: &[u8],
    from: usize,
    base: usize,
    attrs: &mut Vec<AttrSpans>,
) -> TagEnd {
    let len = tag.len();
    let mut self_closing = false;
    let mut pos = from;

    loop {
        while pos < len && is_whitespace(tag[pos]) {
            pos += 1;
        }
        if pos >= len {
            return TagEnd {
                after: len,
                self_closing,
            };
        }

        match tag[pos] {
            b'>' => {
                return TagEnd {
                    after: pos + 1,
                    self_closing,
                }
            }
            b'/' => {
                self_closing = true;
                pos += 1;
                continue;
            }
            b'=' => {
                // Value without a name
                pos += 1;
                continue;
            }
            b'"' | b'\'' => {
                pos = match skip_quoted(tag, pos) {
                    Some(end) => end + 1,
                    None => len,
                };
                continue;
            }
            _ => {}
        }

        let name_start = pos;
        while pos < len && !is_name_end(tag[pos]) {
            pos += 1;
        }
        let name = split_name(tag, name_start, pos, base);

        while pos < len && is_whitespace(tag[pos]) {
            pos += 1;
        }
        if pos >= len || tag[pos] != b'=' {
            // Attribute without a value, skip it
            continue;
        }
        pos += 1;
        while pos < len && is_whitespace(tag[pos]) {
            pos += 1;
        }
        if pos >= len || !matches!(tag[pos], b'"' | b'\'') {
            // Unquoted value, the name is dropped and the value bytes are
            // treated as further names
            continue;
        }

        match skip_quoted(tag, pos) {
            Some(close) => {
                attrs.push(AttrSpans {
                    name,
                    value: Span::new(base + pos + 1, base + close),
                });
                pos = close + 1;
            }
            None => {
                return TagEnd {
                    after: len,
                    self_closing,
                }
            }
        }
    }
}

/// Index of the quote closing the one at `open`
#[inline]
fn skip_quoted(tag: &[u8], open: usize) -> Option<usize> {
    let quote = tag[open];
    memchr(quote, &tag[open + 1..]).map(|i| open + 1 + i)
}

#[inline]
fn is_name_end(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'')
}

/// Split `tag[start..end]` at the first `:` into prefix and local spans.
pub(crate) fn split_name(tag: &[u8], start: usize, end: usize, base: usize) -> NameSpans {
    let full = Span::new(base + start, base + end);
    match memchr(b':', &tag[start..end]) {
        Some(i) => NameSpans {
            prefix: Span::new(base + start, base + start + i),
            local: Span::new(base + start + i + 1, base + end),
            full,
        },
        None => NameSpans {
            prefix: Span::EMPTY,
            local: full,
            full,
        },
    }
}
