//! Raw token boundary scanner
//!
//! Finds the byte span of the next lexical unit in the arena, pulling more
//! input whenever the buffered bytes run out. A unit is one of:
//! - processing instruction `<?...?>`
//! - directive `<!...>`, DOCTYPE internal subsets included
//! - comment `<!--...-->`
//! - element tag plus the character data (or one CDATA section) that
//!   follows it, up to the next `<`
//! - character data split off its tag when tag and data together would
//!   not fit under the buffer limit
//!
//! Uses memchr for `<` search and `]]>` search.

use std::io::Read;

use memchr::{memchr, memmem};

use super::span::Span;
use crate::error::{Error, Result};
use crate::reader::ByteArena;

pub(crate) const CDATA_OPEN: &[u8] = b"<![CDATA[";
pub(crate) const CDATA_CLOSE: &[u8] = b"]]>";

/// Result of one scan step
#[derive(Debug)]
pub(crate) enum Step {
    /// A complete unit; more may follow.
    Unit(Span),
    /// The last unit of the stream. A deferred error is reported on the
    /// call after this one.
    Last(Span, Option<Error>),
    /// Nothing left.
    End,
}

/// What the bytes after `<` turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Pending,
    Element,
    ProcInst,
    /// `<!` not yet known to be a comment or CDATA
    Bang,
    Comment,
    CData,
}

enum Found {
    At(usize),
    /// Stream ended; carries the offset of the end of data
    Eof(usize),
}

/// Offsets relative to a pivot that follows the arena through compaction
struct Cursor<'a, R> {
    arena: &'a mut ByteArena<R>,
    pivot: usize,
}

impl<'a, R: Read> Cursor<'a, R> {
    #[inline]
    fn end(&self) -> usize {
        self.arena.len() - self.pivot
    }

    #[inline]
    fn at(&self, off: usize) -> u8 {
        self.arena.data()[self.pivot + off]
    }

    fn fill(&mut self) -> Result<bool> {
        self.arena.fill(&mut self.pivot)
    }

    /// Byte at `off`, reading more input if needed.
    fn byte(&mut self, off: usize) -> Result<Option<u8>> {
        while off >= self.end() {
            if !self.fill()? {
                return Ok(None);
            }
        }
        Ok(Some(self.at(off)))
    }

    fn find_byte(&mut self, needle: u8, from: usize) -> Result<Found> {
        let mut from = from;
        loop {
            let data = &self.arena.data()[self.pivot..];
            if from < data.len() {
                if let Some(i) = memchr(needle, &data[from..]) {
                    return Ok(Found::At(from + i));
                }
                from = data.len();
            }
            if !self.fill()? {
                return Ok(Found::Eof(self.end()));
            }
        }
    }

    fn find_seq(&mut self, needle: &[u8], from: usize) -> Result<Found> {
        let mut from = from;
        loop {
            let data = &self.arena.data()[self.pivot..];
            if from < data.len() {
                if let Some(i) = memmem::find(&data[from..], needle) {
                    return Ok(Found::At(from + i));
                }
                // Keep a possible partial match at the tail
                from = from.max((data.len() + 1).saturating_sub(needle.len()));
            }
            if !self.fill()? {
                return Ok(Found::Eof(self.end()));
            }
        }
    }

    /// Move the pivot to the next `needle`, discarding everything before
    /// it. Returns `Ok(false)` if the stream ends first.
    fn skip_to(&mut self, needle: u8) -> Result<bool> {
        loop {
            let data = &self.arena.data()[self.pivot..];
            if let Some(i) = memchr(needle, data) {
                self.advance(i);
                return Ok(true);
            }
            let len = data.len();
            self.advance(len);
            if !self.fill()? {
                return Ok(false);
            }
        }
    }

    /// Drop bytes before `off` and make it the new pivot.
    fn advance(&mut self, off: usize) {
        self.pivot += off;
        self.arena.consume_to(self.pivot);
    }

    /// Consume up to `end` and return the trimmed span `[0, end)`.
    fn take(&mut self, end: usize) -> Span {
        let span = trim(self.arena.data(), Span::new(self.pivot, self.pivot + end));
        self.arena.consume_to(self.pivot + end);
        span
    }

    fn unexpected_end(&self) -> Error {
        Error::UnexpectedEndOfInput {
            offset: self.arena.bytes_read(),
        }
    }
}

/// Scan the next raw unit starting at the arena's consumed cursor.
///
/// `split_text` is set when an element tag is returned without its
/// trailing data; the next call then returns that data as its own unit.
pub(crate) fn scan<R: Read>(arena: &mut ByteArena<R>, split_text: &mut bool) -> Result<Step> {
    let pivot = arena.position();
    let mut cur = Cursor { arena, pivot };

    if std::mem::take(split_text) {
        match cur.find_byte(b'<', 0)? {
            Found::At(lt) => {
                let text = cur.take(lt);
                if !text.is_empty() {
                    return Ok(Step::Unit(text));
                }
            }
            Found::Eof(end) => {
                let text = cur.take(end);
                return Ok(if text.is_empty() {
                    Step::End
                } else {
                    Step::Last(text, None)
                });
            }
        }
    }

    // Anything before the next '<' is not part of a unit
    if !cur.skip_to(b'<')? {
        return Ok(Step::End);
    }

    let mut unit = Unit::Pending;
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut after_eq = false;
    // Comment nested in a DOCTYPE internal subset
    let mut in_comment = false;
    let mut off = 1;
    loop {
        let b = match cur.byte(off)? {
            Some(b) => b,
            None => return Err(cur.unexpected_end()),
        };

        if unit == Unit::Pending {
            unit = match b {
                b'?' => Unit::ProcInst,
                b'!' => Unit::Bang,
                _ => Unit::Element,
            };
            if unit != Unit::Element {
                off += 1;
                continue;
            }
        }

        let closed = match unit {
            Unit::Element => match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                    false
                }
                None => match b {
                    b'"' | b'\'' if after_eq => {
                        quote = Some(b);
                        after_eq = false;
                        false
                    }
                    b'=' => {
                        after_eq = true;
                        false
                    }
                    b' ' | b'\t' | b'\r' | b'\n' => false,
                    b'<' => {
                        after_eq = false;
                        depth += 1;
                        false
                    }
                    b'>' => {
                        after_eq = false;
                        depth -= 1;
                        depth == 0
                    }
                    _ => {
                        after_eq = false;
                        false
                    }
                },
            },
            Unit::ProcInst => b == b'>' && off >= 3 && cur.at(off - 1) == b'?',
            Unit::Comment => {
                b == b'>' && off >= 6 && cur.at(off - 1) == b'-' && cur.at(off - 2) == b'-'
            }
            Unit::CData => {
                b == b'>' && off >= 11 && cur.at(off - 1) == b']' && cur.at(off - 2) == b']'
            }
            Unit::Bang => {
                if off == 3 && b == b'-' && cur.at(2) == b'-' {
                    unit = Unit::Comment;
                    false
                } else if off == CDATA_OPEN.len() - 1
                    && &cur.arena.data()[cur.pivot..cur.pivot + CDATA_OPEN.len()] == CDATA_OPEN
                {
                    unit = Unit::CData;
                    false
                } else if in_comment {
                    if b == b'>' && cur.at(off - 1) == b'-' && cur.at(off - 2) == b'-' {
                        in_comment = false;
                        depth -= 1;
                    }
                    false
                } else if let Some(q) = quote {
                    if b == q {
                        quote = None;
                    }
                    false
                } else {
                    match b {
                        b'"' | b'\'' => {
                            quote = Some(b);
                            false
                        }
                        b'-' if off >= 4
                            && cur.at(off - 1) == b'-'
                            && cur.at(off - 2) == b'!'
                            && cur.at(off - 3) == b'<' =>
                        {
                            in_comment = true;
                            false
                        }
                        b'<' => {
                            depth += 1;
                            false
                        }
                        b'>' => {
                            depth -= 1;
                            depth == 0
                        }
                        _ => false,
                    }
                }
            }
            Unit::Pending => false,
        };

        if closed {
            break;
        }
        off += 1;
    }

    let tag_end = off + 1;
    if unit != Unit::Element {
        return Ok(Step::Unit(cur.take(tag_end)));
    }

    // Element tag: fold in trailing character data. If the limit is hit
    // first, the tag goes out alone and the data follows as its own unit.
    match trailing_data(&mut cur, tag_end) {
        Err(Error::BufferLimitExceeded { .. }) => {
            log::trace!(target: "xmltok::scanner", "tag of {tag_end} bytes split from its data");
            *split_text = true;
            Ok(Step::Unit(cur.take(tag_end)))
        }
        step => step,
    }
}

fn trailing_data<R: Read>(cur: &mut Cursor<'_, R>, tag_end: usize) -> Result<Step> {
    let lt = match cur.find_byte(b'<', tag_end)? {
        Found::At(lt) => lt,
        Found::Eof(end) => return Ok(Step::Last(cur.take(end), None)),
    };

    for (k, &expected) in CDATA_OPEN.iter().enumerate().skip(1) {
        match cur.byte(lt + k)? {
            Some(b) if b == expected => {}
            Some(_) => return Ok(Step::Unit(cur.take(lt))),
            None => {
                let err = cur.unexpected_end();
                return Ok(Step::Last(cur.take(lt), Some(err)));
            }
        }
    }

    match cur.find_seq(CDATA_CLOSE, lt + CDATA_OPEN.len())? {
        Found::At(close) => Ok(Step::Unit(cur.take(close + CDATA_CLOSE.len()))),
        Found::Eof(_) => {
            let err = cur.unexpected_end();
            Ok(Step::Last(cur.take(lt), Some(err)))
        }
    }
}

#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Shrink `span` past leading and trailing XML whitespace.
pub(crate) fn trim(input: &[u8], span: Span) -> Span {
    let mut start = span.start;
    let mut end = span.end;
    while start < end && is_whitespace(input[start]) {
        start += 1;
    }
    while end > start && is_whitespace(input[end - 1]) {
        end -= 1;
    }
    Span::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    fn scan_all(input: &[u8], chunk: usize) -> (Vec<Vec<u8>>, Option<Error>) {
        scan_limited(input, chunk, 1 << 20)
    }

    fn scan_limited(input: &[u8], chunk: usize, limit: usize) -> (Vec<Vec<u8>>, Option<Error>) {
        let mut arena = ByteArena::new(IoCursor::new(input.to_vec()), chunk, limit);
        let mut split_text = false;
        let mut spans = Vec::new();
        loop {
            match scan(&mut arena, &mut split_text) {
                Ok(Step::Unit(span)) => spans.push(span.slice(arena.data()).to_vec()),
                Ok(Step::Last(span, err)) => {
                    spans.push(span.slice(arena.data()).to_vec());
                    return (spans, err);
                }
                Ok(Step::End) => return (spans, None),
                Err(err) => return (spans, Some(err)),
            }
        }
    }

    #[test]
    fn test_self_closing_pair() {
        let (spans, err) = scan_all(b"<a/><b/>", 1);
        assert!(err.is_none());
        assert_eq!(spans, vec![b"<a/>".to_vec(), b"<b/>".to_vec()]);
    }

    #[test]
    fn test_trailing_char_data() {
        let (spans, _) = scan_all(b"<x>hello</x>", 3);
        assert_eq!(spans, vec![b"<x>hello".to_vec(), b"</x>".to_vec()]);
    }

    #[test]
    fn test_cdata_folded_into_tag() {
        let (spans, _) = scan_all(b"<p><![CDATA[a<b]]></p>", 1);
        assert_eq!(spans, vec![b"<p><![CDATA[a<b]]>".to_vec(), b"</p>".to_vec()]);
    }

    #[test]
    fn test_doctype_internal_subset() {
        let input = b"<!DOCTYPE note [\n  <!ENTITY nbsp \"&#xA0;\">\n]>\n<note/>";
        let (spans, _) = scan_all(input, 2);
        assert_eq!(spans[0], b"<!DOCTYPE note [\n  <!ENTITY nbsp \"&#xA0;\">\n]>".to_vec());
        assert_eq!(spans[1], b"<note/>".to_vec());
    }

    #[test]
    fn test_comment_with_brackets() {
        let (spans, _) = scan_all(b"<!-- a > b < c --><r/>", 1);
        assert_eq!(spans, vec![b"<!-- a > b < c -->".to_vec(), b"<r/>".to_vec()]);
    }

    #[test]
    fn test_quoted_brackets_in_attribute() {
        let (spans, _) = scan_all(b"<a x=\"1<2\" y='3>2'>t</a>", 1);
        assert_eq!(spans, vec![b"<a x=\"1<2\" y='3>2'>t".to_vec(), b"</a>".to_vec()]);
    }

    #[test]
    fn test_proc_inst_and_leading_whitespace() {
        let (spans, _) = scan_all(b"  \n<?xml version=\"1.0\"?>\n<r/>\n", 4);
        assert_eq!(spans, vec![b"<?xml version=\"1.0\"?>".to_vec(), b"<r/>".to_vec()]);
    }

    #[test]
    fn test_unterminated_tag() {
        let (spans, err) = scan_all(b"<?xml version=\"1.0\"?><!", 1);
        assert_eq!(spans.len(), 1);
        assert!(matches!(err, Some(Error::UnexpectedEndOfInput { .. })));
    }

    #[test]
    fn test_truncated_cdata_defers_error() {
        let (spans, err) = scan_all(b"<data><![CDATA[text", 1);
        assert_eq!(spans, vec![b"<data>".to_vec()]);
        assert!(matches!(err, Some(Error::UnexpectedEndOfInput { .. })));
    }

    #[test]
    fn test_doctype_quoted_bracket_in_subset() {
        let input = b"<!DOCTYPE r [ <!ENTITY e \"a>b\"> ]><r>x</r>";
        let (spans, err) = scan_all(input, 1);
        assert!(err.is_none());
        assert_eq!(
            spans,
            vec![
                b"<!DOCTYPE r [ <!ENTITY e \"a>b\"> ]>".to_vec(),
                b"<r>x".to_vec(),
                b"</r>".to_vec(),
            ]
        );
    }

    #[test]
    fn test_doctype_nested_comment() {
        let input = b"<!DOCTYPE r [ <!-- it's > 1 --> <!ENTITY e 'x<y'> ]>\n<r/>";
        let (spans, err) = scan_all(input, 3);
        assert!(err.is_none());
        assert_eq!(spans[0], b"<!DOCTYPE r [ <!-- it's > 1 --> <!ENTITY e 'x<y'> ]>".to_vec());
        assert_eq!(spans[1], b"<r/>".to_vec());
    }

    #[test]
    fn test_tag_at_limit_splits_trailing_data() {
        // 16-byte tag under a 16-byte limit
        let (spans, err) = scan_limited(b"<a x=\"yyyyyyyy\">", 4, 16);
        assert!(err.is_none());
        assert_eq!(spans, vec![b"<a x=\"yyyyyyyy\">".to_vec()]);

        let (spans, err) = scan_limited(b"<a x=\"yyyyyyyy\"> tail <b/>", 4, 16);
        assert!(err.is_none());
        assert_eq!(
            spans,
            vec![
                b"<a x=\"yyyyyyyy\">".to_vec(),
                b"tail".to_vec(),
                b"<b/>".to_vec(),
            ]
        );
    }

    #[test]
    fn test_trim() {
        let input = b"\r\n\t <a> \n";
        let span = trim(input, Span::new(0, input.len()));
        assert_eq!(span.slice(input), b"<a>");
    }
}
