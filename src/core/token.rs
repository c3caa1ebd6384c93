//! Token types
//!
//! The tokenizer keeps one scratch [`TokenSpans`] whose fields are byte
//! ranges into its arena. Callers see it through [`Token`], a borrowed view
//! that lives until the next call on the tokenizer.

use std::fmt;

use super::scanner::{trim, CDATA_CLOSE, CDATA_OPEN};
use super::span::Span;

/// Spans of a `prefix:local` name. `prefix` and `local` lie inside `full`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NameSpans {
    pub prefix: Span,
    pub local: Span,
    pub full: Span,
}

impl NameSpans {
    pub fn rebase(&self, new_start: usize) -> NameSpans {
        NameSpans {
            prefix: self.prefix.rebase(self.full, new_start),
            local: self.local.rebase(self.full, new_start),
            full: self.full.rebase(self.full, new_start),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AttrSpans {
    pub name: NameSpans,
    pub value: Span,
}

/// Reusable token storage
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenSpans {
    pub name: NameSpans,
    pub attrs: Vec<AttrSpans>,
    pub data: Span,
    pub self_closing: bool,
    pub end_element: bool,
}

impl TokenSpans {
    pub fn with_attr_capacity(capacity: usize) -> Self {
        TokenSpans {
            attrs: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Reset every field, keeping the attribute list's capacity.
    pub fn clear(&mut self) {
        self.name = NameSpans::default();
        self.attrs.clear();
        self.data = Span::EMPTY;
        self.self_closing = false;
        self.end_element = false;
    }
}

/// An XML name, split lexically at the first `:`.
///
/// `full` is `prefix:local` when a prefix is present, else just `local`.
/// No namespace binding is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Name<'t> {
    pub prefix: &'t [u8],
    pub local: &'t [u8],
    pub full: &'t [u8],
}

impl<'t> Name<'t> {
    fn from_spans(buf: &'t [u8], spans: &NameSpans) -> Self {
        Name {
            prefix: spans.prefix.slice(buf),
            local: spans.local.slice(buf),
            full: spans.full.slice(buf),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    /// The full name as UTF-8, if valid
    pub fn as_str(&self) -> Option<&'t str> {
        std::str::from_utf8(self.full).ok()
    }

    /// The local name as UTF-8, if valid
    pub fn local_str(&self) -> Option<&'t str> {
        std::str::from_utf8(self.local).ok()
    }
}

/// An attribute; the value is returned verbatim, entities unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr<'t> {
    pub name: Name<'t>,
    pub value: &'t [u8],
}

impl<'t> Attr<'t> {
    pub fn value_str(&self) -> Option<&'t str> {
        std::str::from_utf8(self.value).ok()
    }
}

/// Iterator over a token's attributes in document order
#[derive(Clone)]
pub struct Attrs<'t> {
    buf: &'t [u8],
    iter: std::slice::Iter<'t, AttrSpans>,
}

impl<'t> Iterator for Attrs<'t> {
    type Item = Attr<'t>;

    #[inline]
    fn next(&mut self) -> Option<Attr<'t>> {
        let spans = self.iter.next()?;
        Some(Attr {
            name: Name::from_spans(self.buf, &spans.name),
            value: spans.value.slice(self.buf),
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for Attrs<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let spans = self.iter.next_back()?;
        Some(Attr {
            name: Name::from_spans(self.buf, &spans.name),
            value: spans.value.slice(self.buf),
        })
    }
}

impl ExactSizeIterator for Attrs<'_> {}

/// Lexical classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<?target ...?>`
    ProcInst,
    /// `<!DOCTYPE ...>` and other `<!...>` constructs
    Directive,
    /// `<!--...-->`
    Comment,
    /// `<![CDATA[...]]>` not attached to an element tag
    CData,
    /// `<name ...>`
    StartElement,
    /// `</name>`
    EndElement,
    /// `<name .../>`
    EmptyElement,
    /// Character data returned on its own because its element tag
    /// already filled the buffer limit
    Text,
}

/// One lexical unit, borrowed from the tokenizer (or an
/// [`OwnedToken`](crate::OwnedToken)).
///
/// Every slice reachable from a `Token` is valid only until the next
/// `next_token`/`next_raw_span` call; the borrow checker enforces this.
#[derive(Clone, Copy)]
pub struct Token<'t> {
    pub(crate) buf: &'t [u8],
    pub(crate) spans: &'t TokenSpans,
}

impl<'t> Token<'t> {
    #[inline]
    pub(crate) fn new(buf: &'t [u8], spans: &'t TokenSpans) -> Self {
        Token { buf, spans }
    }

    /// Element name; empty for ProcInst, Directive, Comment and text.
    #[inline]
    pub fn name(&self) -> Name<'t> {
        Name::from_spans(self.buf, &self.spans.name)
    }

    #[inline]
    pub fn attrs(&self) -> Attrs<'t> {
        Attrs {
            buf: self.buf,
            iter: self.spans.attrs.iter(),
        }
    }

    /// Value of the first attribute whose full name is `full_name`
    pub fn attr(&self, full_name: &[u8]) -> Option<&'t [u8]> {
        self.attrs()
            .find(|attr| attr.name.full == full_name)
            .map(|attr| attr.value)
    }

    /// Character data after a start tag (CDATA markers stripped), or the
    /// verbatim text of a ProcInst, Directive or Comment.
    #[inline]
    pub fn data(&self) -> &'t [u8] {
        self.spans.data.slice(self.buf)
    }

    pub fn data_str(&self) -> Option<&'t str> {
        std::str::from_utf8(self.data()).ok()
    }

    /// True for `<x/>` and for ProcInst, Directive and Comment tokens.
    #[inline]
    pub fn is_self_closing(&self) -> bool {
        self.spans.self_closing
    }

    #[inline]
    pub fn is_end_element(&self) -> bool {
        self.spans.end_element
    }

    /// True if this is the end tag matching `start`.
    #[inline]
    pub fn is_end_element_of(&self, start: &Token<'_>) -> bool {
        self.is_end_element() && self.name().full == start.name().full
    }

    pub fn kind(&self) -> TokenKind {
        if !self.spans.name.full.is_empty() {
            return if self.is_end_element() {
                TokenKind::EndElement
            } else if self.is_self_closing() {
                TokenKind::EmptyElement
            } else {
                TokenKind::StartElement
            };
        }
        let data = self.data();
        if data.starts_with(b"<?") {
            TokenKind::ProcInst
        } else if data.starts_with(b"<!--") {
            TokenKind::Comment
        } else if data.starts_with(CDATA_OPEN) {
            TokenKind::CData
        } else if data.starts_with(b"<!") {
            TokenKind::Directive
        } else {
            TokenKind::Text
        }
    }

    /// Body of a ProcInst, Directive, Comment or CDATA token with its
    /// delimiters stripped and trimmed: `<!-- hi -->` gives `hi`.
    /// Other tokens return [`data`](Self::data).
    pub fn markup_content(&self) -> &'t [u8] {
        let data = self.data();
        let (open, close): (usize, usize) = match self.kind() {
            TokenKind::ProcInst => (2, 2),
            TokenKind::Comment => (4, 3),
            TokenKind::CData => (CDATA_OPEN.len(), CDATA_CLOSE.len()),
            TokenKind::Directive => (2, 1),
            _ => return data,
        };
        if data.len() < open + close {
            return &[];
        }
        let inner = &data[open..data.len() - close];
        trim(inner, Span::new(0, inner.len())).slice(inner)
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.data() == other.data()
            && self.is_self_closing() == other.is_self_closing()
            && self.is_end_element() == other.is_end_element()
            && self.attrs().eq(other.attrs())
    }
}

impl Eq for Token<'_> {}

struct Lossy<'a>(&'a [u8]);

impl fmt::Debug for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&String::from_utf8_lossy(self.0), f)
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        let attrs: Vec<_> = self
            .attrs()
            .map(|a| (Lossy(a.name.full), Lossy(a.value)))
            .collect();
        f.debug_struct("Token")
            .field("name", &Lossy(name.full))
            .field("attrs", &attrs)
            .field("data", &Lossy(self.data()))
            .field("self_closing", &self.is_self_closing())
            .field("end_element", &self.is_end_element())
            .finish()
    }
}
