//! XML Tokenizer - pull-based token extraction over a byte stream
//!
//! Each call scans one raw unit out of the arena and fills the scratch
//! token from it:
//! - ProcInst, Directive and Comment units are kept verbatim as data
//! - element tags get name, attributes and flags, plus the character data
//!   that follows the tag (CDATA markers stripped)
//!
//! Entity and character references are never decoded.

use std::io::Read;

use super::attributes::{parse_attributes, split_name};
use super::scanner::{self, is_whitespace, trim, Step, CDATA_CLOSE, CDATA_OPEN};
use super::span::Span;
use super::token::{Token, TokenSpans};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pool::OwnedToken;
use crate::reader::ByteArena;

/// Stream state between calls
#[derive(Debug)]
enum State {
    Live,
    Ended,
    Failed(Error),
}

/// Streaming XML tokenizer over any [`Read`] source.
///
/// Not meant for concurrent use: every call mutates the arena and the
/// scratch token in place. Use one instance per stream, or [`reset`] to
/// reuse the grown buffer for the next document.
///
/// [`reset`]: Tokenizer::reset
pub struct Tokenizer<R> {
    arena: ByteArena<R>,
    config: Config,
    token: TokenSpans,
    state: State,
    /// Last tag was returned without its trailing data
    split_text: bool,
}

impl<R: Read> Tokenizer<R> {
    /// Create a tokenizer with the default [`Config`].
    pub fn new(source: R) -> Self {
        Self::with_config(source, Config::default())
    }

    pub fn with_config(source: R, config: Config) -> Self {
        let config = config.normalized();
        Tokenizer {
            arena: ByteArena::new(source, config.read_chunk_size, config.max_buffer_size),
            token: TokenSpans::with_attr_capacity(config.attr_capacity_hint),
            config,
            state: State::Live,
            split_text: false,
        }
    }

    /// Rebind to a new source, clearing any sticky error and keeping the
    /// already-grown buffer and attribute storage. Returns the old source.
    pub fn reset(&mut self, source: R, config: Config) -> R {
        self.config = config.normalized();
        self.state = State::Live;
        self.split_text = false;
        self.token.clear();
        let additional = self
            .config
            .attr_capacity_hint
            .saturating_sub(self.token.attrs.capacity());
        self.token.attrs.reserve(additional);
        log::debug!(
            target: "xmltok::tokenizer",
            "reset after {} bytes, buffer capacity {}",
            self.arena.bytes_read(),
            self.arena.capacity()
        );
        self.arena.reset(
            source,
            self.config.read_chunk_size,
            self.config.max_buffer_size,
        )
    }

    /// Next token, `Ok(None)` at end of stream.
    ///
    /// After an error every later call returns that same error until
    /// [`reset`](Self::reset).
    pub fn next_token(&mut self) -> Result<Option<Token<'_>>> {
        let span = match self.advance()? {
            Some(span) => span,
            None => return Ok(None),
        };
        let buf = self.arena.data();
        extract(buf, span, &mut self.token);
        Ok(Some(Token::new(buf, &self.token)))
    }

    /// Raw bytes of the next unit without field extraction.
    pub fn next_raw_span(&mut self) -> Result<Option<&[u8]>> {
        match self.advance()? {
            Some(span) => Ok(Some(span.slice(self.arena.data()))),
            None => Ok(None),
        }
    }

    /// Iterate over owned copies of the remaining tokens.
    pub fn owned_tokens(&mut self) -> OwnedTokens<'_, R> {
        OwnedTokens {
            tokenizer: self,
            done: false,
        }
    }

    fn advance(&mut self) -> Result<Option<Span>> {
        match &self.state {
            State::Live => {}
            State::Ended => return Ok(None),
            State::Failed(err) => return Err(err.clone()),
        }

        match scanner::scan(&mut self.arena, &mut self.split_text) {
            Ok(Step::Unit(span)) => Ok(Some(span)),
            Ok(Step::Last(span, deferred)) => {
                self.state = match deferred {
                    Some(err) => self.fail(err),
                    None => State::Ended,
                };
                Ok(Some(span))
            }
            Ok(Step::End) => {
                self.state = State::Ended;
                Ok(None)
            }
            Err(err) => {
                self.state = self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn fail(&self, err: Error) -> State {
        log::debug!(target: "xmltok::tokenizer", "tokenizer failed: {err}");
        State::Failed(err)
    }
}

impl<R> Tokenizer<R> {
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Total bytes read from the current source
    #[inline]
    pub fn bytes_read(&self) -> u64 {
        self.arena.bytes_read()
    }

    /// Allocated size of the read buffer
    #[inline]
    pub fn buffer_capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn into_inner(self) -> R {
        self.arena.into_source()
    }
}

/// Iterator returned by [`Tokenizer::owned_tokens`]
pub struct OwnedTokens<'a, R> {
    tokenizer: &'a mut Tokenizer<R>,
    done: bool,
}

impl<R: Read> Iterator for OwnedTokens<'_, R> {
    type Item = Result<OwnedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.tokenizer.next_token() {
            Ok(Some(token)) => Some(Ok(token.to_owned_token())),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Fill `token` from the raw unit at `span`.
pub(crate) fn extract(buf: &[u8], span: Span, token: &mut TokenSpans) {
    token.clear();
    let raw = span.slice(buf);

    // Markup is kept verbatim; a unit not starting with '<' is text split
    // off its tag at the buffer limit
    if raw.starts_with(b"<?") || raw.starts_with(b"<!") || raw.first() != Some(&b'<') {
        token.data = span;
        token.self_closing = raw.first() == Some(&b'<');
        return;
    }

    let base = span.start;
    let mut pos = 1;
    if raw.get(1) == Some(&b'/') {
        token.end_element = true;
        pos = 2;
    }
    let name_start = pos;
    while pos < raw.len() && !is_tag_name_end(raw[pos]) {
        pos += 1;
    }
    token.name = split_name(raw, name_start, pos, base);

    let end = parse_attributes(raw, pos, base, &mut token.attrs);
    token.self_closing = end.self_closing;
    if end.self_closing {
        return;
    }

    let rest = trim(buf, Span::new(base + end.after, span.end));
    token.data = strip_cdata(buf, rest);
}

#[inline]
fn is_tag_name_end(b: u8) -> bool {
    is_whitespace(b) || b == b'>' || b == b'/'
}

/// Drop `<![CDATA[` and `]]>` when they wrap the whole span.
fn strip_cdata(buf: &[u8], span: Span) -> Span {
    let bytes = span.slice(buf);
    if bytes.len() >= CDATA_OPEN.len() + CDATA_CLOSE.len()
        && bytes.starts_with(CDATA_OPEN)
        && bytes.ends_with(CDATA_CLOSE)
    {
        return Span::new(
            span.start + CDATA_OPEN.len(),
            span.end - CDATA_CLOSE.len(),
        );
    }
    span
}
