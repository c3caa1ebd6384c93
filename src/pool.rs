//! Owned tokens and the free-list they are recycled through.
//!
//! A decoder that descends into an element keeps a copy of the element's
//! start tag while the children advance the same tokenizer. Copies come
//! from a [`TokenPool`] so that steady-state decoding does not allocate.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::span::Span;
use crate::core::token::{Token, TokenSpans};

/// A token that owns its bytes.
///
/// Name, attributes and data are copied into one reusable buffer; clearing
/// keeps the buffer's capacity.
#[derive(Debug, Clone, Default)]
pub struct OwnedToken {
    bytes: Vec<u8>,
    spans: TokenSpans,
}

impl OwnedToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `src` into this token, replacing its contents.
    pub fn copy_from(&mut self, src: &Token<'_>) -> &mut Self {
        self.clear();
        let buf = src.buf;
        let spans = src.spans;

        self.spans.name = spans.name.rebase(self.bytes.len());
        self.bytes.extend_from_slice(spans.name.full.slice(buf));

        for attr in &spans.attrs {
            let mut copied = *attr;
            copied.name = attr.name.rebase(self.bytes.len());
            self.bytes.extend_from_slice(attr.name.full.slice(buf));
            copied.value = self.push(attr.value.slice(buf));
            self.spans.attrs.push(copied);
        }

        self.spans.data = self.push(spans.data.slice(buf));
        self.spans.self_closing = spans.self_closing;
        self.spans.end_element = spans.end_element;
        self
    }

    fn push(&mut self, bytes: &[u8]) -> Span {
        if bytes.is_empty() {
            return Span::EMPTY;
        }
        let start = self.bytes.len();
        self.bytes.extend_from_slice(bytes);
        Span::new(start, self.bytes.len())
    }

    /// Borrow this token through the same view the tokenizer hands out.
    #[inline]
    pub fn as_token(&self) -> Token<'_> {
        Token::new(&self.bytes, &self.spans)
    }

    /// Empty the token, keeping its storage.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.spans.clear();
    }
}

impl PartialEq for OwnedToken {
    fn eq(&self, other: &Self) -> bool {
        self.as_token() == other.as_token()
    }
}

impl Eq for OwnedToken {}

impl<'t> From<Token<'t>> for OwnedToken {
    fn from(token: Token<'t>) -> Self {
        token.to_owned_token()
    }
}

impl Token<'_> {
    /// Copy this token into a freshly allocated [`OwnedToken`].
    pub fn to_owned_token(&self) -> OwnedToken {
        let mut owned = OwnedToken::new();
        owned.copy_from(self);
        owned
    }
}

/// Thread-safe free-list of [`OwnedToken`]s.
///
/// Acquire and release are explicit; a token that is never released is
/// simply dropped. A pool can live in a `static`, an `Arc`, or on the
/// stack of the decoding call.
#[derive(Debug, Default)]
pub struct TokenPool {
    free: Mutex<Vec<OwnedToken>>,
}

impl TokenPool {
    pub const fn new() -> Self {
        TokenPool {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Take an empty token, reusing released storage when available.
    pub fn acquire(&self) -> OwnedToken {
        self.lock().pop().unwrap_or_default()
    }

    /// Take a token holding a copy of `src`.
    pub fn acquire_copy(&self, src: &Token<'_>) -> OwnedToken {
        let mut token = self.acquire();
        token.copy_from(src);
        token
    }

    /// Return a token for reuse.
    pub fn release(&self, mut token: OwnedToken) {
        token.clear();
        self.lock().push(token);
    }

    /// Number of tokens waiting to be reused
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OwnedToken>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tokenizer;

    #[test]
    fn test_copy_survives_next_token() {
        let pool = TokenPool::new();
        let mut tok = Tokenizer::new(&b"<trkpt lat=\"-7.18\" lon=\"110.34\"><ele>12</ele></trkpt>"[..]);

        let start = {
            let token = tok.next_token().unwrap().unwrap();
            pool.acquire_copy(&token)
        };
        let child = tok.next_token().unwrap().unwrap();
        assert_eq!(child.name().local, b"ele");

        let start = start.as_token();
        assert_eq!(start.name().full, b"trkpt");
        assert_eq!(start.attr(b"lat"), Some(&b"-7.18"[..]));
        assert_eq!(start.attr(b"lon"), Some(&b"110.34"[..]));
    }

    #[test]
    fn test_copy_keeps_prefix_split() {
        let mut tok = Tokenizer::new(&b"<gpxtpx:hr xsi:type=\"x\">140</gpxtpx:hr>"[..]);
        let owned = tok.next_token().unwrap().unwrap().to_owned_token();
        let token = owned.as_token();
        assert_eq!(token.name().prefix, b"gpxtpx");
        assert_eq!(token.name().local, b"hr");
        let attr = token.attrs().next().unwrap();
        assert_eq!(attr.name.prefix, b"xsi");
        assert_eq!(attr.name.local, b"type");
        assert_eq!(attr.value, b"x");
        assert_eq!(token.data(), b"140");
    }

    #[test]
    fn test_release_then_acquire_reuses_storage() {
        let pool = TokenPool::new();
        let mut token = pool.acquire();
        let mut tok = Tokenizer::new(&b"<a b=\"c\">d</a>"[..]);
        token.copy_from(&tok.next_token().unwrap().unwrap());
        pool.release(token);
        assert_eq!(pool.idle(), 1);

        let token = pool.acquire();
        assert_eq!(pool.idle(), 0);
        let view = token.as_token();
        assert!(view.name().is_empty());
        assert_eq!(view.attrs().len(), 0);
        assert!(view.data().is_empty());
    }
}
