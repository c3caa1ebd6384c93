//! Span - byte range into the tokenizer's arena
//!
//! Token fields are stored as spans so the scratch token can be reused
//! without holding borrows of the buffer between calls.

/// A half-open byte range `[start, end)` into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const EMPTY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Extract the byte slice from input
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        if self.is_empty() || self.end > input.len() {
            return &[];
        }
        &input[self.start..self.end]
    }

    /// Move a span that lies inside `outer` so that `outer` starts at
    /// `new_start` instead.
    #[inline]
    pub fn rebase(&self, outer: Span, new_start: usize) -> Span {
        if self.is_empty() {
            return Span::EMPTY;
        }
        let start = new_start + (self.start - outer.start);
        Span::new(start, start + self.len())
    }
}
