//! Byte arena backing every in-flight token view.
//!
//! Reads from any source implementing `Read` into one growable buffer.
//! Consumed bytes are only reclaimed when more input is needed: the
//! unconsumed tail is shifted to offset 0 and the buffer then grows by one
//! read chunk, never past the configured limit.

use std::io::{self, Read};

use crate::error::{Error, Result};

/// Growable, compacting read buffer
pub(crate) struct ByteArena<R> {
    source: R,
    /// Filled bytes; `buffer.len()` is the end of valid data
    buffer: Vec<u8>,
    /// Consumed cursor
    pos: usize,
    /// Total bytes read from the source
    read: u64,
    chunk: usize,
    limit: usize,
}

impl<R> ByteArena<R> {
    pub fn new(source: R, chunk: usize, limit: usize) -> Self {
        ByteArena {
            source,
            buffer: Vec::with_capacity(chunk),
            pos: 0,
            read: 0,
            chunk,
            limit,
        }
    }

    /// Rebind to a new source, keeping the allocated buffer.
    pub fn reset(&mut self, source: R, chunk: usize, limit: usize) -> R {
        self.buffer.clear();
        self.pos = 0;
        self.read = 0;
        self.chunk = chunk;
        self.limit = limit;
        std::mem::replace(&mut self.source, source)
    }

    /// Currently buffered bytes, consumed or not.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Mark everything before `pos` as consumed.
    #[inline]
    pub fn consume_to(&mut self, pos: usize) {
        self.pos = pos.min(self.buffer.len());
    }

    #[inline]
    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn into_source(self) -> R {
        self.source
    }

    /// Shift `buffer[pivot..]` to offset 0.
    fn compact(&mut self, pivot: usize) {
        if pivot == 0 {
            return;
        }
        let remaining = self.buffer.len() - pivot;
        if remaining > 0 {
            self.buffer.copy_within(pivot.., 0);
        }
        self.buffer.truncate(remaining);
        self.pos = self.pos.saturating_sub(pivot);
        log::trace!(target: "xmltok::arena", "compacted {pivot} bytes, {remaining} kept");
    }
}

impl<R: Read> ByteArena<R> {
    /// Make more bytes available after the current end.
    ///
    /// Everything before `*pivot` is discarded and `*pivot` becomes 0.
    /// Returns `Ok(false)` when the source is exhausted.
    pub fn fill(&mut self, pivot: &mut usize) -> Result<bool> {
        self.compact(*pivot);
        *pivot = 0;

        let start = self.buffer.len();
        if start >= self.limit {
            return Err(Error::BufferLimitExceeded {
                offset: self.read,
                requested: start + self.chunk,
                limit: self.limit,
            });
        }

        let end = (start + self.chunk).min(self.limit);
        if end > self.buffer.capacity() {
            self.buffer.reserve(end - start);
            log::trace!(
                target: "xmltok::arena",
                "grew buffer to {} bytes (limit {})",
                self.buffer.capacity(),
                self.limit
            );
        }
        self.buffer.resize(end, 0);

        loop {
            match self.source.read(&mut self.buffer[start..end]) {
                Ok(n) => {
                    self.buffer.truncate(start + n);
                    self.read += n as u64;
                    return Ok(n > 0);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.buffer.truncate(start);
                    return Err(Error::source_read(self.read, err));
                }
            }
        }
    }
}
