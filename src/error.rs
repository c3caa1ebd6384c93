//! Tokenizer errors
//!
//! Every error carries the byte offset (bytes read from the source so far)
//! at which it surfaced. Errors are `Clone` so a tokenizer can replay the
//! same terminal error on every call after the first failure.

use std::io;
use std::sync::Arc;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal tokenizer error. End of stream is not an error; it is
/// reported as `Ok(None)`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The stream ended while a token was structurally incomplete.
    #[error("byte pos {offset}: unexpected end of input")]
    UnexpectedEndOfInput { offset: u64 },

    /// A single token needs more buffered bytes than the configured limit.
    #[error("byte pos {offset}: could not grow buffer to {requested}, max limit is set to {limit}")]
    BufferLimitExceeded {
        offset: u64,
        requested: usize,
        limit: usize,
    },

    /// The byte source reported a failure.
    #[error("byte pos {offset}: read failed: {source}")]
    SourceRead {
        offset: u64,
        #[source]
        source: Arc<io::Error>,
    },
}

/// Coarse classification of [`Error`], handy for matching in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedEndOfInput,
    BufferLimitExceeded,
    SourceRead,
}

impl Error {
    pub(crate) fn source_read(offset: u64, err: io::Error) -> Self {
        Error::SourceRead {
            offset,
            source: Arc::new(err),
        }
    }

    /// Byte offset into the source at which the error surfaced.
    pub fn offset(&self) -> u64 {
        match self {
            Error::UnexpectedEndOfInput { offset }
            | Error::BufferLimitExceeded { offset, .. }
            | Error::SourceRead { offset, .. } => *offset,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedEndOfInput { .. } => ErrorKind::UnexpectedEndOfInput,
            Error::BufferLimitExceeded { .. } => ErrorKind::BufferLimitExceeded,
            Error::SourceRead { .. } => ErrorKind::SourceRead,
        }
    }

    /// The underlying I/O error, for [`Error::SourceRead`].
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::SourceRead { source, .. } => Some(source),
            _ => None,
        }
    }
}
