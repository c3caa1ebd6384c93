//! xmltok - streaming XML tokenizer for single-pass decoders
//!
//! Reads XML 1.0 text from any [`std::io::Read`] source in small chunks and
//! hands out one token per call. A token is a tag together with the
//! character data that directly follows it, or a ProcInst, Directive or
//! Comment kept verbatim:
//!
//! ```
//! use xmltok::Tokenizer;
//!
//! let mut tok = Tokenizer::new(&b"<trkpt lat=\"-7.18\"><ele>12</ele></trkpt>"[..]);
//! let token = tok.next_token()?.unwrap();
//! assert_eq!(token.name().local, b"trkpt");
//! assert_eq!(token.attr(b"lat"), Some(&b"-7.18"[..]));
//! let token = tok.next_token()?.unwrap();
//! assert_eq!(token.data(), b"12");
//! # Ok::<(), xmltok::Error>(())
//! ```
//!
//! Tokens borrow the tokenizer's buffer and are only valid until the next
//! call. A decoder that must keep a start tag while it reads the element's
//! children copies it into an [`OwnedToken`] taken from a [`TokenPool`].
//!
//! Entity and character references are returned as written; namespace
//! prefixes are split lexically and never resolved.

mod config;
mod core;
mod error;
mod pool;
mod reader;

pub use crate::config::{
    Config, DEFAULT_ATTR_CAPACITY_HINT, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_READ_CHUNK_SIZE,
};
pub use crate::core::token::{Attr, Attrs, Name, Token, TokenKind};
pub use crate::core::tokenizer::{OwnedTokens, Tokenizer};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::pool::{OwnedToken, TokenPool};
