//! Core XML tokenizing primitives
//!
//! - Span: byte ranges into the arena
//! - Scanner: raw unit boundaries with CDATA-aware lookahead, memchr based
//! - Attributes: lenient attribute parsing into spans
//! - Token: scratch storage and the borrowed views handed to callers
//! - Tokenizer: field extraction and the public pull API

pub(crate) mod attributes;
pub(crate) mod scanner;
pub(crate) mod span;
pub mod token;
pub mod tokenizer;
