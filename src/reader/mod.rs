//! Byte source handling
//!
//! - ByteArena: compacting, bounded read buffer shared by all token views

pub(crate) mod buffered;

pub(crate) use buffered::ByteArena;
