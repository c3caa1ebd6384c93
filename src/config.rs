//! Tokenizer configuration

/// Bytes requested from the source per refill.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4 << 10;
/// Hard ceiling on bytes buffered for a single token.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1000 << 10;
/// Initial capacity of the scratch token's attribute list.
pub const DEFAULT_ATTR_CAPACITY_HINT: usize = 16;

/// Buffer and attribute sizing for a [`Tokenizer`](crate::Tokenizer).
///
/// Zero values mean "use the default". A `max_buffer_size` smaller than
/// `read_chunk_size` is raised to match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub read_chunk_size: usize,
    pub max_buffer_size: usize,
    pub attr_capacity_hint: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            attr_capacity_hint: DEFAULT_ATTR_CAPACITY_HINT,
        }
    }
}

impl Config {
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    pub fn with_attr_capacity_hint(mut self, size: usize) -> Self {
        self.attr_capacity_hint = size;
        self
    }

    /// Apply defaults to zero fields and raise the buffer limit to at
    /// least one read chunk.
    pub fn normalized(self) -> Self {
        let read_chunk_size = non_zero_or(self.read_chunk_size, DEFAULT_READ_CHUNK_SIZE);
        let max_buffer_size =
            non_zero_or(self.max_buffer_size, DEFAULT_MAX_BUFFER_SIZE).max(read_chunk_size);
        Config {
            read_chunk_size,
            max_buffer_size,
            attr_capacity_hint: non_zero_or(self.attr_capacity_hint, DEFAULT_ATTR_CAPACITY_HINT),
        }
    }
}

#[inline]
fn non_zero_or(value: usize, default: usize) -> usize {
    if value == 0 {
        default
    } else {
        value
    }
}
