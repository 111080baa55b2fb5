//! Error handling for affix-trie.
//!
//! Every fallible operation in the crate returns [`Result`]. Contract
//! violations are rejected at the corpus or query boundary; resource
//! exhaustion surfaces as [`Error::Allocation`] or [`Error::NodeLimit`].
//! A query that matches nothing is not an error.

use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A corpus word does not have the corpus word length.
    #[error("word {index} has length {actual}, expected {expected}")]
    WordLength {
        /// Position of the word in the input
        index: usize,
        /// Corpus word length
        expected: usize,
        /// Length of the offending word
        actual: usize,
    },

    /// A corpus word contains a byte outside `a..=z`.
    #[error("word {index} has byte {byte:#04x} at position {position}, expected a..=z")]
    InvalidByte {
        /// Position of the word in the input
        index: usize,
        /// Offset of the byte within the word
        position: usize,
        /// The offending byte
        byte: u8,
    },

    /// Two corpus entries carry the same word.
    #[error("identities {first} and {second} are bound to the same word")]
    DuplicateWord {
        /// Identity of the entry that sorts first
        first: u32,
        /// Identity of the other entry
        second: u32,
    },

    /// Two corpus entries carry the same identity.
    #[error("identity {id} is bound to more than one word")]
    DuplicateIdentity {
        /// The repeated identity
        id: u32,
    },

    /// An identity is not in `0..count`.
    #[error("identity {id} is out of range for a corpus of {count} words")]
    IdentityOutOfRange {
        /// The offending identity
        id: u32,
        /// Number of words in the corpus
        count: usize,
    },

    /// More words than a `u32` identity can address.
    #[error("corpus of {count} words does not fit 32-bit identities")]
    TooManyWords {
        /// Number of words offered
        count: usize,
    },

    /// A concatenated buffer is not a whole number of words.
    #[error("buffer of {len} bytes cannot be split into words of length {length}")]
    ConcatenatedLength {
        /// Buffer length
        len: usize,
        /// Requested word length
        length: usize,
    },

    /// Prefix and suffix together are longer than the indexed words.
    #[error("prefix of {prefix} and suffix of {suffix} bytes exceed word length {length}")]
    AffixTooLong {
        /// Prefix length
        prefix: usize,
        /// Suffix length
        suffix: usize,
        /// Indexed word length
        length: usize,
    },

    /// A query affix contains a byte outside `a..=z`.
    #[error("query byte {byte:#04x} at position {position} is outside a..=z")]
    InvalidQueryByte {
        /// Offset within the prefix followed by the suffix
        position: usize,
        /// The offending byte
        byte: u8,
    },

    /// A query was issued from inside a match callback of the same index.
    #[error("index is already running a query on its internal scratch buffer")]
    ReentrantQuery,

    /// Memory allocation failed.
    #[error("memory allocation failed: requested {bytes} bytes")]
    Allocation {
        /// Number of bytes requested
        bytes: usize,
    },

    /// Arena storage ran out of 32-bit node indices.
    #[error("trie arena is full: node indices exhausted")]
    NodeLimit,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
