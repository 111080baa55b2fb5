//! # affix-trie
//!
//! Prefix-and-suffix queries over a fixed set of equal-length words.
//!
//! Every word in a [`Corpus`] has the same length `L` and a unique identity
//! in `0..N`. A query names a prefix `P` and a suffix `S` with
//! `|P| + |S| <= L` and gets back the identity of every word that starts with
//! `P` and ends with `S`, whatever lies in between.
//!
//! Two trie engines answer these queries:
//!
//! - [`DualTrieIndex`]: a trie over the words and one over their reversals.
//! - [`MixedTrieIndex`]: one trie over words stored in front/back
//!   interleaved order.
//!
//! Both run on either trie storage: [`ArenaStorage`] (one node vector) or
//! [`PointerStorage`] (one allocation per node). [`AffixIndex`] picks an
//! engine and storage at runtime from a [`Config`].
//!
//! ## Example
//!
//! ```rust
//! use affix_trie::{AffixIndex, AffixMatcher, Config, Corpus};
//!
//! let corpus = Corpus::from_words(["foo", "bar", "baz", "qux", "qax"]).unwrap();
//! let index = AffixIndex::build(&corpus, &Config::default()).unwrap();
//!
//! assert_eq!(index.collect(b"b", b"").unwrap(), vec![1, 2]);
//! assert_eq!(index.collect(b"q", b"x").unwrap(), vec![3, 4]);
//! assert_eq!(index.collect(b"", b"r").unwrap(), vec![1]);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod corpus;
pub mod dual;
pub mod error;
mod fanout;
pub mod mixed;
pub mod query;
pub mod storage;

pub use config::{Config, EngineKind, StorageKind};
pub use corpus::Corpus;
pub use dual::DualTrieIndex;
pub use error::{Error, Result};
pub use fanout::FAN_OUT_INLINE_FRAMES;
pub use mixed::{deinterleave, interleave, MixedTrieIndex, PLACEHOLDER};
pub use query::{AffixMatcher, QueryScratch};
pub use storage::{ArenaStorage, PointerStorage, TrieStorage};

/// An index whose engine and storage were chosen at runtime.
pub enum AffixIndex {
    DualArena(DualTrieIndex<ArenaStorage>),
    DualPointer(DualTrieIndex<PointerStorage>),
    MixedArena(MixedTrieIndex<ArenaStorage>),
    MixedPointer(MixedTrieIndex<PointerStorage>),
}

impl AffixIndex {
    /// Build the engine and storage named by `config` over `corpus`.
    pub fn build(corpus: &Corpus, config: &Config) -> Result<Self> {
        let arena = || match config.node_capacity {
            Some(nodes) => ArenaStorage::with_capacity(nodes),
            None => Ok(ArenaStorage::new()),
        };

        let index = match (config.engine, config.storage) {
            (EngineKind::Dual, StorageKind::Arena) => {
                Self::DualArena(DualTrieIndex::with_storage(corpus, arena()?)?)
            }
            (EngineKind::Dual, StorageKind::Pointer) => {
                Self::DualPointer(DualTrieIndex::build(corpus)?)
            }
            (EngineKind::Mixed, StorageKind::Arena) => {
                Self::MixedArena(MixedTrieIndex::with_storage(corpus, arena()?)?)
            }
            (EngineKind::Mixed, StorageKind::Pointer) => {
                Self::MixedPointer(MixedTrieIndex::build(corpus)?)
            }
        };
        Ok(index)
    }

    /// Engine behind this index.
    pub fn engine(&self) -> EngineKind {
        match self {
            Self::DualArena(_) | Self::DualPointer(_) => EngineKind::Dual,
            Self::MixedArena(_) | Self::MixedPointer(_) => EngineKind::Mixed,
        }
    }

    /// Node storage behind this index.
    pub fn storage(&self) -> StorageKind {
        match self {
            Self::DualArena(_) | Self::MixedArena(_) => StorageKind::Arena,
            Self::DualPointer(_) | Self::MixedPointer(_) => StorageKind::Pointer,
        }
    }

    /// Report every word starting with `prefix` and ending with `suffix`.
    pub fn query<F>(&self, prefix: &[u8], suffix: &[u8], on_match: F) -> Result<usize>
    where
        F: FnMut(u32),
    {
        match self {
            Self::DualArena(index) => index.query(prefix, suffix, on_match),
            Self::DualPointer(index) => index.query(prefix, suffix, on_match),
            Self::MixedArena(index) => index.query(prefix, suffix, on_match),
            Self::MixedPointer(index) => index.query(prefix, suffix, on_match),
        }
    }

    /// Number of trie nodes.
    pub fn node_count(&self) -> usize {
        match self {
            Self::DualArena(index) => index.node_count(),
            Self::DualPointer(index) => index.node_count(),
            Self::MixedArena(index) => index.node_count(),
            Self::MixedPointer(index) => index.node_count(),
        }
    }

    /// Approximate bytes held by the tries.
    pub fn memory_usage(&self) -> usize {
        match self {
            Self::DualArena(index) => index.memory_usage(),
            Self::DualPointer(index) => index.memory_usage(),
            Self::MixedArena(index) => index.memory_usage(),
            Self::MixedPointer(index) => index.memory_usage(),
        }
    }
}

impl AffixMatcher for AffixIndex {
    fn len(&self) -> usize {
        match self {
            Self::DualArena(index) => index.len(),
            Self::DualPointer(index) => index.len(),
            Self::MixedArena(index) => index.len(),
            Self::MixedPointer(index) => index.len(),
        }
    }

    fn word_length(&self) -> usize {
        match self {
            Self::DualArena(index) => index.word_length(),
            Self::DualPointer(index) => index.word_length(),
            Self::MixedArena(index) => index.word_length(),
            Self::MixedPointer(index) => index.word_length(),
        }
    }

    fn query_dyn(&self, prefix: &[u8], suffix: &[u8], on_match: &mut dyn FnMut(u32)) -> Result<usize> {
        self.query(prefix, suffix, on_match)
    }
}

impl std::fmt::Debug for AffixIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffixIndex")
            .field("engine", &self.engine())
            .field("storage", &self.storage())
            .field("len", &self.len())
            .field("word_length", &self.word_length())
            .field("nodes", &self.node_count())
            .finish()
    }
}


#[cfg(test)]
mod proptests;
