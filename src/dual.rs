//! Dual-trie index: one trie over the words and one over the reversed words.
//!
//! A query descends whichever trie lets it consume the longer affix first,
//! fans out over the unconstrained middle, and then checks the shorter affix
//! by plain descent from every node the fan-out reaches. A suffix of a word
//! is a prefix of its reversal, so short-prefix queries run on the reverse
//! trie with the roles of prefix and suffix swapped.

use std::cell::RefCell;

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::query::{check_affixes, AffixMatcher, QueryScratch};
use crate::storage::{ArenaStorage, Cursor, TrieStorage, TrieWalk, INTERNAL};

/// Prefix-and-suffix index over a forward and a reverse trie.
pub struct DualTrieIndex<S: TrieStorage = ArenaStorage> {
    storage: S,
    forward: S::Value,
    reverse: S::Value,
    count: usize,
    length: usize,
    /// The one word of a zero-length corpus.
    empty_word: Option<u32>,
    scratch: RefCell<QueryScratch<S::Value>>,
}

impl<S: TrieStorage + Default> DualTrieIndex<S> {
    /// Build both tries for `corpus` in a fresh storage.
    pub fn build(corpus: &Corpus) -> Result<Self> {
        Self::with_storage(corpus, S::default())
    }
}

impl<S: TrieStorage> DualTrieIndex<S> {
    /// Build both tries for `corpus` in the given (empty) storage.
    pub fn with_storage(corpus: &Corpus, storage: S) -> Result<Self> {
        let length = corpus.word_length();
        let null = storage.null();
        let mut index = Self {
            storage,
            forward: null,
            reverse: null,
            count: corpus.len(),
            length,
            empty_word: None,
            scratch: RefCell::new(QueryScratch::new()),
        };

        if length == 0 {
            index.empty_word = corpus.iter().next().map(|(_, id)| id);
            return Ok(index);
        }
        if corpus.is_empty() {
            return Ok(index);
        }

        // Roots go into `index` before any insert so that Drop releases
        // whatever was built if an allocation fails halfway.
        index.forward = index.storage.add_node()?;
        index.reverse = index.storage.add_node()?;
        for (word, id) in corpus.iter() {
            let payload = S::encode_identity(id);
            index
                .storage
                .insert(index.forward, word.iter().copied(), payload)?;
            index
                .storage
                .insert(index.reverse, word.iter().rev().copied(), payload)?;
        }

        log::debug!(
            "built dual trie index: {} words of length {}, {} nodes",
            index.count,
            index.length,
            index.storage.node_count()
        );
        Ok(index)
    }

    /// Number of indexed words.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if no words are indexed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Length of every indexed word.
    pub fn word_length(&self) -> usize {
        self.length
    }

    /// Number of trie nodes across both tries.
    pub fn node_count(&self) -> usize {
        self.storage.node_count()
    }

    /// Approximate bytes held by the tries.
    pub fn memory_usage(&self) -> usize {
        self.storage.memory_usage()
    }

    /// Report every word starting with `prefix` and ending with `suffix`.
    ///
    /// Uses the index's own scratch buffer, so it fails with
    /// [`Error::ReentrantQuery`] when called from inside `on_match`.
    pub fn query<F>(&self, prefix: &[u8], suffix: &[u8], on_match: F) -> Result<usize>
    where
        F: FnMut(u32),
    {
        let mut scratch = self
            .scratch
            .try_borrow_mut()
            .map_err(|_| Error::ReentrantQuery)?;
        self.query_with_scratch(&mut scratch, prefix, suffix, on_match)
    }

    /// Like [`query`](Self::query) with caller-owned scratch space.
    pub fn query_with_scratch<F>(
        &self,
        scratch: &mut QueryScratch<S::Value>,
        prefix: &[u8],
        suffix: &[u8],
        mut on_match: F,
    ) -> Result<usize>
    where
        F: FnMut(u32),
    {
        check_affixes(prefix, suffix, self.length)?;
        if self.length == 0 {
            return Ok(match self.empty_word {
                Some(id) => {
                    on_match(id);
                    1
                }
                None => 0,
            });
        }

        let (root, prefix, suffix) = if prefix.len() >= suffix.len() {
            (self.forward, prefix, suffix)
        } else {
            let bytes = &mut scratch.bytes;
            bytes.clear();
            bytes.extend(suffix.iter().rev());
            bytes.extend(prefix.iter().rev());
            let (reversed_suffix, reversed_prefix) = bytes.split_at(suffix.len());
            (self.reverse, reversed_suffix, reversed_prefix)
        };

        let Some(start) = self.storage.descend(Cursor::new(root, self.length), prefix) else {
            return Ok(0);
        };

        let gap = self.length - prefix.len() - suffix.len();
        let mut count = 0;
        self.storage.deep_fan_out(start, gap, |reached| {
            let id = self
                .storage
                .descend(reached, suffix)
                .and_then(|leaf| self.storage.identity(leaf));
            if let Some(id) = id {
                on_match(id);
                count += 1;
            }
        })?;
        Ok(count)
    }
}

impl<S: TrieStorage> AffixMatcher for DualTrieIndex<S> {
    fn len(&self) -> usize {
        self.count
    }

    fn word_length(&self) -> usize {
        self.length
    }

    fn query_dyn(&self, prefix: &[u8], suffix: &[u8], on_match: &mut dyn FnMut(u32)) -> Result<usize> {
        self.query(prefix, suffix, on_match)
    }
}

impl<S: TrieStorage> Drop for DualTrieIndex<S> {
    fn drop(&mut self) {
        if self.length == 0 {
            return;
        }
        self.storage.release(self.forward, self.length - 1, INTERNAL);
        self.storage.release(self.reverse, self.length - 1, INTERNAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{live_nodes_on_thread, PointerStorage};

    fn medium() -> Corpus {
        Corpus::from_concatenated(b"foobarbazquxqax", 3).unwrap()
    }

    fn check<S: TrieStorage + Default>() {
        let index = DualTrieIndex::<S>::build(&medium()).unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(index.word_length(), 3);

        assert_eq!(index.collect(b"", b"").unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(index.collect(b"f", b"").unwrap(), vec![0]);
        assert_eq!(index.collect(b"b", b"").unwrap(), vec![1, 2]);
        assert_eq!(index.collect(b"q", b"").unwrap(), vec![3, 4]);
        assert_eq!(index.collect(b"z", b"").unwrap(), Vec::<u32>::new());
        assert_eq!(index.collect(b"bx", b"").unwrap(), Vec::<u32>::new());
        assert_eq!(index.collect(b"", b"r").unwrap(), vec![1]);
        assert_eq!(index.collect(b"", b"x").unwrap(), vec![3, 4]);
        assert_eq!(index.collect(b"q", b"x").unwrap(), vec![3, 4]);

        for (word, id) in medium().iter() {
            for split in 0..=3 {
                let (prefix, suffix) = word.split_at(split);
                assert_eq!(index.collect(prefix, suffix).unwrap(), vec![id]);
            }
        }
    }

    #[test]
    fn test_medium_arena() {
        check::<ArenaStorage>();
    }

    #[test]
    fn test_medium_pointer() {
        check::<PointerStorage>();
    }

    #[test]
    fn test_count_matches_callbacks() {
        let index = DualTrieIndex::<ArenaStorage>::build(&medium()).unwrap();
        let mut seen = Vec::new();
        let count = index.query(b"", b"x", |id| seen.push(id)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_reentrant_query_is_rejected() {
        let index = DualTrieIndex::<ArenaStorage>::build(&medium()).unwrap();
        let mut inner = Vec::new();
        index
            .query(b"f", b"", |_| inner.push(index.query(b"b", b"", |_| {})))
            .unwrap();
        assert_eq!(inner, vec![Err(Error::ReentrantQuery)]);

        let mut scratch = QueryScratch::new();
        let mut nested = 0;
        index
            .query(b"f", b"", |_| {
                nested = index
                    .query_with_scratch(&mut scratch, b"b", b"", |_| {})
                    .unwrap();
            })
            .unwrap();
        assert_eq!(nested, 2);
    }

    #[test]
    fn test_rejects_bad_queries() {
        let index = DualTrieIndex::<PointerStorage>::build(&medium()).unwrap();
        assert_eq!(
            index.collect(b"fo", b"oo"),
            Err(Error::AffixTooLong {
                prefix: 2,
                suffix: 2,
                length: 3
            })
        );
        assert_eq!(
            index.collect(b"F", b""),
            Err(Error::InvalidQueryByte {
                position: 0,
                byte: b'F'
            })
        );
    }

    #[test]
    fn test_empty_corpus() {
        for length in 0..=3 {
            let index = DualTrieIndex::<PointerStorage>::build(&Corpus::empty(length)).unwrap();
            assert_eq!(index.collect(b"", b"").unwrap(), Vec::<u32>::new());
            if length > 0 {
                assert_eq!(index.collect(b"x", b"").unwrap(), Vec::<u32>::new());
                assert_eq!(index.collect(b"", b"x").unwrap(), Vec::<u32>::new());
            }
        }

        for length in 0..=3 {
            let index = DualTrieIndex::<ArenaStorage>::build(&Corpus::empty(length)).unwrap();
            assert_eq!(index.node_count(), 0);
        }
    }

    #[test]
    fn test_zero_length_word() {
        let corpus = Corpus::from_words([""]).unwrap();
        let index = DualTrieIndex::<ArenaStorage>::build(&corpus).unwrap();
        assert_eq!(index.collect(b"", b"").unwrap(), vec![0]);
        assert_eq!(index.node_count(), 0);
    }

    #[test]
    fn test_drop_frees_pointer_nodes() {
        let corpora = [
            Corpus::empty(3),
            Corpus::from_words(["a", "q", "z"]).unwrap(),
            medium(),
            Corpus::from_words(["abcdefgh", "abcdefgz", "zbcdefgh", "zzzzzzzz"]).unwrap(),
        ];
        for corpus in &corpora {
            let before = live_nodes_on_thread();
            let index = DualTrieIndex::<PointerStorage>::build(corpus).unwrap();
            assert_eq!(live_nodes_on_thread() - before, index.node_count());
            drop(index);
            assert_eq!(live_nodes_on_thread(), before, "{corpus:?}");
        }
    }

    #[test]
    fn test_with_reserved_storage() {
        let storage = ArenaStorage::with_capacity(64).unwrap();
        let index = DualTrieIndex::with_storage(&medium(), storage).unwrap();
        // Forward: f b q, then fo ba qu qa. Reverse: o r z x, then oo ra za xu xa.
        assert_eq!(index.node_count(), 2 + (3 + 4) + (4 + 5));
        assert!(index.memory_usage() >= 64 * std::mem::size_of::<[u32; 26]>());
    }
}
