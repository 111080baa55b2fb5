//! Interleaved-trie index: one trie over words stored front/back mixed.
//!
//! Each word is keyed by its letters taken alternately from the two ends:
//! first, last, second, second to last, and so on. Known prefix and suffix
//! letters then sit at fixed depths of a single trie, and the unknown middle
//! of a query always turns up as runs of consecutive levels. The crawler
//! follows known letters and fans out over every run.

use std::cell::RefCell;

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::query::{check_affixes, AffixMatcher, QueryScratch};
use crate::storage::{ArenaStorage, Cursor, TrieStorage, TrieWalk, INTERNAL};

/// Probe byte for a letter the query leaves open.
pub const PLACEHOLDER: u8 = 0;

/// Write `src` into `dst` in front/back alternating order.
///
/// `abcdef` becomes `afbecd`.
pub fn interleave(src: &[u8], dst: &mut [u8]) {
    assert_eq!(src.len(), dst.len());
    let (mut front, mut back) = (0, src.len());
    let mut out = dst.iter_mut();
    while front < back {
        if let Some(slot) = out.next() {
            *slot = src[front];
        }
        front += 1;
        if front < back {
            back -= 1;
            if let Some(slot) = out.next() {
                *slot = src[back];
            }
        }
    }
}

/// Undo [`interleave`].
pub fn deinterleave(src: &[u8], dst: &mut [u8]) {
    assert_eq!(src.len(), dst.len());
    let (mut front, mut back) = (0, dst.len());
    let mut input = src.iter();
    while front < back {
        if let Some(&b) = input.next() {
            dst[front] = b;
        }
        front += 1;
        if front < back {
            back -= 1;
            if let Some(&b) = input.next() {
                dst[back] = b;
            }
        }
    }
}

/// Prefix-and-suffix index over a single interleaved trie.
pub struct MixedTrieIndex<S: TrieStorage = ArenaStorage> {
    storage: S,
    root: S::Value,
    count: usize,
    length: usize,
    /// The one word of a zero-length corpus.
    empty_word: Option<u32>,
    scratch: RefCell<QueryScratch<S::Value>>,
}

impl<S: TrieStorage + Default> MixedTrieIndex<S> {
    /// Build the interleaved trie for `corpus` in a fresh storage.
    pub fn build(corpus: &Corpus) -> Result<Self> {
        Self::with_storage(corpus, S::default())
    }
}

impl<S: TrieStorage> MixedTrieIndex<S> {
    /// Build the interleaved trie for `corpus` in the given (empty) storage.
    pub fn with_storage(corpus: &Corpus, storage: S) -> Result<Self> {
        let length = corpus.word_length();
        let null = storage.null();
        let mut index = Self {
            storage,
            root: null,
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

        index.root = index.storage.add_node()?;
        let mut mixed = vec![0u8; length];
        for (word, id) in corpus.iter() {
            interleave(word, &mut mixed);
            index
                .storage
                .insert(index.root, mixed.iter().copied(), S::encode_identity(id))?;
        }

        log::debug!(
            "built interleaved trie index: {} words of length {}, {} nodes",
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

    /// Number of trie nodes.
    pub fn node_count(&self) -> usize {
        self.storage.node_count()
    }

    /// Approximate bytes held by the trie.
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

        let QueryScratch { bytes, pending } = scratch;
        let length = self.length;
        bytes.clear();
        bytes.resize(length * 2, PLACEHOLDER);
        let (probe, mixed) = bytes.split_at_mut(length);
        probe[..prefix.len()].copy_from_slice(prefix);
        probe[length - suffix.len()..].copy_from_slice(suffix);
        interleave(probe, mixed);

        self.crawl(mixed, pending, &mut on_match)
    }

    /// Walk the trie along `mixed`, branching at every placeholder run.
    ///
    /// Branches wait on `pending` rather than the call stack: a long prefix
    /// with a short suffix alternates known letters and single placeholders
    /// for thousands of levels.
    fn crawl<F>(&self, mixed: &[u8], pending: &mut Vec<Cursor<S::Value>>, on_match: &mut F) -> Result<usize>
    where
        F: FnMut(u32),
    {
        let mut count = 0;
        pending.clear();
        pending.push(Cursor::new(self.root, self.length));

        while let Some(mut cursor) = pending.pop() {
            loop {
                let pos = self.length - cursor.height();
                if pos == mixed.len() {
                    if let Some(id) = self.storage.identity(cursor) {
                        on_match(id);
                        count += 1;
                    }
                    break;
                }

                let run = mixed[pos..]
                    .iter()
                    .take_while(|&&b| b == PLACEHOLDER)
                    .count();
                match run {
                    0 => match self.storage.step(cursor, mixed[pos]) {
                        Some(next) => cursor = next,
                        None => break,
                    },
                    1 => {
                        self.storage.fan_out(cursor, |child| pending.push(child));
                        break;
                    }
                    _ => {
                        self.storage
                            .deep_fan_out(cursor, run, |reached| pending.push(reached))?;
                        break;
                    }
                }
            }
        }
        Ok(count)
    }
}

impl<S: TrieStorage> AffixMatcher for MixedTrieIndex<S> {
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

impl<S: TrieStorage> Drop for MixedTrieIndex<S> {
    fn drop(&mut self) {
        if self.length > 0 {
            self.storage.release(self.root, self.length - 1, INTERNAL);
        }
    }
}
