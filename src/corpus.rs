//! Validated input for the query engines.
//!
//! A [`Corpus`] is an ordered sequence of `(word, identity)` pairs in which
//! every word has the same length, uses only `a..=z`, and is distinct, and
//! the identities are exactly `0..len`. Engines never see unchecked input.

use std::collections::HashSet;

use crate::error::{Error, Result};

/// Fixed-length words bound to dense identities, sorted by word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    /// Words back to back, `length` bytes each, in sorted order.
    bytes: Vec<u8>,
    /// Identity of each word in `bytes`.
    ids: Vec<u32>,
    length: usize,
}

impl Corpus {
    /// Create an empty corpus of words with the given length.
    pub fn empty(length: usize) -> Self {
        Self {
            bytes: Vec::new(),
            ids: Vec::new(),
            length,
        }
    }

    /// Build from explicit `(word, identity)` pairs.
    ///
    /// Identities must be a permutation of `0..n`.
    pub fn from_pairs<I, W>(length: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, u32)>,
        W: AsRef<[u8]>,
    {
        let mut entries: Vec<(Vec<u8>, u32)> = Vec::new();
        for (index, (word, id)) in pairs.into_iter().enumerate() {
            let word = word.as_ref();
            check_word(index, word, length)?;
            entries.push((word.to_vec(), id));
        }

        let count = entries.len();
        if u32::try_from(count).is_err() {
            return Err(Error::TooManyWords { count });
        }
        let mut seen = vec![false; count];
        for &(_, id) in &entries {
            let slot = seen
                .get_mut(id as usize)
                .ok_or(Error::IdentityOutOfRange { id, count })?;
            if *slot {
                return Err(Error::DuplicateIdentity { id });
            }
            *slot = true;
        }

        entries.sort_unstable();
        for pair in entries.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::DuplicateWord {
                    first: pair[0].1,
                    second: pair[1].1,
                });
            }
        }

        let mut bytes = Vec::with_capacity(count * length);
        let mut ids = Vec::with_capacity(count);
        for (word, id) in entries {
            bytes.extend_from_slice(&word);
            ids.push(id);
        }
        Ok(Self { bytes, ids, length })
    }

    /// Build from distinct words; each word's identity is its position.
    ///
    /// The word length is taken from the first word.
    pub fn from_words<I, W>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[u8]>,
    {
        let words: Vec<W> = words.into_iter().collect();
        let length = words.first().map_or(0, |w| w.as_ref().len());
        let count = words.len();
        let pairs = words.into_iter().enumerate().map(|(i, w)| {
            let id = u32::try_from(i).map_err(|_| Error::TooManyWords { count })?;
            Ok((w, id))
        });
        let pairs = pairs.collect::<Result<Vec<_>>>()?;
        Self::from_pairs(length, pairs)
    }

    /// Split a buffer into words of `length` bytes, dropping repeats.
    ///
    /// A word keeps the first occurrence; identities are assigned densely in
    /// order of first occurrence.
    pub fn from_concatenated(data: &[u8], length: usize) -> Result<Self> {
        if length == 0 {
            if data.is_empty() {
                return Ok(Self::empty(0));
            }
            return Err(Error::ConcatenatedLength {
                len: data.len(),
                length,
            });
        }
        if data.len() % length != 0 {
            return Err(Error::ConcatenatedLength {
                len: data.len(),
                length,
            });
        }

        let mut seen: HashSet<&[u8]> = HashSet::new();
        let mut pairs = Vec::new();
        for (index, word) in data.chunks_exact(length).enumerate() {
            check_word(index, word, length)?;
            if !seen.insert(word) {
                continue;
            }
            let id = u32::try_from(pairs.len()).map_err(|_| Error::TooManyWords {
                count: data.len() / length,
            })?;
            pairs.push((word, id));
        }
        Self::from_pairs(length, pairs)
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the corpus has no words.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Length shared by every word.
    pub fn word_length(&self) -> usize {
        self.length
    }

    /// Iterate `(word, identity)` pairs in word order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&[u8], u32)> + '_ {
        self.ids.iter().enumerate().map(move |(i, &id)| {
            let start = i * self.length;
            (&self.bytes[start..start + self.length], id)
        })
    }

    /// Identities of every word starting with `prefix` and ending with
    /// `suffix`, by linear scan, in word order.
    pub fn scan(&self, prefix: &[u8], suffix: &[u8]) -> Vec<u32> {
        if prefix.len() + suffix.len() > self.length {
            return Vec::new();
        }
        self.iter()
            .filter(|(word, _)| word.starts_with(prefix) && word.ends_with(suffix))
            .map(|(_, id)| id)
            .collect()
    }
}

fn check_word(index: usize, word: &[u8], length: usize) -> Result<()> {
    if word.len() != length {
        return Err(Error::WordLength {
            index,
            expected: length,
            actual: word.len(),
        });
    }
    if let Some(position) = word.iter().position(|b| !b.is_ascii_lowercase()) {
        return Err(Error::InvalidByte {
            index,
            position,
            byte: word[position],
        });
    }
    Ok(())
}
