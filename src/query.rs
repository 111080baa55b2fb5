//! The query contract shared by every index.

use crate::error::{Error, Result};
use crate::storage::Cursor;

/// An index answering prefix-and-suffix queries over fixed-length words.
pub trait AffixMatcher {
    /// Number of indexed words.
    fn len(&self) -> usize;

    /// Length of every indexed word.
    fn word_length(&self) -> usize;

    /// Call `on_match` with the identity of every word that starts with
    /// `prefix` and ends with `suffix`, and return how many there were.
    ///
    /// `prefix.len() + suffix.len()` must not exceed [`word_length`]. Order
    /// of matches is unspecified.
    ///
    /// [`word_length`]: AffixMatcher::word_length
    fn query_dyn(&self, prefix: &[u8], suffix: &[u8], on_match: &mut dyn FnMut(u32)) -> Result<usize>;

    /// Check if no words are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matching identities, sorted.
    fn collect(&self, prefix: &[u8], suffix: &[u8]) -> Result<Vec<u32>> {
        let mut ids = Vec::new();
        self.query_dyn(prefix, suffix, &mut |id| ids.push(id))?;
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Reusable buffers for queries.
///
/// Every index keeps one internally; pass your own to
/// `query_with_scratch` to run queries from several threads against
/// separate scratch space.
#[derive(Debug)]
pub struct QueryScratch<V> {
    pub(crate) bytes: Vec<u8>,
    pub(crate) pending: Vec<Cursor<V>>,
}

impl<V> QueryScratch<V> {
    /// Empty buffers; they grow on first use.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl<V> Default for QueryScratch<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject affixes that cannot occur in a word of `length` letters.
pub(crate) fn check_affixes(prefix: &[u8], suffix: &[u8], length: usize) -> Result<()> {
    if prefix.len() + suffix.len() > length {
        return Err(Error::AffixTooLong {
            prefix: prefix.len(),
            suffix: suffix.len(),
            length,
        });
    }
    let bytes = prefix.iter().chain(suffix);
    if let Some((position, &byte)) = bytes.enumerate().find(|(_, b)| !b.is_ascii_lowercase()) {
        return Err(Error::InvalidQueryByte { position, byte });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_affixes() {
        assert!(check_affixes(b"ab", b"c", 3).is_ok());
        assert!(check_affixes(b"", b"", 0).is_ok());
        assert_eq!(
            check_affixes(b"ab", b"cd", 3),
            Err(Error::AffixTooLong {
                prefix: 2,
                suffix: 2,
                length: 3
            })
        );
        assert_eq!(
            check_affixes(b"a", b"b\0", 5),
            Err(Error::InvalidQueryByte {
                position: 2,
                byte: 0
            })
        );
    }
}
