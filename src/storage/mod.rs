//! Trie node storage.
//!
//! A trie here has a fixed number of levels: every stored word has the same
//! length `L`, so the slots of a node `L` levels below the root hold encoded
//! identities while every slot above that holds a node reference. Nodes carry
//! no tag telling the two apart. Traversal code therefore tracks the height
//! of every position it holds, which is what [`Cursor`] is for.
//!
//! Two storages implement the same [`TrieStorage`] contract:
//!
//! - [`ArenaStorage`]: all nodes in one vector, `u32` indices, freed in bulk.
//! - [`PointerStorage`]: one allocation per node, freed by an explicit
//!   breadth-first walk that never looks inside leaf-level nodes.

mod arena;
mod pointer;

pub use arena::ArenaStorage;
pub use pointer::{NodeAddr, PointerStorage};
#[cfg(test)]
pub(crate) use pointer::live_nodes_on_thread;

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::Result;
use crate::fanout;

/// Branching factor: one slot per letter `a..=z`.
pub const ALPHABET_SIZE: usize = 26;

/// Slot index of a lowercase letter.
#[inline]
pub(crate) fn slot_of(ch: u8) -> usize {
    debug_assert!(ch.is_ascii_lowercase(), "byte {ch:#04x} is not a..=z");
    usize::from(ch - b'a')
}

/// A trie node: one value per alphabet symbol.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Node<V>([V; ALPHABET_SIZE]);

impl<V: Copy> Node<V> {
    /// A node whose every slot holds `value`.
    #[inline]
    pub fn filled(value: V) -> Self {
        Self([value; ALPHABET_SIZE])
    }

    /// All slots in alphabet order.
    #[inline]
    pub fn slots(&self) -> &[V; ALPHABET_SIZE] {
        &self.0
    }
}

impl<V> Index<usize> for Node<V> {
    type Output = V;

    #[inline]
    fn index(&self, slot: usize) -> &V {
        &self.0[slot]
    }
}

impl<V> IndexMut<usize> for Node<V> {
    #[inline]
    fn index_mut(&mut self, slot: usize) -> &mut V {
        &mut self.0[slot]
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// A slot value together with the number of levels left below it.
///
/// At height 0 the value is an encoded identity (or null); above that it is
/// a node reference (or null).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor<V> {
    value: V,
    height: usize,
}

impl<V: Copy> Cursor<V> {
    /// Position at `value`, `height` levels above the leaf level.
    #[inline]
    pub fn new(value: V, height: usize) -> Self {
        Self { value, height }
    }

    /// The raw slot value.
    #[inline]
    pub fn value(self) -> V {
        self.value
    }

    /// Levels left until the leaf level.
    #[inline]
    pub fn height(self) -> usize {
        self.height
    }
}

mod internal {
    /// Argument only this crate can produce. Raw node methods take one, so
    /// values never reach them from outside the crate.
    #[derive(Clone, Copy, Debug)]
    pub struct Internal(());

    pub(crate) const INTERNAL: Internal = Internal(());
}

pub use internal::Internal;
pub(crate) use internal::INTERNAL;

/// Storage for fixed-depth, 26-way trie nodes.
///
/// Values are only meaningful to the storage that produced them. The
/// methods that dereference values or free nodes take an [`Internal`], which
/// code outside this crate cannot construct; the engines own every root and
/// release each one exactly once.
///
/// ```compile_fail
/// use affix_trie::{PointerStorage, TrieStorage};
///
/// let mut storage = PointerStorage::new();
/// let root = storage.add_node().unwrap();
/// storage.release(root, 0);
/// ```
///
/// ```compile_fail
/// use affix_trie::{PointerStorage, TrieStorage};
///
/// let storage = PointerStorage::new();
/// let _ = storage.node(PointerStorage::encode_identity(5));
/// ```
pub trait TrieStorage {
    /// Slot value: null, node reference or encoded identity.
    type Value: Copy + Eq + fmt::Debug;

    /// The null value. Following any slot of it yields null again.
    fn null(&self) -> Self::Value;

    /// Allocate an all-null node.
    fn add_node(&mut self) -> Result<Self::Value>;

    /// The node behind a non-leaf value. Null yields the sentinel node.
    fn node(&self, at: Self::Value, _: Internal) -> &Node<Self::Value>;

    /// Mutable access to a node. `at` must not be null.
    fn node_mut(&mut self, at: Self::Value, _: Internal) -> &mut Node<Self::Value>;

    /// Encode an identity for a leaf-level slot.
    fn encode_identity(id: u32) -> Self::Value;

    /// Decode a non-null leaf-level slot value.
    fn decode_identity(value: Self::Value) -> u32;

    /// Reclaim the trie under `root`, whose slots are leaf values after
    /// `depth` further levels. Each root is released once.
    fn release(&mut self, root: Self::Value, depth: usize, _: Internal);

    /// Number of live nodes, not counting the null node.
    fn node_count(&self) -> usize;

    /// Approximate bytes held by the storage.
    fn memory_usage(&self) -> usize;

    #[inline]
    fn is_null(&self, value: Self::Value) -> bool {
        value == self.null()
    }
}

/// Traversal built on the raw node methods, for the engines only.
pub(crate) trait TrieWalk: TrieStorage {
    /// Child of `at` for letter `ch`, possibly null.
    #[inline]
    fn follow(&self, at: Self::Value, ch: u8) -> Self::Value {
        self.node(at, INTERNAL)[slot_of(ch)]
    }

    /// Descend through every letter of `chars` without checking for null on
    /// the way; null stays null through the sentinel.
    #[inline]
    fn follow_all(&self, mut at: Self::Value, chars: &[u8]) -> Self::Value {
        for &ch in chars {
            at = self.follow(at, ch);
        }
        at
    }

    /// Store `payload` at the end of the path spelled by `chars` from
    /// `start`, creating missing nodes on the way.
    fn insert<I>(&mut self, start: Self::Value, chars: I, payload: Self::Value) -> Result<()>
    where
        I: IntoIterator<Item = u8>,
    {
        debug_assert!(!self.is_null(start), "insert below the null node");
        let mut chars = chars.into_iter().peekable();
        let mut at = start;
        while let Some(ch) = chars.next() {
            let slot = slot_of(ch);
            if chars.peek().is_none() {
                self.node_mut(at, INTERNAL)[slot] = payload;
                break;
            }

            let mut next = self.node(at, INTERNAL)[slot];
            if self.is_null(next) {
                next = self.add_node()?;
                self.node_mut(at, INTERNAL)[slot] = next;
            }
            at = next;
        }
        Ok(())
    }

    /// Follow one letter. `None` if the child is null.
    #[inline]
    fn step(&self, cursor: Cursor<Self::Value>, ch: u8) -> Option<Cursor<Self::Value>> {
        assert!(cursor.height > 0, "cannot descend below the leaf level");
        let next = self.follow(cursor.value, ch);
        (!self.is_null(next)).then(|| Cursor::new(next, cursor.height - 1))
    }

    /// Follow every letter of `chars`, checking for null once at the end.
    #[inline]
    fn descend(&self, cursor: Cursor<Self::Value>, chars: &[u8]) -> Option<Cursor<Self::Value>> {
        assert!(
            chars.len() <= cursor.height,
            "descent of {} levels from height {}",
            chars.len(),
            cursor.height
        );
        let at = self.follow_all(cursor.value, chars);
        (!self.is_null(at)).then(|| Cursor::new(at, cursor.height - chars.len()))
    }

    /// Identity stored at a leaf-level cursor, `None` if null.
    #[inline]
    fn identity(&self, cursor: Cursor<Self::Value>) -> Option<u32> {
        assert_eq!(cursor.height, 0, "identity read above the leaf level");
        (!self.is_null(cursor.value)).then(|| Self::decode_identity(cursor.value))
    }

    /// Visit every non-null child of `cursor`.
    #[inline]
    fn fan_out<F>(&self, cursor: Cursor<Self::Value>, mut visit: F)
    where
        F: FnMut(Cursor<Self::Value>),
    {
        assert!(cursor.height > 0, "cannot fan out below the leaf level");
        let height = cursor.height - 1;
        fanout::fan_out(self, cursor.value, |child| visit(Cursor::new(child, height)));
    }

    /// Visit every non-null position exactly `depth` levels below `cursor`.
    fn deep_fan_out<F>(&self, cursor: Cursor<Self::Value>, depth: usize, mut visit: F) -> Result<()>
    where
        F: FnMut(Cursor<Self::Value>),
    {
        assert!(
            depth <= cursor.height,
            "fan-out of {depth} levels from height {}",
            cursor.height
        );
        let height = cursor.height - depth;
        fanout::deep_fan_out(self, cursor.value, depth, |reached| {
            visit(Cursor::new(reached, height))
        })
    }
}

impl<S: TrieStorage + ?Sized> TrieWalk for S {}
