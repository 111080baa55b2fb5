//! Arena trie storage.
//!
//! All nodes live in one vector and are referenced by `u32` index. This:
//! - avoids one allocation per node
//! - keeps references at 4 bytes
//! - frees the whole trie in one go when the storage is dropped
//!
//! Index 0 is an all-zero node and zero is the null value, so the null node
//! leads back to itself on every slot. Identities are stored as `id + 1` to
//! keep them apart from null.

use std::mem;

use super::{Internal, Node, TrieStorage};
use crate::error::{Error, Result};

/// Trie storage backed by a single growable node vector.
#[derive(Clone, Debug)]
pub struct ArenaStorage {
    nodes: Vec<Node<u32>>,
}

impl ArenaStorage {
    /// Create an arena holding only the null node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::filled(0)],
        }
    }

    /// Create an arena with room for `nodes` nodes besides the null node.
    pub fn with_capacity(nodes: usize) -> Result<Self> {
        let mut arena = Self::new();
        arena
            .nodes
            .try_reserve_exact(nodes)
            .map_err(|_| Error::Allocation {
                bytes: nodes.saturating_mul(mem::size_of::<Node<u32>>()),
            })?;
        Ok(arena)
    }

    /// Number of nodes the arena can hold without growing.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity() - 1
    }

    /// Release unused capacity.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }
}

impl Default for ArenaStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieStorage for ArenaStorage {
    type Value = u32;

    #[inline]
    fn null(&self) -> u32 {
        0
    }

    fn add_node(&mut self) -> Result<u32> {
        let index = u32::try_from(self.nodes.len()).map_err(|_| Error::NodeLimit)?;
        if index == u32::MAX {
            return Err(Error::NodeLimit);
        }
        self.nodes.try_reserve(1).map_err(|_| Error::Allocation {
            bytes: mem::size_of::<Node<u32>>(),
        })?;
        self.nodes.push(Node::filled(0));
        Ok(index)
    }

    #[inline]
    fn node(&self, at: u32, _: Internal) -> &Node<u32> {
        &self.nodes[at as usize]
    }

    #[inline]
    fn node_mut(&mut self, at: u32, _: Internal) -> &mut Node<u32> {
        debug_assert_ne!(at, 0, "the null node is read-only");
        &mut self.nodes[at as usize]
    }

    #[inline]
    fn encode_identity(id: u32) -> u32 {
        debug_assert!(id < u32::MAX);
        id + 1
    }

    #[inline]
    fn decode_identity(value: u32) -> u32 {
        debug_assert_ne!(value, 0);
        value - 1
    }

    /// Nothing to do: nodes go away with the arena.
    fn release(&mut self, _root: u32, _depth: usize, _: Internal) {}

    fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    fn memory_usage(&self) -> usize {
        self.nodes.capacity() * mem::size_of::<Node<u32>>()
    }
}
