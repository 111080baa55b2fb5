//! Pointer trie storage.
//!
//! Every node is its own heap allocation and slot values are node
//! addresses. Null is the address of a sentinel node owned by the storage
//! whose slots all hold that same address, so descending from null lands on
//! null again without a check per letter.
//!
//! Identities are stored as `(id << 1) | 1`. Nodes are `usize`-aligned, so
//! every address is even and an encoded identity, which is odd, can never be
//! mistaken for a node or the sentinel. On 32-bit targets this leaves 31 bits
//! for the identity.
//!
//! Nodes are not freed on drop: the storage cannot tell a leaf-level node
//! (whose slots are identities) from an inner one. The owner calls
//! [`TrieStorage::release`] with the depth of each trie instead.

use std::alloc::{self, Layout};
use std::collections::VecDeque;
use std::ptr::NonNull;

use super::{Internal, Node, TrieStorage, INTERNAL};
use crate::error::{Error, Result};

/// Slot value of a [`PointerStorage`]: a node address or encoded identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeAddr(usize);

impl NodeAddr {
    #[inline]
    fn from_ptr(ptr: NonNull<Node<NodeAddr>>) -> Self {
        Self(ptr.as_ptr() as usize)
    }

    #[inline]
    fn as_ptr(self) -> *mut Node<NodeAddr> {
        debug_assert_eq!(self.0 & 1, 0, "identity used as a node address");
        self.0 as *mut Node<NodeAddr>
    }
}

#[cfg(test)]
thread_local! {
    static LIVE_ON_THREAD: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

/// Nodes allocated and not yet freed by every pointer storage on this thread.
#[cfg(test)]
pub(crate) fn live_nodes_on_thread() -> usize {
    LIVE_ON_THREAD.with(|live| live.get())
}

/// Trie storage with one heap allocation per node.
pub struct PointerStorage {
    sentinel: NonNull<Node<NodeAddr>>,
    live: usize,
}

impl PointerStorage {
    const LAYOUT: Layout = Layout::new::<Node<NodeAddr>>();

    /// Create a storage holding only its null sentinel.
    pub fn new() -> Self {
        let sentinel = NonNull::from(Box::leak(Box::new(Node::filled(NodeAddr(0)))));
        let null = NodeAddr::from_ptr(sentinel);
        // SAFETY: `sentinel` was just leaked from a live Box and is not aliased.
        unsafe { *sentinel.as_ptr() = Node::filled(null) };
        Self { sentinel, live: 0 }
    }

    /// Free one node without looking at its slots.
    ///
    /// # Safety
    /// `at` must be a live node allocated by this storage's `add_node`.
    unsafe fn free_node(&mut self, at: NodeAddr) {
        // SAFETY: guaranteed by the caller; LAYOUT is what add_node used.
        unsafe { alloc::dealloc(at.as_ptr().cast::<u8>(), Self::LAYOUT) };
        self.live -= 1;
        #[cfg(test)]
        LIVE_ON_THREAD.with(|live| live.set(live.get() - 1));
    }
}

impl Default for PointerStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieStorage for PointerStorage {
    type Value = NodeAddr;

    #[inline]
    fn null(&self) -> NodeAddr {
        NodeAddr::from_ptr(self.sentinel)
    }

    fn add_node(&mut self) -> Result<NodeAddr> {
        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc(Self::LAYOUT) }.cast::<Node<NodeAddr>>();
        let Some(ptr) = NonNull::new(raw) else {
            return Err(Error::Allocation {
                bytes: Self::LAYOUT.size(),
            });
        };
        // SAFETY: fresh allocation sized and aligned for a node.
        unsafe { ptr.as_ptr().write(Node::filled(self.null())) };
        self.live += 1;
        #[cfg(test)]
        LIVE_ON_THREAD.with(|live| live.set(live.get() + 1));
        Ok(NodeAddr::from_ptr(ptr))
    }

    #[inline]
    fn node(&self, at: NodeAddr, _: Internal) -> &Node<NodeAddr> {
        // SAFETY: only this crate can call this. The engines pass values
        // that came from add_node or the sentinel of this storage and are not
        // yet released; cursor heights keep leaf-level values away from here.
        unsafe { &*at.as_ptr() }
    }

    #[inline]
    fn node_mut(&mut self, at: NodeAddr, _: Internal) -> &mut Node<NodeAddr> {
        assert_ne!(at, self.null(), "the null sentinel is read-only");
        // SAFETY: as in `node`; `&mut self` makes the access exclusive.
        unsafe { &mut *at.as_ptr() }
    }

    #[inline]
    fn encode_identity(id: u32) -> NodeAddr {
        debug_assert!(
            usize::BITS > u32::BITS || id <= u32::MAX >> 1,
            "identity {id} does not fit a 31-bit encoding"
        );
        NodeAddr(((id as usize) << 1) | 1)
    }

    #[inline]
    fn decode_identity(value: NodeAddr) -> u32 {
        debug_assert_eq!(value.0 & 1, 1, "node address read as an identity");
        (value.0 >> 1) as u32
    }

    /// Free the trie under `root` breadth first. Nodes at depth 0 are freed
    /// without reading their slots, which hold identities.
    fn release(&mut self, root: NodeAddr, depth: usize, _: Internal) {
        if self.is_null(root) {
            return;
        }

        let mut queue: VecDeque<(NodeAddr, usize)> = VecDeque::new();
        queue.push_back((root, depth));
        while let Some((at, depth)) = queue.pop_front() {
            if depth > 0 {
                let null = self.null();
                for &child in self.node(at, INTERNAL).slots() {
                    if child != null {
                        queue.push_back((child, depth - 1));
                    }
                }
            }
            // SAFETY: `at` is reachable from `root` through node slots, so it
            // came from add_node. Every node has one parent and is queued
            // once, and the owning engine releases each root once.
            unsafe { self.free_node(at) };
        }
    }

    fn node_count(&self) -> usize {
        self.live
    }

    fn memory_usage(&self) -> usize {
        (self.live + 1) * Self::LAYOUT.size()
    }
}

impl Drop for PointerStorage {
    fn drop(&mut self) {
        if self.live > 0 {
            log::warn!("dropping pointer trie storage with {} unreleased nodes", self.live);
        }
        // SAFETY: the sentinel was leaked from a Box in `new` and is freed once.
        drop(unsafe { Box::from_raw(self.sentinel.as_ptr()) });
    }
}

// SAFETY: the storage exclusively owns every node it allocated; nodes are
// plain integers and only reachable through the storage.
unsafe impl Send for PointerStorage {}
unsafe impl Sync for PointerStorage {}
