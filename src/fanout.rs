//! Fan-out traversal: enumerate every position a fixed number of levels
//! below a node, whatever letters lie in between.
//!
//! Depth can reach the word length, which may be in the millions, so the
//! deep variant walks with an explicit frame stack instead of recursion.
//! Each frame is a node plus the next slot to try. The stack lives inline for
//! up to [`FAN_OUT_INLINE_FRAMES`] levels and is reserved on the heap in one
//! piece beyond that.

use std::mem;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::storage::{Node, TrieStorage, ALPHABET_SIZE, INTERNAL};

/// Deepest fan-out whose frame stack is kept on the call stack.
pub const FAN_OUT_INLINE_FRAMES: usize = 256;

struct Frame<'a, V> {
    node: &'a Node<V>,
    next: usize,
}

/// Visit every non-null child of `start`.
#[inline]
pub(crate) fn fan_out<S, F>(storage: &S, start: S::Value, mut visit: F)
where
    S: TrieStorage + ?Sized,
    F: FnMut(S::Value),
{
    let null = storage.null();
    for &child in storage.node(start, INTERNAL).slots() {
        if child != null {
            visit(child);
        }
    }
}

/// Visit every non-null value exactly `depth` levels below `start`.
///
/// With `depth == 0` this visits `start` itself unless it is null. Values
/// reached at the leaf level are encoded identities; the caller knows which
/// level it asked for. Order of visits is unspecified.
pub(crate) fn deep_fan_out<S, F>(storage: &S, start: S::Value, depth: usize, mut visit: F) -> Result<()>
where
    S: TrieStorage + ?Sized,
    F: FnMut(S::Value),
{
    if depth == 0 {
        if !storage.is_null(start) {
            visit(start);
        }
        return Ok(());
    }

    let mut stack: SmallVec<[Frame<'_, S::Value>; FAN_OUT_INLINE_FRAMES]> = SmallVec::new();
    if depth > FAN_OUT_INLINE_FRAMES {
        stack.try_reserve_exact(depth).map_err(|_| Error::Allocation {
            bytes: depth.saturating_mul(mem::size_of::<Frame<'_, S::Value>>()),
        })?;
        log::trace!("fan-out of {depth} levels uses a heap frame stack");
    }

    let null = storage.null();
    stack.push(Frame {
        node: storage.node(start, INTERNAL),
        next: 0,
    });

    loop {
        let level = stack.len();
        let Some(frame) = stack.last_mut() else {
            break;
        };
        if frame.next == ALPHABET_SIZE {
            stack.pop();
            continue;
        }

        let child = frame.node[frame.next];
        frame.next += 1;
        if child == null {
            continue;
        }

        if level == depth {
            visit(child);
        } else {
            stack.push(Frame {
                node: storage.node(child, INTERNAL),
                next: 0,
            });
        }
    }

    Ok(())
}
