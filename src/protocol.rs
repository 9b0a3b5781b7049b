//! The multi-node acquisition protocols: [`start_read`], [`start_write`],
//! [`end_write`] and [`release_held_readlocks`].
//!
//! These coordinate per-node locks across a full root-to-leaf path (or two
//! paths at once) and are, per `spec.md` §4.3, "the heart of the design" —
//! everything in [`crate::tree`] is built on top of these four functions.
use std::sync::Arc;

use crate::node::Node;
use crate::path::split_first_component;

/// Acquires read-locks on every node from `root` down to the destination
/// named by `path`, inclusive. Returns the destination node on success.
///
/// On a missing intermediate or final component, every read-lock acquired
/// so far is released before returning `None`.
pub(crate) fn start_read(root: &Arc<Node>, path: &str) -> Option<Arc<Node>> {
    let mut current = Arc::clone(root);
    let mut rest = path;

    while let Some((component, next_rest)) = split_first_component(rest) {
        current.acquire_read();
        let child = current.children().get(component).cloned();
        let Some(child) = child else {
            release_held_readlocks(Some(current.clone()), Some(current));
            return None;
        };
        child.set_height(current.height() + 1);
        rest = next_rest;
        current = child;
    }

    current.acquire_read();
    Some(current)
}

/// Acquires write-locks on the two (possibly equal) destination nodes named
/// by `path_a` and `path_b`, holding read-locks on every strict ancestor of
/// each along the way. Returns `(node_a, node_b)` — the nodes resolved from
/// `path_a` and `path_b` respectively, each already write-locked.
///
/// `spec.md` §4.3 in full:
///
/// 1. Canonicalise: if `path_a > path_b` lexicographically, swap them, so
///    `path_a` can never be a strict descendant of `path_b` — this is what
///    rules out the ABBA deadlock between two concurrent `start_write`
///    calls.
/// 2. Descend both paths in lockstep while they share a prefix, taking only
///    one read-lock per shared node.
/// 3. Once `path_a`'s path is exhausted, take the write-lock on its
///    destination.
/// 4. Continue descending `path_b`'s remainder. If it is still the same
///    node as the just-write-locked destination of `path_a`, count this
///    thread as a reader of that node directly ([`Node::bump_reader_for_writer`])
///    rather than running the normal read protocol against it (that would
///    deadlock against the writer state this very thread just set).
/// 5. Take the write-lock on `path_b`'s destination, unless it coincides
///    with `path_a`'s (same-directory case).
pub(crate) fn start_write(
    root: &Arc<Node>,
    path_a: &str,
    path_b: &str,
) -> Option<(Arc<Node>, Arc<Node>)> {
    let (path_a, path_b) = if path_a > path_b {
        (path_b, path_a)
    } else {
        (path_a, path_b)
    };

    let mut node1 = Arc::clone(root);
    let mut node2 = Arc::clone(root);
    let mut rest1 = path_a;
    let mut rest2 = path_b;

    while let Some((c1, next1)) = split_first_component(rest1) {
        node1.acquire_read();
        let new1 = node1.children().get(c1).cloned();
        let Some(new1) = new1 else {
            release_held_readlocks(Some(node1.clone()), Some(node1));
            return None;
        };
        new1.set_height(node1.height() + 1);

        if Arc::ptr_eq(&node1, &node2) {
            if let Some((c2, next2)) = split_first_component(rest2) {
                let new2 = node2.children().get(c2).cloned();
                let Some(new2) = new2 else {
                    release_held_readlocks(Some(node1.clone()), Some(node1));
                    return None;
                };
                new2.set_height(new1.height());
                rest2 = next2;
                node2 = new2;
            }
        }

        rest1 = next1;
        node1 = new1;
    }

    node1.acquire_write();

    while let Some((c2, next2)) = split_first_component(rest2) {
        if Arc::ptr_eq(&node1, &node2) {
            node2.bump_reader_for_writer();
        } else {
            node2.acquire_read();
        }
        let new2 = node2.children().get(c2).cloned();
        let Some(new2) = new2 else {
            node1.release_write();
            release_held_readlocks(node1.parent(), Some(node2));
            return None;
        };
        new2.set_height(node2.height() + 1);
        rest2 = next2;
        node2 = new2;
    }

    if !Arc::ptr_eq(&node1, &node2) {
        node2.acquire_write();
    }

    Some((node1, node2))
}

/// Releases the write-lock(s) held on `node1`/`node2` (one release if they
/// coincide), then releases every ancestor read-lock still held on their
/// parent chains.
pub(crate) fn end_write(node1: Arc<Node>, node2: Arc<Node>) {
    node1.release_write();
    if !Arc::ptr_eq(&node1, &node2) {
        node2.release_write();
    }
    release_held_readlocks(node1.parent(), node2.parent());
}

/// Releases read-locks held along the ancestor chains of `node1` and
/// `node2`, climbing toward the root and releasing the deeper node first
/// (using cached `height` as the tiebreak) so a descendant's lock is never
/// released after its ancestor's. When the two chains converge on a shared
/// node, its read-lock is released exactly once.
pub(crate) fn release_held_readlocks(mut node1: Option<Arc<Node>>, mut node2: Option<Arc<Node>>) {
    fn height_of(n: &Option<Arc<Node>>) -> u32 {
        n.as_ref().map_or(0, |n| n.height())
    }

    while node1.is_some() || node2.is_some() {
        let h1 = height_of(&node1);
        let h2 = height_of(&node2);

        if h1 > h2 {
            let n = node1.take().unwrap();
            n.release_read();
            node1 = n.parent();
        } else if h1 < h2 {
            let n = node2.take().unwrap();
            n.release_read();
            node2 = n.parent();
        } else {
            let n1 = node1.take().unwrap();
            let same = matches!(&node2, Some(n2) if Arc::ptr_eq(&n1, n2));
            n1.release_read();
            if same {
                let parent = n1.parent();
                node2 = parent.clone();
                node1 = parent;
            } else {
                let n2 = node2.take().unwrap();
                n2.release_read();
                node1 = n1.parent();
                node2 = n2.parent();
            }
        }
    }
}
