//! Tree nodes.
//!
//! A [`Node`] owns its children (`Arc`, strong) and keeps a non-owning
//! (`Weak`) back-link to its parent, so the tree has no reference cycles and
//! drops via ordinary Rust `Drop` — no recursive `free` is needed, unlike
//! the original implementation this crate is modeled on.
//!
//! The children map and the parent link live behind [`UnsafeCell`]s. Safety
//! is established not by a generic lock wrapper but by the discipline
//! enforced in [`crate::protocol`]: every access happens while the calling
//! thread holds the appropriate read- or write-lock on this node (tracked by
//! [`NodeSync`]), following exactly the same "unsynchronised cell, protocol
//! guarantees exclusivity" shape as the teacher crate's
//! `UnsafeCell<T>` + guard-`Deref` pattern, generalised here from one flat
//! lock to a whole tree of them.
use std::cell::UnsafeCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use crate::sync::NodeSync;

pub(crate) struct Node {
    sync: NodeSync,
    children: UnsafeCell<HashMap<String, Arc<Node>>>,
    parent: UnsafeCell<Option<Weak<Node>>>,
    height: AtomicU32,
}

// SAFETY: all interior mutability in `Node` is gated by `NodeSync`'s
// acquire/release protocol, which is the sole caller-visible means of
// obtaining a `&Node` in the first place (see crate::protocol). `NodeSync`
// itself is built from `std::sync::{Mutex, Condvar}`, which are already
// `Send + Sync`.
unsafe impl Send for Node {}
unsafe impl Sync for Node {}

impl Node {
    /// Creates a fresh root node (height 1, no parent).
    pub(crate) fn new_root() -> Arc<Node> {
        Arc::new(Node {
            sync: NodeSync::new(),
            children: UnsafeCell::new(HashMap::new()),
            parent: UnsafeCell::new(None),
            height: AtomicU32::new(1),
        })
    }

    /// Creates a fresh child of `parent`. Does not insert it into
    /// `parent`'s children map; the caller does that while holding
    /// `parent`'s write-lock.
    pub(crate) fn new_child(parent: &Arc<Node>) -> Arc<Node> {
        Arc::new(Node {
            sync: NodeSync::new(),
            children: UnsafeCell::new(HashMap::new()),
            parent: UnsafeCell::new(Some(Arc::downgrade(parent))),
            height: AtomicU32::new(parent.height() + 1),
        })
    }

    pub(crate) fn acquire_read(&self) {
        self.sync.acquire_read();
    }

    pub(crate) fn release_read(&self) {
        self.sync.release_read();
    }

    pub(crate) fn acquire_write(&self) {
        self.sync.acquire_write();
    }

    pub(crate) fn release_write(&self) {
        self.sync.release_write();
    }

    pub(crate) fn bump_reader_for_writer(&self) {
        self.sync.bump_reader_for_writer();
    }

    pub(crate) fn height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }

    /// Sets this node's cached height. Idempotent (always recomputed as
    /// `parent.height() + 1` by the caller) and used only as a release-order
    /// tiebreak (`spec.md` §4.3); benign if two descents race to write the
    /// same value.
    pub(crate) fn set_height(&self, h: u32) {
        self.height.store(h, Ordering::Relaxed);
    }

    /// Returns this node's parent, or `None` for the root.
    ///
    /// Reading `parent` without holding a lock on `self` is safe here
    /// because `self`'s parent link can only be mutated by a `move` that
    /// holds write-locks on `self`'s *old and new* parent nodes (never on
    /// `self` itself) — and every caller of `parent()` reaches `self` only
    /// while still holding a lock on at least one of `self`'s ancestors
    /// that a concurrent `move` of `self` would first have to acquire for
    /// writing. See the top-down acquisition / bottom-up release discipline
    /// in `crate::protocol`.
    pub(crate) fn parent(&self) -> Option<Arc<Node>> {
        // SAFETY: see doc comment above.
        unsafe { (*self.parent.get()).as_ref().and_then(Weak::upgrade) }
    }

    /// Repoints this node's parent link. Called only by `Tree::move_node`
    /// while holding write-locks on both the old and the new parent.
    pub(crate) fn set_parent(&self, parent: &Arc<Node>) {
        // SAFETY: caller holds write-locks on both the old and new parent,
        // which together with invariant 5 of `spec.md` §3 serialises this
        // write against every other reader of `self.parent`.
        unsafe {
            *self.parent.get() = Some(Arc::downgrade(parent));
        }
    }

    /// Borrows this node's children map.
    ///
    /// # Safety discipline
    /// Every call site holds a read- or write-lock on `self` (the
    /// invariant `spec.md` §5 requires of any children-map reader).
    pub(crate) fn children(&self) -> &HashMap<String, Arc<Node>> {
        // SAFETY: see doc comment above.
        unsafe { &*self.children.get() }
    }

    /// Mutably borrows this node's children map.
    ///
    /// # Safety discipline
    /// Every call site holds the write-lock on `self`.
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn children_mut(&self) -> &mut HashMap<String, Arc<Node>> {
        // SAFETY: see doc comment above.
        unsafe { &mut *self.children.get() }
    }
}
