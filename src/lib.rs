//! A concurrent, in-memory hierarchical directory tree.
//!
//! Directories are identified by absolute paths of the form `/a/b/c/`
//! (leading and trailing `/`, lowercase-letter components). [`Tree`] exposes
//! four operations — [`Tree::list`], [`Tree::create`], [`Tree::remove`],
//! [`Tree::move_node`] — safe to call from many threads at once.
//!
//! The interesting part of this crate is not the tree itself but
//! [`sync::NodeSync`] (crate-private), a fair reader/writer coordinator with
//! explicit priority handoff that every node carries, and the multi-node
//! acquisition protocol in `protocol` that `move_node` uses to lock two
//! subtrees at once without deadlocking against a concurrent `move_node`
//! locking the same two subtrees in the opposite order.
//!
//! ```
//! use pathtree::Tree;
//!
//! let tree = Tree::new();
//! tree.create("/a/").unwrap();
//! tree.create("/a/b/").unwrap();
//! assert_eq!(tree.list("/a/").as_deref(), Some("b"));
//!
//! tree.move_node("/a/b/", "/x/").unwrap();
//! assert_eq!(tree.list("/").as_deref(), Some("a,x"));
//! ```

mod error;
mod node;
mod path;
mod protocol;
mod sync;
mod tree;

pub use error::TreeError;
pub use path::MAX_NAME_LEN;
pub use tree::Tree;
