//! The tree facade: [`Tree::list`], [`Tree::create`], [`Tree::remove`],
//! [`Tree::move_node`].
use std::sync::Arc;

use crate::error::TreeError;
use crate::node::Node;
use crate::path::{is_valid_path, path_to_parent};
use crate::protocol::{end_write, start_read, start_write};

/// A concurrent, in-memory hierarchical directory tree.
///
/// Every operation validates its path(s) first, then acquires exactly the
/// locks it needs via [`crate::protocol`], performs its mutation (if any),
/// and releases those locks before returning — see `spec.md` §2 for the
/// four-step control flow every mutating operation follows.
pub struct Tree {
    root: Arc<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a fresh tree containing only the root directory `/`.
    pub fn new() -> Self {
        Tree {
            root: Node::new_root(),
        }
    }

    /// Lists the names of `path`'s immediate children, comma-joined.
    ///
    /// Returns `None` if `path` is malformed or does not name an existing
    /// directory. An existing directory with no children yields
    /// `Some(String::new())`.
    pub fn list(&self, path: &str) -> Option<String> {
        if !is_valid_path(path) {
            log::warn!("list({path:?}): invalid path");
            return None;
        }
        let dest = start_read(&self.root, path)?;
        let mut names: Vec<&str> = dest.children().keys().map(String::as_str).collect();
        names.sort_unstable();
        let result = names.join(",");
        crate::protocol::release_held_readlocks(Some(Arc::clone(&dest)), Some(dest));
        log::debug!("list({path:?}) -> {result:?}");
        Some(result)
    }

    /// Creates a new, empty directory at `path`.
    pub fn create(&self, path: &str) -> Result<(), TreeError> {
        if !is_valid_path(path) {
            log::warn!("create({path:?}): invalid path");
            return Err(TreeError::InvalidPath);
        }
        let Some((parent_path, name)) = path_to_parent(path) else {
            // path == "/"
            log::warn!("create(\"/\"): root already exists");
            return Err(TreeError::AlreadyExists);
        };

        let Some((n1, n2)) = start_write(&self.root, &parent_path, &parent_path) else {
            log::warn!("create({path:?}): parent not found");
            return Err(TreeError::NotFound);
        };
        let parent = n1;
        debug_assert!(Arc::ptr_eq(&parent, &n2));

        if parent.children().contains_key(&name) {
            end_write(Arc::clone(&parent), parent);
            log::warn!("create({path:?}): already exists");
            return Err(TreeError::AlreadyExists);
        }

        let child = Node::new_child(&parent);
        parent.children_mut().insert(name, child);
        end_write(Arc::clone(&parent), parent);
        log::debug!("create({path:?}): ok");
        Ok(())
    }

    /// Removes the empty directory at `path`.
    pub fn remove(&self, path: &str) -> Result<(), TreeError> {
        if !is_valid_path(path) {
            log::warn!("remove({path:?}): invalid path");
            return Err(TreeError::InvalidPath);
        }
        if path == "/" {
            log::warn!("remove(\"/\"): root cannot be removed");
            return Err(TreeError::Busy);
        }
        let (parent_path, name) =
            path_to_parent(path).expect("path != \"/\" was just checked above");

        let Some((n1, n2)) = start_write(&self.root, &parent_path, &parent_path) else {
            log::warn!("remove({path:?}): parent not found");
            return Err(TreeError::NotFound);
        };
        let parent = n1;
        debug_assert!(Arc::ptr_eq(&parent, &n2));

        let Some(child) = parent.children().get(&name).cloned() else {
            end_write(Arc::clone(&parent), parent);
            log::warn!("remove({path:?}): not found");
            return Err(TreeError::NotFound);
        };

        if !child.children().is_empty() {
            end_write(Arc::clone(&parent), parent);
            log::warn!("remove({path:?}): not empty");
            return Err(TreeError::NotEmpty);
        }

        parent.children_mut().remove(&name);
        end_write(Arc::clone(&parent), parent);
        log::debug!("remove({path:?}): ok");
        Ok(())
    }

    /// Moves the directory at `source` (and everything beneath it) to
    /// `target`, which must not already exist.
    ///
    /// `move_node(p, p)` is a no-op that succeeds. Moving a directory inside
    /// itself (or inside one of its own descendants) fails with
    /// [`TreeError::WouldCycle`] rather than corrupting the tree.
    pub fn move_node(&self, source: &str, target: &str) -> Result<(), TreeError> {
        if source == "/" {
            log::warn!("move_node(\"/\", ..): root cannot be moved");
            return Err(TreeError::Busy);
        }
        if target == "/" {
            log::warn!("move_node(.., \"/\"): root already exists");
            return Err(TreeError::AlreadyExists);
        }
        if !is_valid_path(source) || !is_valid_path(target) {
            log::warn!("move_node({source:?}, {target:?}): invalid path");
            return Err(TreeError::InvalidPath);
        }

        let (source_parent_path, source_name) =
            path_to_parent(source).expect("source != \"/\" was just checked above");
        let (target_parent_path, target_name) =
            path_to_parent(target).expect("target != \"/\" was just checked above");

        let Some((n1, n2)) = start_write(&self.root, &source_parent_path, &target_parent_path)
        else {
            log::warn!("move_node({source:?}, {target:?}): parent not found");
            return Err(TreeError::NotFound);
        };

        // start_write canonicalises its two path arguments by lexicographic
        // order before resolving them; recover which of n1/n2 is which.
        let (source_parent, target_parent) = if source_parent_path <= target_parent_path {
            (n1.clone(), n2.clone())
        } else {
            (n2.clone(), n1.clone())
        };

        let Some(to_move) = source_parent.children().get(&source_name).cloned() else {
            end_write(n1, n2);
            log::warn!("move_node({source:?}, {target:?}): source not found");
            return Err(TreeError::NotFound);
        };

        if source == target {
            end_write(n1, n2);
            log::debug!("move_node({source:?}, {target:?}): no-op");
            return Ok(());
        }

        if target.starts_with(source) {
            end_write(n1, n2);
            log::warn!("move_node({source:?}, {target:?}): would cycle");
            return Err(TreeError::WouldCycle);
        }

        if target_parent.children().contains_key(&target_name) {
            end_write(n1, n2);
            log::warn!("move_node({source:?}, {target:?}): target already exists");
            return Err(TreeError::AlreadyExists);
        }

        to_move.set_parent(&target_parent);
        source_parent.children_mut().remove(&source_name);
        target_parent.children_mut().insert(target_name, to_move);

        end_write(n1, n2);
        log::debug!("move_node({source:?}, {target:?}): ok");
        Ok(())
    }
}
