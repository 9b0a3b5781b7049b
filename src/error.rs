//! The tree facade's error type.
//!
//! One variant per outcome category of `spec.md` §7, plus a [`TreeError::raw_errno`]
//! bridge back to POSIX-style numeric codes for callers that want the
//! original numeric contract (e.g. a FUSE-style adapter layered on top of
//! this crate) — the same role `nexus-fuse`'s `NexusClientError::to_errno`
//! plays for its own error type, elsewhere in this retrieval pack.
use thiserror::Error;

/// Everything that can go wrong calling a mutating [`crate::Tree`] operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The path is not of the form `/a/b/c/` with lowercase, bounded-length
    /// components.
    #[error("path is not well-formed")]
    InvalidPath,

    /// An intermediate or final path component does not exist.
    #[error("no such directory")]
    NotFound,

    /// `create` found a directory already at that name, or `move` found one
    /// already at the target, or either operation targeted `/`.
    #[error("directory already exists")]
    AlreadyExists,

    /// `remove` targeted a directory that still has children.
    #[error("directory is not empty")]
    NotEmpty,

    /// `remove` or `move` targeted the root directory.
    #[error("the root directory cannot be removed or moved")]
    Busy,

    /// `move` would place the source directory inside itself.
    ///
    /// Not a POSIX errno; `spec.md` §9 notes the original implementation
    /// returns `-1` here, undocumented beyond being distinct from `EEXIST`.
    /// `raw_errno` keeps that source-compatible value.
    #[error("move target is inside move source")]
    WouldCycle,
}

impl TreeError {
    /// Maps this error to the POSIX errno `spec.md` §6 documents for it, or
    /// `-1` for [`TreeError::WouldCycle`], which has no POSIX equivalent.
    pub fn raw_errno(&self) -> i32 {
        match self {
            TreeError::InvalidPath => libc::EINVAL,
            TreeError::NotFound => libc::ENOENT,
            TreeError::AlreadyExists => libc::EEXIST,
            TreeError::NotEmpty => libc::ENOTEMPTY,
            TreeError::Busy => libc::EBUSY,
            TreeError::WouldCycle => -1,
        }
    }
}
