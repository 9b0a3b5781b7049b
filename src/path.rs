//! Path validation and decomposition.
//!
//! A path is always of the form `/a/b/c/`: leading and trailing `/`, with
//! each component a run of lowercase ASCII letters bounded by
//! [`MAX_NAME_LEN`]. These helpers never allocate more than the single
//! `String` pair returned by [`path_to_parent`]; everything else borrows
//! from the caller's `&str`.

/// Upper bound on the length of a single path component.
pub const MAX_NAME_LEN: usize = 255;

static_assertions::const_assert!(MAX_NAME_LEN > 0);
static_assertions::const_assert!(MAX_NAME_LEN <= u8::MAX as usize);

/// Returns true iff `path` begins and ends with `/`, contains only `/` and
/// lowercase ASCII letters, and every `/`-delimited component has length in
/// `[1, MAX_NAME_LEN]`.
pub fn is_valid_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    if !path.starts_with('/') || !path.ends_with('/') {
        return false;
    }
    let mut rest = &path[1..];
    while !rest.is_empty() {
        let Some(end) = rest.find('/') else {
            return false;
        };
        let component = &rest[..end];
        if component.is_empty()
            || component.len() > MAX_NAME_LEN
            || !component.bytes().all(|b| b.is_ascii_lowercase())
        {
            return false;
        }
        rest = &rest[end + 1..];
    }
    true
}

/// Splits the first component off `path`, which must start with `/`.
///
/// Returns `Some((component, rest))` where `rest` again starts with `/`, or
/// `None` when `path == "/"` (the "done" sentinel of `spec.md` §4.1).
pub fn split_first_component(path: &str) -> Option<(&str, &str)> {
    debug_assert!(path.starts_with('/'));
    let tail = &path[1..];
    if tail.is_empty() {
        return None;
    }
    let end = tail
        .find('/')
        .expect("a valid path's every component is terminated by '/'");
    Some((&tail[..end], &tail[end..]))
}

/// Splits `path` into its parent path and its final component.
///
/// Returns `None` when `path == "/"` (the root has no parent).
pub fn path_to_parent(path: &str) -> Option<(String, String)> {
    debug_assert!(path.starts_with('/') && path.ends_with('/'));
    if path == "/" {
        return None;
    }
    let trimmed = &path[..path.len() - 1];
    let slash = trimmed.rfind('/').expect("path starts with '/'");
    let parent = trimmed[..slash + 1].to_string();
    let name = trimmed[slash + 1..].to_string();
    Some((parent, name))
}
