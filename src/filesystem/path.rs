//! Textual helpers for slash-separated VFS paths.
//!
//! Nothing here touches the tree; these functions only reshape strings.

pub const SEPARATOR: char = '/';
pub const ROOT: &str = "/";

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Lexically normalizes a path: repeated separators collapse, `.` is dropped
/// and `..` removes the previous component. A rooted path never rises above
/// the root.
pub fn clean(path: &str) -> String {
    let rooted = is_absolute(path);
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join(ROOT);
    match (rooted, joined.is_empty()) {
        (true, _) => format!("{ROOT}{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Number of non-empty segments; the root has depth zero.
pub fn depth(path: &str) -> usize {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).count()
}

/// Appends a single segment to an already normalized absolute path.
pub fn join(base: &str, name: &str) -> String {
    if base == ROOT {
        format!("{ROOT}{name}")
    } else {
        format!("{base}{SEPARATOR}{name}")
    }
}

/// Splits immediately after the final separator. The directory part keeps its
/// trailing separator and is empty when `path` has none.
pub fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind(SEPARATOR) {
        Some(index) => (&path[..=index], &path[index + 1..]),
        None => ("", path),
    }
}
