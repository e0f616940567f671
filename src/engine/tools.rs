//! Path, extension and text utilities

use std::path::{Component, Path, PathBuf};

use crate::extract::is_extractable;
use crate::utils::config::IMAGE_EXTENSIONS;

/// Lexically normalize a path for use as a map key: drops `.` components and trailing
/// separators, folds `..` into its parent where possible. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Normalized parent of a normalized path, or `None` at the filesystem root.
pub fn parent_key(path: &Path) -> Option<PathBuf> {
    path.parent().map(normalize_path)
}

/// Absolute, normalized form of `root` (relative paths resolve against the working directory).
pub fn absolute_root(root: &Path) -> std::io::Result<PathBuf> {
    Ok(normalize_path(&std::path::absolute(root)?))
}

/// Lower-case extension without the dot; empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Display name of an entry: its last component, or the whole path for `/` or `.`.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// How a file is described.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileClass {
    /// Sent to the image endpoint.
    Image,
    /// Text is extracted and sent to the file prompt.
    Extractable,
    /// Skipped.
    Unsupported,
}

pub fn classify(path: &Path) -> FileClass {
    let ext = extension_of(path);
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Image
    } else if is_extractable(&ext) {
        FileClass::Extractable
    } else {
        FileClass::Unsupported
    }
}

/// First `max` characters of `s` (char boundaries, not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Like [`truncate_chars`], with `...` appended when something was cut.
pub fn ellipsize(s: &str, max: usize) -> String {
    let cut = truncate_chars(s, max);
    if cut.len() < s.len() {
        format!("{cut}...")
    } else {
        s.to_string()
    }
}
