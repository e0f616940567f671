//! Tree builder: one walk over the root, linking every entry to its parent by normalized path.

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine::tools::{absolute_root, display_name, normalize_path, parent_key};
use crate::error::WalkError;
use crate::types::{Node, NodeId, NodeKind, Tree};

impl From<walkdir::Error> for WalkError {
    fn from(err: walkdir::Error) -> Self {
        WalkError::Traversal {
            path: err.path().map(PathBuf::from),
            message: err.to_string(),
        }
    }
}

/// Build the node tree under `root` in a single walk.
///
/// Children are in file-name order. Symlinks are not followed (a broken link is a file node).
/// With `skip_files` only directories are visited into the tree. Any walk error aborts the build.
pub fn build_tree(root: &Path, skip_files: bool) -> Result<Tree, WalkError> {
    let root = absolute_root(root).map_err(|e| WalkError::Traversal {
        path: Some(root.to_path_buf()),
        message: e.to_string(),
    })?;
    if std::fs::symlink_metadata(&root).is_err() {
        return Err(WalkError::MissingRoot(root));
    }

    let mut walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    let first = walker.next().ok_or_else(|| WalkError::MissingRoot(root.clone()))??;
    let root_key = normalize_path(first.path());
    let mut tree = Tree::with_root(Node::new(
        root_key.clone(),
        display_name(&root_key),
        kind_of(&first),
    ));
    // Transient: directory key -> arena id, dropped with the builder.
    let mut dirs: HashMap<PathBuf, NodeId> = HashMap::from([(root_key, Tree::ROOT)]);

    for entry in walker {
        let entry = entry?;
        let kind = kind_of(&entry);
        if skip_files && kind == NodeKind::File {
            continue;
        }
        let key = normalize_path(entry.path());
        let parent = parent_key(&key)
            .and_then(|p| dirs.get(&p).copied())
            .ok_or_else(|| WalkError::Traversal {
                path: Some(key.clone()),
                message: "parent directory was not visited".to_string(),
            })?;
        let id = tree.push_child(parent, Node::new(key.clone(), display_name(&key), kind));
        if kind.is_dir() {
            dirs.insert(key, id);
        }
    }

    debug!("built tree of {} nodes under {}", tree.len(), tree.root().path.display());
    Ok(tree)
}

fn kind_of(entry: &walkdir::DirEntry) -> NodeKind {
    if entry.file_type().is_dir() {
        NodeKind::Directory
    } else {
        NodeKind::File
    }
}
