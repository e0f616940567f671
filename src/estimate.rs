//! Count-only run: file and folder counts with a processing time estimate.

use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::engine::render::{estimation_markdown, format_duration};
use crate::engine::tools::extension_of;
use crate::pipeline::build_tree;
use crate::types::{CountEstimation, FileTypeStats, FolderStats, NodeId, NodeKind, Opts, Tree};
use crate::utils::config::EstimateConsts;
use crate::utils::write_atomic;

fn file_time(files: usize) -> Duration {
    Duration::from_secs(files as u64 * EstimateConsts::SECS_PER_FILE)
}

fn folder_time(folders: usize) -> Duration {
    Duration::from_secs(folders as u64 * EstimateConsts::SECS_PER_FOLDER)
}

/// `(files, directories)` strictly below `id`.
fn count_below(tree: &Tree, id: NodeId) -> (usize, usize) {
    let mut files = 0;
    let mut dirs = 0;
    let mut stack: Vec<NodeId> = tree.node(id).children.clone();
    while let Some(next) = stack.pop() {
        let node = tree.node(next);
        match node.kind {
            NodeKind::File => files += 1,
            NodeKind::Directory => {
                dirs += 1;
                stack.extend(node.children.iter().copied());
            }
        }
    }
    (files, dirs)
}

/// Estimation over an already built tree. The root counts as a folder.
pub fn estimate_tree(tree: &Tree) -> CountEstimation {
    let mut total_files = 0;
    let mut total_folders = 0;
    let mut by_ext: HashMap<String, usize> = HashMap::new();
    for (_, node) in tree.iter() {
        match node.kind {
            NodeKind::Directory => total_folders += 1,
            NodeKind::File => {
                total_files += 1;
                let ext = extension_of(&node.path);
                let key = if ext.is_empty() {
                    "no extension".to_string()
                } else {
                    format!(".{ext}")
                };
                *by_ext.entry(key).or_default() += 1;
            }
        }
    }

    let mut file_type_stats: Vec<FileTypeStats> = by_ext
        .into_iter()
        .map(|(extension, count)| FileTypeStats {
            extension,
            count,
            estimated_time: file_time(count),
        })
        .collect();
    file_type_stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.extension.cmp(&b.extension))
    });

    let root_folders = tree
        .root()
        .children
        .iter()
        .copied()
        .filter(|&id| tree.node(id).kind.is_dir())
        .map(|id| {
            let node = tree.node(id);
            let (file_count, subfolder_count) = count_below(tree, id);
            FolderStats {
                name: node.name.clone(),
                path: node.path.clone(),
                file_count,
                subfolder_count,
                estimated_time: file_time(file_count) + folder_time(subfolder_count + 1),
            }
        })
        .collect();

    CountEstimation {
        total_files,
        total_folders,
        file_type_stats,
        root_folders,
        total_estimated_time: file_time(total_files) + folder_time(total_folders),
    }
}

/// Walk `root`, estimate, and write the estimation markdown. A walk error is fatal.
pub fn estimate_dir(root: &Path, opts: &Opts) -> Result<CountEstimation> {
    info!("Count-only mode: analyzing directory structure of {}", root.display());
    let tree = build_tree(root, false)
        .with_context(|| format!("count entries under {}", root.display()))?;
    let estimation = estimate_tree(&tree);

    let path = opts.estimation_output_path();
    write_atomic(&path, estimation_markdown(&estimation, &Local::now()).as_bytes())?;

    info!("Analysis complete:");
    info!("  Total files: {}", estimation.total_files);
    info!("  Total folders: {}", estimation.total_folders);
    info!(
        "  Estimated execution time: {}",
        format_duration(estimation.total_estimated_time)
    );
    info!("  Estimation saved to: {}", path.display());
    Ok(estimation)
}
