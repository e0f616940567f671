//! Enrichment passes: files first, then folders, each in paced batches on a [`BatchPool`].
//!
//! Workers get owned copies of what they need (path, name, summary) and hand back results;
//! only the coordinating thread writes onto the tree. A failing unit is skipped with a warning.

use log::{debug, info, warn};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crate::engine::pool::{BatchPool, BatchReport};
use crate::engine::progress::Progress;
use crate::engine::tools::{FileClass, classify, ellipsize, extension_of, truncate_chars};
use crate::error::{EnrichError, ExtractError};
use crate::extract::Extractor;
use crate::service::Describer;
use crate::types::{NodeId, NodeKind, Tree};
use crate::utils::config::EnrichConsts;

/// Counters for one pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Units dispatched to the pool.
    pub units: usize,
    pub described: usize,
    /// Extracted nothing; nothing sent.
    pub empty: usize,
    pub unsupported: usize,
    /// Units whose enrichment failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Work item for the file pass.
struct FileUnit {
    id: NodeId,
    path: PathBuf,
    name: String,
}

/// Work item for the folder pass.
struct FolderUnit {
    id: NodeId,
    path: PathBuf,
    name: String,
    summary: String,
}

enum Outcome {
    Described(String),
    Empty,
    Failed(EnrichError),
}

struct FileResult {
    id: NodeId,
    content: Option<String>,
    outcome: Outcome,
}

/// Runs both enrichment passes against a [`Describer`] and an [`Extractor`].
pub struct Enricher<'a> {
    describer: &'a dyn Describer,
    extractor: &'a dyn Extractor,
    pool: BatchPool,
    store_content: bool,
}

impl<'a> Enricher<'a> {
    pub fn new(
        describer: &'a dyn Describer,
        extractor: &'a dyn Extractor,
        pool: BatchPool,
        store_content: bool,
    ) -> Self {
        Self {
            describer,
            extractor,
            pool,
            store_content,
        }
    }

    /// Describe every file node. Images go to the image endpoint, extractable files have their
    /// text (capped) sent to the file prompt, everything else is skipped.
    pub fn enrich_files(&self, tree: &mut Tree) -> PassReport {
        let units: Vec<FileUnit> = tree
            .file_ids()
            .into_iter()
            .map(|id| {
                let node = tree.node(id);
                FileUnit {
                    id,
                    path: node.path.clone(),
                    name: node.name.clone(),
                }
            })
            .collect();
        info!(
            "Describing {} file(s) in batches of {}",
            units.len(),
            self.pool.batch_size()
        );

        let mut progress = Progress::new("Describing files", units.len());
        let results = self.pool.run(
            units,
            |unit| self.describe_file_unit(unit),
            |report| on_batch(&mut progress, report),
        );
        progress.finish();

        let mut pass = PassReport {
            units: results.len(),
            ..PassReport::default()
        };
        for result in results {
            if let Some(content) = result.content {
                tree.set_content(result.id, content);
            }
            apply(tree, result.id, result.outcome, &mut pass);
        }
        pass
    }

    fn describe_file_unit(&self, unit: FileUnit) -> FileResult {
        let FileUnit { id, path, name } = unit;
        let (content, outcome) = match classify(&path) {
            FileClass::Image => match self.describer.describe_image(&path) {
                Ok(text) => (
                    None,
                    Outcome::Described(format!("{}{}", EnrichConsts::IMAGE_DESCRIPTION_PREFIX, text)),
                ),
                Err(source) => (None, Outcome::Failed(EnrichError::Service { path, source })),
            },
            FileClass::Extractable => match self.extract(&path) {
                Err(source) => (None, Outcome::Failed(EnrichError::Extract { path, source })),
                Ok(text) if text.trim().is_empty() => (None, Outcome::Empty),
                Ok(text) => {
                    let outcome = match self.describer.describe_file(&text, &name) {
                        Ok(description) => Outcome::Described(description),
                        Err(source) => Outcome::Failed(EnrichError::Service {
                            path,
                            source,
                        }),
                    };
                    (self.store_content.then_some(text), outcome)
                }
            },
            FileClass::Unsupported => {
                let ext = extension_of(&path);
                let source = ExtractError::Unsupported(if ext.is_empty() {
                    "no extension".to_string()
                } else {
                    format!(".{ext}")
                });
                (None, Outcome::Failed(EnrichError::Extract { path, source }))
            }
        };
        FileResult {
            id,
            content,
            outcome,
        }
    }

    fn extract(&self, path: &std::path::Path) -> Result<String, ExtractError> {
        let size = fs::metadata(path)?.len();
        let text = self.extractor.extract(path, size)?;
        Ok(truncate_chars(&text, EnrichConsts::MAX_CONTENT_CHARS).to_string())
    }

    /// Describe every non-empty folder from a summary of its children. Summaries are built
    /// from the tree as the file pass left it.
    pub fn enrich_folders(&self, tree: &mut Tree) -> PassReport {
        let units: Vec<FolderUnit> = tree
            .dir_ids()
            .into_iter()
            .filter(|&id| !tree.node(id).children.is_empty())
            .map(|id| {
                let node = tree.node(id);
                FolderUnit {
                    id,
                    path: node.path.clone(),
                    name: node.name.clone(),
                    summary: folder_summary(tree, id),
                }
            })
            .collect();
        info!(
            "Describing {} folder(s) in batches of {}",
            units.len(),
            self.pool.batch_size()
        );

        let mut progress = Progress::new("Describing folders", units.len());
        let results = self.pool.run(
            units,
            |unit| {
                let outcome = match self.describer.describe_folder(&unit.summary, &unit.name) {
                    Ok(description) => Outcome::Described(description),
                    Err(source) => Outcome::Failed(EnrichError::Service {
                        path: unit.path,
                        source,
                    }),
                };
                (unit.id, outcome)
            },
            |report| on_batch(&mut progress, report),
        );
        progress.finish();

        let mut pass = PassReport {
            units: results.len(),
            ..PassReport::default()
        };
        for (id, outcome) in results {
            apply(tree, id, outcome, &mut pass);
        }
        pass
    }
}

fn on_batch(progress: &mut Progress, report: BatchReport) {
    debug!(
        "batch {}/{} done ({}/{})",
        report.batch + 1,
        report.batches,
        report.done,
        report.total
    );
    progress.set(report.done);
}

fn apply(tree: &mut Tree, id: NodeId, outcome: Outcome, pass: &mut PassReport) {
    match outcome {
        Outcome::Described(description) => {
            tree.set_description(id, description);
            pass.described += 1;
        }
        Outcome::Empty => pass.empty += 1,
        Outcome::Failed(err) if err.is_unsupported() => {
            debug!("skipping {}", err);
            pass.unsupported += 1;
        }
        Outcome::Failed(err) => {
            warn!("Failed to describe {}", err);
            pass.failed.push((err.path().clone(), err.to_string()));
        }
    }
}

/// Text sent to describe the folder `id`: its first children (files with their description
/// cut short, folders with their item count) and a count of the rest.
pub fn folder_summary(tree: &Tree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut summary = String::new();
    let _ = writeln!(summary, "Folder: {}", node.name);
    summary.push_str("Contents:\n");
    for &child_id in node
        .children
        .iter()
        .take(EnrichConsts::FOLDER_SUMMARY_MAX_CHILDREN)
    {
        let child = tree.node(child_id);
        match child.kind {
            NodeKind::Directory if child.children.is_empty() => {
                let _ = writeln!(summary, "📁 {}/ (directory)", child.name);
            }
            NodeKind::Directory => {
                let _ = writeln!(
                    summary,
                    "📁 {}/ (directory with {} items)",
                    child.name,
                    child.children.len()
                );
            }
            NodeKind::File => match child.description.as_deref() {
                Some(description) => {
                    let _ = writeln!(
                        summary,
                        "📄 {} - {}",
                        child.name,
                        ellipsize(description, EnrichConsts::CHILD_DESCRIPTION_MAX_CHARS)
                    );
                }
                None => {
                    let _ = writeln!(summary, "📄 {}", child.name);
                }
            },
        }
    }
    let shown = EnrichConsts::FOLDER_SUMMARY_MAX_CHILDREN;
    if node.children.len() > shown {
        let _ = writeln!(summary, "... and {} more items", node.children.len() - shown);
    }
    summary
}
