//! Full-run orchestration: build the tree, log a scan summary, run the file and folder passes.

use anyhow::{Context, Result};
use log::info;
use std::collections::BTreeMap;
use std::path::Path;

use crate::engine::pool::BatchPool;
use crate::engine::tools::{FileClass, classify, extension_of};
use crate::extract::Extractor;
use crate::service::Describer;
use crate::types::{NodeKind, Opts, Tree};

use super::context::RunContext;
use super::enrich::{Enricher, PassReport};
use super::error_handler::report_skipped_units;
use super::walk::build_tree;

/// Counts over a built tree, logged before enrichment starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Includes the root.
    pub directories: usize,
    pub files: usize,
    pub extractable: usize,
    pub images: usize,
    /// Extractable types by `.ext`.
    pub extractable_types: BTreeMap<String, usize>,
    /// Image types by `.ext`.
    pub image_types: BTreeMap<String, usize>,
}

impl ScanSummary {
    pub fn of(tree: &Tree) -> Self {
        let mut summary = ScanSummary::default();
        for (_, node) in tree.iter() {
            if node.kind == NodeKind::Directory {
                summary.directories += 1;
                continue;
            }
            summary.files += 1;
            let ext = format!(".{}", extension_of(&node.path));
            match classify(&node.path) {
                FileClass::Extractable => {
                    summary.extractable += 1;
                    *summary.extractable_types.entry(ext).or_default() += 1;
                }
                FileClass::Image => {
                    summary.images += 1;
                    *summary.image_types.entry(ext).or_default() += 1;
                }
                FileClass::Unsupported => {}
            }
        }
        summary
    }

    pub fn log(&self) {
        info!("Directory analysis complete:");
        info!("  Total directories: {}", self.directories);
        info!("  Total files: {}", self.files);
        info!("  Files with extractable content: {}", self.extractable);
        info!("  Image files (analyzed with the vision endpoint): {}", self.images);
        for (ext, count) in &self.image_types {
            info!("    {}: {} image file(s)", ext, count);
        }
        for (ext, count) in &self.extractable_types {
            info!("    {}: {} file(s), content extracted", ext, count);
        }
    }
}

/// Enriched tree plus what each pass did. `files` is `None` when files were not walked.
#[derive(Debug)]
pub struct EnrichedTree {
    pub tree: Tree,
    pub scan: ScanSummary,
    pub files: Option<PassReport>,
    pub folders: PassReport,
}

/// Run the pipeline up to (not including) serialization. A walk failure moves `ctx` to
/// `Failed` and is returned; per-unit enrichment failures are only reported.
pub fn run_pipeline(
    root: &Path,
    opts: &Opts,
    describer: &dyn Describer,
    extractor: &dyn Extractor,
    ctx: &mut RunContext,
) -> Result<EnrichedTree> {
    ctx.advance();
    let mut tree = match build_tree(root, opts.skip_files()) {
        Ok(tree) => tree,
        Err(err) => {
            ctx.fail();
            return Err(err).with_context(|| format!("build tree under {}", root.display()));
        }
    };
    let scan = ScanSummary::of(&tree);
    scan.log();

    let pool = BatchPool::new(opts.batch_size, opts.request_delay, "enrich")?;
    let enricher = Enricher::new(describer, extractor, pool, opts.store_content());

    ctx.advance();
    let files = if opts.skip_files() {
        info!("Only folders requested: file pass skipped");
        None
    } else {
        let report = enricher.enrich_files(&mut tree);
        report_skipped_units("Files", &report, opts.verbose);
        Some(report)
    };

    ctx.advance();
    let folders = enricher.enrich_folders(&mut tree);
    report_skipped_units("Folders", &folders, opts.verbose);

    Ok(EnrichedTree {
        tree,
        scan,
        files,
        folders,
    })
}
