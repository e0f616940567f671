//! Full run: walk, enrich, write `output.json` and `output.md`.

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use crate::engine::render::{tree_json, tree_markdown};
use crate::extract::Extractor;
use crate::pipeline::{EnrichedTree, RunContext, run_pipeline};
use crate::service::Describer;
use crate::types::{Opts, Tree};
use crate::utils::write_atomic;

/// Run the pipeline on `root` and write both outputs into the output directory.
pub fn describe_dir(
    root: &Path,
    opts: &Opts,
    describer: &dyn Describer,
    extractor: &dyn Extractor,
) -> Result<EnrichedTree> {
    let mut ctx = RunContext::new();
    info!("Analyzing directory structure of {}", root.display());
    let enriched = run_pipeline(root, opts, describer, extractor, &mut ctx)?;

    let (json_path, md_path) = write_tree_outputs(&enriched.tree, opts)?;
    ctx.advance();
    info!("JSON output written to {}", json_path.display());
    info!("Markdown output written to {}", md_path.display());
    Ok(enriched)
}

/// Write the JSON record and the markdown rendering, each atomically. Returns both paths.
pub fn write_tree_outputs(tree: &Tree, opts: &Opts) -> Result<(PathBuf, PathBuf)> {
    let json_path = opts.json_output_path();
    write_atomic(&json_path, tree_json(tree)?.as_bytes())?;
    let md_path = opts.markdown_output_path();
    write_atomic(&md_path, tree_markdown(tree).as_bytes())?;
    Ok((json_path, md_path))
}
