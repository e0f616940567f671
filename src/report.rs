//! Architecture report over the outputs of a previous full run.

use anyhow::{Context, Result, bail};
use log::info;
use std::fs;

use crate::engine::reduce::{ReduceConfig, Reducer, Reduction};
use crate::service::Analyst;
use crate::types::Opts;
use crate::utils::write_atomic;

/// Label used when the whole input fits in one chunk.
pub const SINGLE_CHUNK_LABEL: &str = "output.json and output.md";

/// Text analyzed by the report: the JSON record followed by the markdown rendering.
pub fn combined_input(json: &str, markdown: &str) -> String {
    format!("JSON Structure Data:\n{json}\n\nMarkdown Tree Visualization:\n{markdown}")
}

/// Reduce `output.json` + `output.md` to one analysis and write it to the report file.
/// Both inputs must exist; any analysis failure aborts without writing a report.
pub fn architecture_report(opts: &Opts, analyst: &dyn Analyst) -> Result<Reduction> {
    info!("Starting architectural analysis");
    let json_path = opts.json_output_path();
    let md_path = opts.markdown_output_path();
    for path in [&json_path, &md_path] {
        if !path.is_file() {
            bail!(
                "{} not found. Run a full analysis first to generate it",
                path.display()
            );
        }
    }
    let json = fs::read_to_string(&json_path)
        .with_context(|| format!("read {}", json_path.display()))?;
    let markdown =
        fs::read_to_string(&md_path).with_context(|| format!("read {}", md_path.display()))?;
    let combined = combined_input(&json, &markdown);
    info!("Total content size: {} bytes", combined.len());

    let reducer = Reducer::new(analyst, ReduceConfig::from(opts));
    let reduction = reducer
        .reduce_text(&combined, SINGLE_CHUNK_LABEL)
        .context("architecture analysis")?;

    let report_path = opts.report_output_path();
    write_atomic(&report_path, reduction.analysis.as_bytes())?;
    info!(
        "Architectural analysis complete ({} chunk(s), {} round(s)); report saved to {}",
        reduction.chunks,
        reduction.rounds,
        report_path.display()
    );
    Ok(reduction)
}
