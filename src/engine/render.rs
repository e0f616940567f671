//! Text renderings of a tree and of a count estimation.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

use crate::engine::tools::extension_of;
use crate::types::{CountEstimation, NodeId, Tree};
use crate::utils::config::EstimateConsts;

/// `12.0s`, `3m 20s`, `2h 5m`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs / 60) % 60)
    }
}

fn icon_for(path: &Path, is_dir: bool) -> &'static str {
    if is_dir {
        return "📁";
    }
    match extension_of(path).as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => "🖼️",
        "pdf" => "📋",
        "docx" | "doc" => "📝",
        "xlsx" | "xls" | "json" => "📊",
        "go" => "🐹",
        "md" => "📖",
        _ => "📄",
    }
}

/// Pretty JSON of the nested node record.
pub fn tree_json(tree: &Tree) -> Result<String> {
    serde_json::to_string_pretty(&tree.to_record()).context("serialize tree")
}

/// Box-drawing rendering of the tree, one entry per line, children in tree order.
pub fn tree_lines(tree: &Tree) -> String {
    let mut out = String::new();
    let mut prefix = String::new();
    push_line(tree, Tree::ROOT, "", &mut prefix, &mut out);
    out
}

fn push_line(tree: &Tree, id: NodeId, connector: &str, prefix: &mut String, out: &mut String) {
    let node = tree.node(id);
    let _ = writeln!(
        out,
        "{prefix}{connector}{} {}",
        icon_for(&node.path, node.kind.is_dir()),
        node.name
    );
    let continuation = match connector {
        "" => "",
        "└── " => "    ",
        _ => "│   ",
    };
    let restore = prefix.len();
    prefix.push_str(continuation);
    let last = node.children.len().saturating_sub(1);
    for (i, &child) in node.children.iter().enumerate() {
        let connector = if i == last { "└── " } else { "├── " };
        push_line(tree, child, connector, prefix, out);
    }
    prefix.truncate(restore);
}

/// `output.md`: tree rendering, every populated description by path, legend.
pub fn tree_markdown(tree: &Tree) -> String {
    let mut md = String::new();
    md.push_str("# Directory Tree Analysis\n\n");
    md.push_str(
        "This document shows the analyzed directory structure with AI-generated descriptions.\n\n",
    );
    md.push_str("## Tree Structure\n\n```\n");
    md.push_str(&tree_lines(tree));
    md.push_str("```\n\n");

    let root = &tree.root().path;
    let described: Vec<NodeId> = tree
        .preorder()
        .into_iter()
        .filter(|&id| tree.node(id).description.is_some())
        .collect();
    if !described.is_empty() {
        md.push_str("## Descriptions\n\n");
        for id in described {
            let node = tree.node(id);
            let shown = match node.path.strip_prefix(root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
                _ => node.name.clone(),
            };
            let _ = writeln!(
                md,
                "### {} `{}`\n\n{}\n",
                icon_for(&node.path, node.kind.is_dir()),
                shown,
                node.description.as_deref().unwrap_or_default().trim()
            );
        }
    }

    md.push_str("## Legend\n\n");
    md.push_str("- 📁 Directory\n");
    md.push_str("- 📄 Text/Generic file\n");
    md.push_str("- 🖼️ Image file\n");
    md.push_str("- 📋 PDF document\n");
    md.push_str("- 📝 Word document\n");
    md.push_str("- 📊 Spreadsheet or JSON file\n");
    md.push_str("- 🐹 Go source file\n");
    md.push_str("- 📖 Markdown file\n\n");
    md.push_str("*Descriptions are AI-generated based on file content analysis.*\n");
    md
}

/// `estimation.md` for a finished estimation.
pub fn estimation_markdown(est: &CountEstimation, generated_at: &DateTime<Local>) -> String {
    let per_file = |n: usize| Duration::from_secs(n as u64 * EstimateConsts::SECS_PER_FILE);
    let per_folder = |n: usize| Duration::from_secs(n as u64 * EstimateConsts::SECS_PER_FOLDER);

    let mut md = String::new();
    md.push_str("# File and Folder Estimation\n\n");
    let _ = writeln!(
        md,
        "**Generated on:** {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    md.push_str("## Summary\n\n");
    let _ = writeln!(md, "- **Total Files:** {}", est.total_files);
    let _ = writeln!(md, "- **Total Folders:** {}", est.total_folders);
    let _ = writeln!(
        md,
        "- **Estimated Total Execution Time:** {}",
        format_duration(est.total_estimated_time)
    );
    let _ = writeln!(
        md,
        "  - File processing time (~{}s each): {}",
        EstimateConsts::SECS_PER_FILE,
        format_duration(per_file(est.total_files))
    );
    let _ = writeln!(
        md,
        "  - Folder processing time (~{}s each): {}\n",
        EstimateConsts::SECS_PER_FOLDER,
        format_duration(per_folder(est.total_folders))
    );

    md.push_str("## File Types Analysis\n\n");
    md.push_str("| Extension | Count | Estimated Time |\n");
    md.push_str("|-----------|-------|----------------|\n");
    for stat in &est.file_type_stats {
        let _ = writeln!(
            md,
            "| {} | {} | {} |",
            stat.extension,
            stat.count,
            format_duration(stat.estimated_time)
        );
    }
    md.push('\n');

    md.push_str("## Root Folders Analysis\n\n");
    md.push_str("| Folder Name | Files | Subfolders | Estimated Time |\n");
    md.push_str("|-------------|-------|------------|----------------|\n");
    for folder in &est.root_folders {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            folder.name,
            folder.file_count,
            folder.subfolder_count,
            format_duration(folder.estimated_time)
        );
    }
    md.push('\n');

    md.push_str("## Detailed Root Folder Breakdown\n\n");
    for folder in &est.root_folders {
        let _ = writeln!(md, "### {}\n", folder.name);
        let _ = writeln!(md, "- **Path:** `{}`", folder.path.display());
        let _ = writeln!(
            md,
            "- **Files:** {} (estimated {} for processing)",
            folder.file_count,
            format_duration(per_file(folder.file_count))
        );
        let _ = writeln!(
            md,
            "- **Subfolders:** {} (estimated {} for processing)",
            folder.subfolder_count,
            format_duration(per_folder(folder.subfolder_count))
        );
        let _ = writeln!(
            md,
            "- **Total estimated time for this folder:** {}\n",
            format_duration(folder.estimated_time)
        );
    }

    md.push_str("---\n\n");
    let _ = writeln!(
        md,
        "*This estimation calculates execution time based on {} seconds per file and {} seconds per folder for AI analysis.*",
        EstimateConsts::SECS_PER_FILE,
        EstimateConsts::SECS_PER_FOLDER
    );
    md
}
