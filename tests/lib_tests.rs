use archi::engine::tools::{
    FileClass, classify, ellipsize, extension_of, normalize_path, truncate_chars,
};
use archi::engine::{
    Action, Cli, format_duration, group_by_size, partition, progress_line, tree_lines,
    tree_markdown,
};
use archi::utils::{apply_file_to_opts, parse_archi_toml, validate_opts};
use archi::service::{ModelSpec, ProviderModel};
use archi::{Node, NodeKind, NodeRecord, Opts, RunMode, RunStage, Tree};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

// --- normalize_path ---

#[test]
fn test_normalize_trailing_separator() {
    assert_eq!(
        normalize_path(Path::new("/foo/bar/")),
        PathBuf::from("/foo/bar")
    );
}

#[test]
fn test_normalize_cur_and_parent_dirs() {
    assert_eq!(
        normalize_path(Path::new("/foo/./bar/../baz")),
        PathBuf::from("/foo/baz")
    );
}

#[test]
fn test_normalize_empty_is_dot() {
    assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
}

// --- extension_of / classify ---

#[test]
fn test_extension_is_lowercase_without_dot() {
    assert_eq!(extension_of(Path::new("a/Report.PDF")), "pdf");
    assert_eq!(extension_of(Path::new("a/Makefile")), "");
}

#[test]
fn test_classify_routes_by_extension() {
    assert_eq!(classify(Path::new("x/logo.PNG")), FileClass::Image);
    assert_eq!(classify(Path::new("x/main.rs")), FileClass::Extractable);
    assert_eq!(classify(Path::new("x/notes.docx")), FileClass::Extractable);
    assert_eq!(classify(Path::new("x/archive.tar")), FileClass::Unsupported);
    assert_eq!(classify(Path::new("x/LICENSE")), FileClass::Unsupported);
}

// --- truncate_chars / ellipsize ---

#[test]
fn test_truncate_counts_chars_not_bytes() {
    assert_eq!(truncate_chars("héllo", 2), "hé");
    assert_eq!(truncate_chars("hi", 10), "hi");
}

#[test]
fn test_ellipsize_only_when_cut() {
    assert_eq!(ellipsize("abcdef", 3), "abc...");
    assert_eq!(ellipsize("abc", 3), "abc");
}

// --- partition ---

#[test]
fn test_partition_concat_reproduces_text() {
    let text = "The quick brown fox jumps over the lazy dog. Grüße aus Köln ✓✓✓";
    for max in 1..=text.len() + 1 {
        let joined: String = partition(text, max).map(|c| c.text).collect();
        assert_eq!(joined, text, "max = {max}");
    }
}

#[test]
fn test_partition_respects_bound_and_order() {
    let text = "0123456789abcdefghij✓klmnop";
    let chunks: Vec<_> = partition(text, 5).collect();
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert!(chunk.text.len() <= 5);
        assert!(!chunk.text.is_empty());
    }
}

#[test]
fn test_partition_single_chunk_when_fits() {
    let chunks: Vec<_> = partition("short", 100).collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "short");
}

#[test]
fn test_partition_empty_text_yields_one_empty_chunk() {
    let chunks: Vec<_> = partition("", 10).collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "");
}

#[test]
fn test_partition_is_restartable() {
    let chunks = partition("aaaabbbbcc", 4);
    let first: Vec<_> = chunks.clone().map(|c| c.text).collect();
    let second: Vec<_> = chunks.map(|c| c.text).collect();
    assert_eq!(first, vec!["aaaa", "bbbb", "cc"]);
    assert_eq!(first, second);
}

// --- group_by_size ---

#[test]
fn test_grouping_five_per_group() {
    // 13 bytes + 7 separator = 20 per item; 100 fits five.
    let analyses: Vec<String> = (0..23).map(|_| "x".repeat(13)).collect();
    let groups = group_by_size(&analyses, 100);
    let sizes: Vec<usize> = groups.iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![5, 5, 5, 5, 3]);
    assert_eq!(groups.first().map(|r| r.start), Some(0));
    assert_eq!(groups.last().map(|r| r.end), Some(23));
}

#[test]
fn test_grouping_is_contiguous() {
    let analyses: Vec<String> = ["a", "bbbbbbbbbb", "cc", "d", "eeeeeeeeeeeeeeee"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let groups = group_by_size(&analyses, 25);
    for pair in groups.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert!(groups.len() < analyses.len());
}

#[test]
fn test_grouping_pairs_oversized_items() {
    let analyses: Vec<String> = (0..5).map(|_| "y".repeat(50)).collect();
    let groups = group_by_size(&analyses, 10);
    assert_eq!(groups, vec![0..2, 2..4, 4..5]);
}

#[test]
fn test_grouping_single_item() {
    let analyses = vec!["only".to_string()];
    assert_eq!(group_by_size(&analyses, 1), vec![0..1]);
}

// --- progress_line ---

#[test]
fn test_progress_line_zero_total_is_none() {
    assert_eq!(progress_line(0, 0, "Files"), None);
}

#[test]
fn test_progress_line_half() {
    let expected = format!("Files [{}{}] 50.0% (2/4)", "█".repeat(20), "░".repeat(20));
    assert_eq!(progress_line(2, 4, "Files"), Some(expected));
}

#[test]
fn test_progress_line_complete() {
    let line = progress_line(3, 3, "Folders").unwrap_or_default();
    assert!(line.ends_with("100.0% (3/3)"));
    assert!(!line.contains('░'));
}

// --- format_duration ---

#[test]
fn test_format_duration_ranges() {
    assert_eq!(format_duration(Duration::from_secs(12)), "12.0s");
    assert_eq!(format_duration(Duration::from_secs(200)), "3m 20s");
    assert_eq!(format_duration(Duration::from_secs(7500)), "2h 5m");
}

// --- tree rendering and records ---

fn sample_tree() -> Tree {
    let mut tree = Tree::with_root(Node::new(
        PathBuf::from("/p/proj"),
        "proj".to_string(),
        NodeKind::Directory,
    ));
    let src = tree.push_child(
        Tree::ROOT,
        Node::new(
            PathBuf::from("/p/proj/src"),
            "src".to_string(),
            NodeKind::Directory,
        ),
    );
    let main = tree.push_child(
        src,
        Node::new(
            PathBuf::from("/p/proj/src/main.rs"),
            "main.rs".to_string(),
            NodeKind::File,
        ),
    );
    tree.push_child(
        Tree::ROOT,
        Node::new(
            PathBuf::from("/p/proj/README.md"),
            "README.md".to_string(),
            NodeKind::File,
        ),
    );
    tree.set_content(main, "fn main() {}".to_string());
    tree.set_description(main, "Entry point.".to_string());
    tree.set_description(src, "Sources.".to_string());
    tree
}

#[test]
fn test_tree_lines_box_drawing() {
    let expected = "📁 proj\n├── 📁 src\n│   └── 📄 main.rs\n└── 📖 README.md\n";
    assert_eq!(tree_lines(&sample_tree()), expected);
}

#[test]
fn test_tree_markdown_lists_descriptions() {
    let md = tree_markdown(&sample_tree());
    assert!(md.starts_with("# Directory Tree Analysis"));
    assert!(md.contains("## Descriptions"));
    assert!(md.contains("`src/main.rs`\n\nEntry point."));
    assert!(md.contains("`src`\n\nSources."));
    assert!(md.contains("## Legend"));
}

#[test]
fn test_record_round_trip() {
    let tree = sample_tree();
    let json = serde_json::to_string_pretty(&tree.to_record()).unwrap();
    assert!(json.contains("\"type\": \"directory\""));
    let record: NodeRecord = serde_json::from_str(&json).unwrap();
    let rebuilt = Tree::from_record(&record);
    assert_eq!(rebuilt.len(), tree.len());
    assert_eq!(rebuilt.to_record(), tree.to_record());
}

#[test]
fn test_record_omits_empty_fields() {
    let tree = sample_tree();
    let value = serde_json::to_value(tree.to_record()).unwrap();
    let readme = &value["children"][1];
    assert_eq!(readme["name"], "README.md");
    assert!(readme.get("children").is_none());
    assert!(readme.get("description").is_none());
    assert!(readme.get("content").is_none());
}

// --- config ---

#[test]
fn test_toml_applies_over_defaults() {
    let file = parse_archi_toml(
        r#"
[settings]
api_base_url = "http://svc:9000"
batch_size = 3
request_delay_ms = 0
mode = "description-only"

[concurrency]
archi_analysis = 8

[models]
file = "small-model"
image = [{ provider = "acme", model = "vision-1" }]
"#,
    )
    .unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts).unwrap();
    assert_eq!(opts.api_base_url, "http://svc:9000");
    assert_eq!(opts.batch_size, 3);
    assert_eq!(opts.request_delay, Duration::ZERO);
    assert_eq!(opts.mode, RunMode::DescriptionOnly);
    assert!(!opts.store_content());
    assert_eq!(opts.concurrency.archi_analysis, 8);
    assert_eq!(opts.concurrency.report_chunking, 4);
    assert_eq!(opts.models.file, ModelSpec::Single("small-model".to_string()));
    assert_eq!(
        opts.models.image,
        ModelSpec::Providers(vec![ProviderModel {
            provider: "acme".to_string(),
            model: "vision-1".to_string(),
        }])
    );
    assert_eq!(opts.json_output_file, "output.json");
}

#[test]
fn test_toml_rejects_unknown_mode() {
    let file = parse_archi_toml("[settings]\nmode = \"everything\"\n").unwrap();
    let mut opts = Opts::default();
    assert!(apply_file_to_opts(&file, &mut opts).is_err());
}

#[test]
fn test_toml_rejects_unknown_key() {
    assert!(parse_archi_toml("[settings]\nbatchsize = 2\n").is_err());
}

#[test]
fn test_validate_clamps_concurrency() {
    let mut opts = Opts::default();
    opts.concurrency.archi_analysis = 64;
    opts.concurrency.report_chunking = 33;
    validate_opts(&mut opts).unwrap();
    assert_eq!(opts.concurrency.archi_analysis, 32);
    assert_eq!(opts.concurrency.report_chunking, 32);
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut opts = Opts {
        batch_size: 0,
        ..Opts::default()
    };
    assert!(validate_opts(&mut opts).is_err());

    let mut opts = Opts::default();
    opts.models.folder = ModelSpec::Providers(vec![ProviderModel {
        provider: "acme".to_string(),
        model: " ".to_string(),
    }]);
    assert!(validate_opts(&mut opts).is_err());

    let mut opts = Opts {
        api_base_url: String::new(),
        ..Opts::default()
    };
    assert!(validate_opts(&mut opts).is_err());
}

#[test]
fn test_folder_only_mode_skips_files() {
    let opts = Opts {
        mode: RunMode::FolderOnly,
        ..Opts::default()
    };
    assert!(opts.skip_files());
    assert!(Opts::default().store_content());
}

// --- CLI ---

#[test]
fn test_cli_default_is_describe_current_dir() {
    let cli = Cli::try_parse_from(["archi"]).unwrap();
    assert_eq!(cli.action(), Action::Describe(PathBuf::from(".")));
}

#[test]
fn test_cli_subcommands_and_aliases() {
    let cli = Cli::try_parse_from(["archi", "estimate", "some/dir"]).unwrap();
    assert_eq!(cli.action(), Action::Estimate(PathBuf::from("some/dir")));
    let cli = Cli::try_parse_from(["archi", "count"]).unwrap();
    assert_eq!(cli.action(), Action::Estimate(PathBuf::from(".")));
    let cli = Cli::try_parse_from(["archi", "arch"]).unwrap();
    assert_eq!(cli.action(), Action::Architecture);
}

#[test]
fn test_cli_flags() {
    let cli = Cli::try_parse_from(["archi", "proj", "--count-only"]).unwrap();
    assert_eq!(cli.action(), Action::Estimate(PathBuf::from("proj")));
    let cli = Cli::try_parse_from(["archi", "--better-archi", "--count-only"]).unwrap();
    assert_eq!(cli.action(), Action::Architecture);
    let cli = Cli::try_parse_from(["archi", "proj", "--only-folders", "--no-content=false"]).unwrap();
    assert_eq!(cli.only_folders, Some(true));
    assert_eq!(cli.no_content, Some(false));
    assert_eq!(cli.verbose, None);
}

// --- run stages ---

#[test]
fn test_run_stage_sequence() {
    let mut stage = RunStage::Idle;
    let mut seen = vec![stage];
    while let Some(next) = stage.next() {
        seen.push(next);
        stage = next;
    }
    assert_eq!(
        seen,
        vec![
            RunStage::Idle,
            RunStage::BuildingTree,
            RunStage::EnrichingFiles,
            RunStage::EnrichingFolders,
            RunStage::Serialized,
        ]
    );
    assert!(RunStage::Failed.is_terminal());
}
