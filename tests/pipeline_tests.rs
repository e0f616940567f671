use archi::engine::BatchPool;
use archi::pipeline::{Enricher, RunContext, folder_summary, run_pipeline};
use archi::{
    Describer, DocumentExtractor, NodeKind, NodeRecord, Opts, RunStage, ServiceError, Tree,
    WalkError, build_tree, describe_dir, estimate_tree,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// In-process describer: fails for the file names in `fail_on`, records every call.
#[derive(Default)]
struct FakeDescriber {
    fail_on: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeDescriber {
    fn failing(names: &[&'static str]) -> Self {
        Self {
            fail_on: names.to_vec(),
            ..Self::default()
        }
    }
}

impl Describer for FakeDescriber {
    fn describe_file(&self, content: &str, name: &str) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push(name.to_string());
        if self.fail_on.iter().any(|f| *f == name) {
            return Err(ServiceError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(format!("file {name} ({} chars)", content.chars().count()))
    }

    fn describe_image(&self, path: &Path) -> Result<String, ServiceError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.calls.lock().unwrap().push(name.clone());
        Ok(format!("picture {name}"))
    }

    fn describe_folder(&self, summary: &str, name: &str) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push(format!("{name}/"));
        assert!(summary.starts_with(&format!("Folder: {name}\n")));
        Ok(format!("folder {name}"))
    }
}

fn fast_opts(output_dir: &Path) -> Opts {
    Opts {
        output_dir: output_dir.to_path_buf(),
        request_delay: Duration::ZERO,
        ..Opts::default()
    }
}

fn write(path: PathBuf, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn find(tree: &Tree, name: &str) -> usize {
    tree.iter()
        .find(|(_, n)| n.name == name)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("{name} not in tree"))
}

// --- tree builder ---

#[test]
fn test_build_tree_single_root_no_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("a/x.txt"), "x");
    write(dir.path().join("a/b/y.txt"), "y");
    write(dir.path().join("a/b/c/z.txt"), "z");
    write(dir.path().join("top.md"), "t");
    fs::create_dir_all(dir.path().join("empty")).unwrap();

    let tree = build_tree(dir.path(), false).unwrap();
    assert_eq!(tree.len(), 9);
    assert_eq!(tree.root().parent, None);
    assert!(tree.root().kind.is_dir());

    let order = tree.preorder();
    let unique: HashSet<_> = order.iter().copied().collect();
    assert_eq!(order.len(), tree.len());
    assert_eq!(unique.len(), tree.len());

    for (id, node) in tree.iter().skip(1) {
        let parent = node.parent.expect("non-root node has a parent");
        assert!(tree.node(parent).children.contains(&id));
        assert!(node.path.starts_with(&tree.node(parent).path));
    }
    let paths: HashSet<_> = tree.iter().map(|(_, n)| n.path.clone()).collect();
    assert_eq!(paths.len(), tree.len());
}

#[test]
fn test_build_tree_children_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["c.txt", "a.txt", "b.txt"] {
        write(dir.path().join(name), "x");
    }
    let tree = build_tree(dir.path(), false).unwrap();
    let names: Vec<_> = tree
        .root()
        .children
        .iter()
        .map(|&id| tree.node(id).name.as_str())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
}

#[test]
fn test_build_tree_trailing_separator() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("sub/f.txt"), "x");
    let with_slash = PathBuf::from(format!("{}/", dir.path().display()));
    let a = build_tree(dir.path(), false).unwrap();
    let b = build_tree(&with_slash, false).unwrap();
    assert_eq!(a.len(), b.len());
    assert_eq!(a.root().path, b.root().path);
}

#[test]
fn test_build_tree_only_folders() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("a/x.txt"), "x");
    write(dir.path().join("a/b/y.txt"), "y");
    write(dir.path().join("z.txt"), "z");
    let tree = build_tree(dir.path(), true).unwrap();
    assert_eq!(tree.len(), 3);
    assert!(tree.iter().all(|(_, n)| n.kind == NodeKind::Directory));
}

#[test]
fn test_build_tree_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let err = build_tree(&dir.path().join("nope"), false).unwrap_err();
    assert!(matches!(err, WalkError::MissingRoot(_)));
}

#[cfg(unix)]
#[test]
fn test_build_tree_does_not_follow_symlinks() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("real/inner.txt"), "x");
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling")).unwrap();

    let tree = build_tree(dir.path(), false).unwrap();
    // root, dangling, link, real, real/inner.txt
    assert_eq!(tree.len(), 5);
    for name in ["link", "dangling"] {
        let node = tree.node(find(&tree, name));
        assert_eq!(node.kind, NodeKind::File);
        assert!(node.children.is_empty());
    }
    assert_eq!(tree.iter().filter(|(_, n)| n.name == "inner.txt").count(), 1);
}

// --- batch pool ---

#[test]
fn test_batches_run_in_sequence() {
    let pool = BatchPool::new(3, Duration::ZERO, "test").unwrap();
    let finished_batches = AtomicUsize::new(0);
    let units: Vec<usize> = (1..=10).collect();
    let mut reports = Vec::new();

    let seen = pool.run(
        units,
        |unit| (unit, finished_batches.load(Ordering::SeqCst)),
        |report| {
            finished_batches.fetch_add(1, Ordering::SeqCst);
            reports.push(report);
        },
    );

    // Unit f(i) must start only after every earlier batch has finished.
    let expected: Vec<(usize, usize)> = (1..=10).map(|i| (i, (i - 1) / 3)).collect();
    assert_eq!(seen, expected);
    let done: Vec<usize> = reports.iter().map(|r| r.done).collect();
    assert_eq!(done, vec![3, 6, 9, 10]);
    assert!(reports.iter().all(|r| r.batches == 4 && r.total == 10));
}

#[test]
fn test_batch_peak_concurrency_is_batch_size() {
    let pool = BatchPool::new(4, Duration::ZERO, "test").unwrap();
    let running = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    pool.run(
        (0..12).collect::<Vec<_>>(),
        |_| {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            running.fetch_sub(1, Ordering::SeqCst);
        },
        |_| {},
    );
    assert!(peak.load(Ordering::SeqCst) <= 4);
}

#[test]
fn test_batch_pacing_between_batches_only() {
    let pool = BatchPool::new(3, Duration::from_millis(100), "test").unwrap();
    let start = Instant::now();
    let out = pool.run((0..10).collect::<Vec<usize>>(), |unit| unit * 2, |_| {});
    let elapsed = start.elapsed();

    // Four batches, three gaps; nothing after the last batch.
    assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
    assert_eq!(out, (0..10).map(|i| i * 2).collect::<Vec<_>>());
}

// --- enrichment ---

#[test]
fn test_partial_failure_skips_only_failing_file() {
    let dir = tempfile::tempdir().unwrap();
    for i in 1..=5 {
        write(dir.path().join(format!("f{i}.txt")), &format!("content of file {i}"));
    }
    let mut tree = build_tree(dir.path(), false).unwrap();
    let describer = FakeDescriber::failing(&["f3.txt"]);
    let extractor = DocumentExtractor::new(1024 * 1024);
    let pool = BatchPool::new(5, Duration::ZERO, "test").unwrap();
    let enricher = Enricher::new(&describer, &extractor, pool, true);

    let report = enricher.enrich_files(&mut tree);

    for i in [1, 2, 4, 5] {
        let node = tree.node(find(&tree, &format!("f{i}.txt")));
        assert!(node.description.is_some(), "f{i} should be described");
        assert_eq!(node.content.as_deref(), Some(format!("content of file {i}").as_str()));
    }
    assert_eq!(tree.node(find(&tree, "f3.txt")).description, None);
    assert_eq!(report.described, 4);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("f3.txt"));
}

#[test]
fn test_file_classes_take_their_route() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("notes.md"), "# Notes");
    write(dir.path().join("logo.png"), "not really a png");
    write(dir.path().join("blob.bin"), "\u{1}\u{2}");
    write(dir.path().join("blank.txt"), "   \n");
    let mut tree = build_tree(dir.path(), false).unwrap();
    let describer = FakeDescriber::default();
    let extractor = DocumentExtractor::new(1024 * 1024);
    let pool = BatchPool::new(2, Duration::ZERO, "test").unwrap();
    let report = Enricher::new(&describer, &extractor, pool, false).enrich_files(&mut tree);

    let notes = tree.node(find(&tree, "notes.md"));
    assert_eq!(notes.description.as_deref(), Some("file notes.md (7 chars)"));
    assert_eq!(notes.content, None);
    assert_eq!(
        tree.node(find(&tree, "logo.png")).description.as_deref(),
        Some("Image analysis: picture logo.png")
    );
    assert_eq!(tree.node(find(&tree, "blob.bin")).description, None);
    assert_eq!(tree.node(find(&tree, "blank.txt")).description, None);
    assert_eq!(report.unsupported, 1);
    assert_eq!(report.empty, 1);
    assert!(report.failed.is_empty());
}

#[test]
fn test_content_capped_before_description() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("big.txt"), &"é".repeat(6000));
    let mut tree = build_tree(dir.path(), false).unwrap();
    let describer = FakeDescriber::default();
    let extractor = DocumentExtractor::new(1024 * 1024);
    let pool = BatchPool::new(1, Duration::ZERO, "test").unwrap();
    Enricher::new(&describer, &extractor, pool, true).enrich_files(&mut tree);

    let node = tree.node(find(&tree, "big.txt"));
    assert_eq!(node.description.as_deref(), Some("file big.txt (5000 chars)"));
    assert_eq!(node.content.as_ref().map(|c| c.chars().count()), Some(5000));
}

#[test]
fn test_too_large_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("huge.txt"), &"x".repeat(200));
    let mut tree = build_tree(dir.path(), false).unwrap();
    let describer = FakeDescriber::default();
    let extractor = DocumentExtractor::new(100);
    let pool = BatchPool::new(1, Duration::ZERO, "test").unwrap();
    let report = Enricher::new(&describer, &extractor, pool, true).enrich_files(&mut tree);
    assert_eq!(tree.node(find(&tree, "huge.txt")).description, None);
    assert_eq!(report.failed.len(), 1);
    assert!(describer.calls.lock().unwrap().is_empty());
}

#[test]
fn test_folder_summary_caps_children() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..25 {
        write(dir.path().join(format!("f{i:02}.txt")), "x");
    }
    fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
    let mut tree = build_tree(dir.path(), false).unwrap();
    let first = find(&tree, "f00.txt");
    tree.set_description(first, "d".repeat(150));

    let summary = folder_summary(&tree, Tree::ROOT);
    let listed = summary.lines().filter(|l| l.starts_with("📄") || l.starts_with("📁")).count();
    assert_eq!(listed, 20);
    assert!(summary.contains(&format!("📄 f00.txt - {}...\n", "d".repeat(100))));
    assert!(summary.contains("📄 f01.txt\n"));
    assert!(summary.ends_with("... and 6 more items\n"));

    let sub = find(&tree, "sub");
    assert!(folder_summary(&tree, sub).contains("📁 inner/ (directory)"));
}

#[test]
fn test_folder_pass_skips_empty_folders() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("docs/readme.md"), "hello");
    fs::create_dir_all(dir.path().join("empty")).unwrap();
    let out = tempfile::tempdir().unwrap();
    let describer = FakeDescriber::default();
    let extractor = DocumentExtractor::new(1024 * 1024);
    let mut ctx = RunContext::new();

    let enriched = run_pipeline(dir.path(), &fast_opts(out.path()), &describer, &extractor, &mut ctx)
        .unwrap();
    let tree = &enriched.tree;
    assert_eq!(ctx.stage(), RunStage::EnrichingFolders);
    assert_eq!(tree.node(find(tree, "docs")).description.as_deref(), Some("folder docs"));
    assert_eq!(tree.node(find(tree, "empty")).description, None);
    assert!(tree.root().description.is_some());
    assert_eq!(enriched.folders.units, 2);

    let calls = describer.calls.lock().unwrap();
    let file_call = calls.iter().position(|c| c == "readme.md").unwrap();
    let folder_call = calls.iter().position(|c| c == "docs/").unwrap();
    assert!(file_call < folder_call, "files are described before folders");
}

#[test]
fn test_only_folders_run_has_no_file_pass() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("docs/readme.md"), "hello");
    let out = tempfile::tempdir().unwrap();
    let opts = Opts {
        only_folders: true,
        ..fast_opts(out.path())
    };
    let describer = FakeDescriber::default();
    let extractor = DocumentExtractor::new(1024 * 1024);
    let mut ctx = RunContext::new();
    let enriched = run_pipeline(dir.path(), &opts, &describer, &extractor, &mut ctx).unwrap();
    assert!(enriched.files.is_none());
    assert_eq!(enriched.scan.files, 0);
    assert!(describer.calls.lock().unwrap().iter().all(|c| c.ends_with('/')));
}

#[test]
fn test_walk_failure_moves_to_failed() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let describer = FakeDescriber::default();
    let extractor = DocumentExtractor::new(1024 * 1024);
    let mut ctx = RunContext::new();
    let result = run_pipeline(
        &dir.path().join("missing"),
        &fast_opts(out.path()),
        &describer,
        &extractor,
        &mut ctx,
    );
    assert!(result.is_err());
    assert_eq!(ctx.stage(), RunStage::Failed);
}

// --- outputs ---

#[test]
fn test_describe_dir_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("src/main.rs"), "fn main() {}");
    write(dir.path().join("README.md"), "# Demo");
    let out = tempfile::tempdir().unwrap();
    let opts = fast_opts(out.path());
    let describer = FakeDescriber::default();
    let extractor = DocumentExtractor::new(1024 * 1024);

    let enriched = describe_dir(dir.path(), &opts, &describer, &extractor).unwrap();

    let json = fs::read_to_string(opts.json_output_path()).unwrap();
    let record: NodeRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record, enriched.tree.to_record());
    assert_eq!(Tree::from_record(&record).len(), enriched.tree.len());

    let md = fs::read_to_string(opts.markdown_output_path()).unwrap();
    assert!(md.contains("└── 📁 src"));
    assert!(md.contains("file main.rs (12 chars)"));
    assert!(!out.path().join("output.json.tmp").exists());
}

// --- estimation ---

#[test]
fn test_estimate_tree_counts() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("a/x.rs"), "x");
    write(dir.path().join("a/b/y.rs"), "y");
    write(dir.path().join("c.txt"), "c");
    write(dir.path().join("NOTICE"), "n");
    let tree = build_tree(dir.path(), false).unwrap();
    let est = estimate_tree(&tree);

    assert_eq!(est.total_files, 4);
    assert_eq!(est.total_folders, 3);
    assert_eq!(est.total_estimated_time, Duration::from_secs(4 * 4 + 3 * 7));

    let types: Vec<(&str, usize)> = est
        .file_type_stats
        .iter()
        .map(|s| (s.extension.as_str(), s.count))
        .collect();
    assert_eq!(types, vec![(".rs", 2), (".txt", 1), ("no extension", 1)]);

    assert_eq!(est.root_folders.len(), 1);
    let a = &est.root_folders[0];
    assert_eq!((a.name.as_str(), a.file_count, a.subfolder_count), ("a", 2, 1));
    assert_eq!(a.estimated_time, Duration::from_secs(2 * 4 + 2 * 7));
}

#[test]
fn test_estimate_dir_writes_markdown() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("a/x.rs"), "x");
    let out = tempfile::tempdir().unwrap();
    let opts = fast_opts(out.path());
    archi::estimate_dir(dir.path(), &opts).unwrap();
    let md = fs::read_to_string(opts.estimation_output_path()).unwrap();
    assert!(md.starts_with("# File and Folder Estimation"));
    assert!(md.contains("| .rs | 1 | 4.0s |"));
    assert!(md.contains("- **Total Folders:** 2"));
}
