//! Public and internal types for the archi API and pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::service::ModelSpec;
use crate::utils::config::Defaults;

/// Index of a node inside a [`Tree`] arena.
pub type NodeId = usize;

/// Variant tag of a filesystem entry. Serialized as `"file"` / `"directory"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

/// One filesystem entry. Owned by the [`Tree`]; linkage is by [`NodeId`], never by pointer.
#[derive(Clone, Debug)]
pub struct Node {
    /// Absolute, lexically normalized path. Unique within a tree.
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
    /// Extracted text (capped), only for files and only when content storage is on.
    pub content: Option<String>,
    /// Generated description. Written at most once per run.
    pub description: Option<String>,
    /// Owning parent; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Owned children in walk order.
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(path: PathBuf, name: String, kind: NodeKind) -> Self {
        Self {
            path,
            name,
            kind,
            content: None,
            description: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Ownership tree of nodes stored as an arena. The root is always [`Tree::ROOT`].
///
/// Traversals go through child links ([`Tree::preorder`]); arena order is an implementation detail.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub const ROOT: NodeId = 0;

    /// Start a tree from its root node.
    pub fn with_root(root: Node) -> Self {
        let mut root = root;
        root.parent = None;
        Self { nodes: vec![root] }
    }

    /// Append `node` as the last child of `parent`. Returns the new node's id.
    pub fn push_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = self.nodes.len();
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    /// Ids of all file nodes, in walk order.
    pub fn file_ids(&self) -> Vec<NodeId> {
        self.ids_of(NodeKind::File)
    }

    /// Ids of all directory nodes, in pre-order (root first).
    pub fn dir_ids(&self) -> Vec<NodeId> {
        self.ids_of(NodeKind::Directory)
    }

    fn ids_of(&self, kind: NodeKind) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.nodes[id].kind == kind)
            .collect()
    }

    /// Pre-order traversal from the root following child links.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    pub fn set_description(&mut self, id: NodeId, description: String) {
        debug_assert!(self.nodes[id].description.is_none());
        self.nodes[id].description = Some(description);
    }

    pub fn set_content(&mut self, id: NodeId, content: String) {
        debug_assert!(self.nodes[id].content.is_none());
        self.nodes[id].content = Some(content);
    }

    /// Nested serializable view of the tree.
    pub fn to_record(&self) -> NodeRecord {
        self.record_of(Self::ROOT)
    }

    fn record_of(&self, id: NodeId) -> NodeRecord {
        let node = &self.nodes[id];
        NodeRecord {
            path: node.path.clone(),
            name: node.name.clone(),
            kind: node.kind,
            content: node.content.clone(),
            description: node.description.clone(),
            children: node.children.iter().map(|&c| self.record_of(c)).collect(),
        }
    }

    /// Rebuild an arena from a nested record (e.g. a previously written `output.json`).
    pub fn from_record(record: &NodeRecord) -> Self {
        let mut tree = Tree::with_root(record.to_node());
        let mut stack: Vec<(NodeId, &NodeRecord)> = vec![(Self::ROOT, record)];
        while let Some((id, rec)) = stack.pop() {
            for child in &rec.children {
                let child_id = tree.push_child(id, child.to_node());
                stack.push((child_id, child));
            }
        }
        tree
    }
}

/// Nested record written to `output.json`. Empty fields are omitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub path: PathBuf,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    fn to_node(&self) -> Node {
        let mut node = Node::new(self.path.clone(), self.name.clone(), self.kind);
        node.content = self.content.clone();
        node.description = self.description.clone();
        node
    }
}

// ---- Count estimation ----

/// Per-extension file count with its processing estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct FileTypeStats {
    pub extension: String,
    pub count: usize,
    pub estimated_time: Duration,
}

/// Stats for one top-level subfolder of the estimated root.
#[derive(Clone, Debug, PartialEq)]
pub struct FolderStats {
    pub name: String,
    pub path: PathBuf,
    pub file_count: usize,
    /// Subfolders below this folder, not counting itself.
    pub subfolder_count: usize,
    pub estimated_time: Duration,
}

/// Aggregate counters for a tree with a derived total time estimate. Computed once, never mutated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountEstimation {
    pub total_files: usize,
    /// Includes the root itself.
    pub total_folders: usize,
    pub file_type_stats: Vec<FileTypeStats>,
    pub root_folders: Vec<FolderStats>,
    pub total_estimated_time: Duration,
}

// ---- Options ----

/// What a full run stores and enriches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Full,
    /// Descriptions only; extracted content is not stored on nodes.
    DescriptionOnly,
    /// Directories only; files are not walked.
    FolderOnly,
}

impl RunMode {
    /// Parse a config value. Empty means [`RunMode::Full`].
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "full" => Some(RunMode::Full),
            "description-only" => Some(RunMode::DescriptionOnly),
            "folder-only" => Some(RunMode::FolderOnly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Full => "full",
            RunMode::DescriptionOnly => "description-only",
            RunMode::FolderOnly => "folder-only",
        }
    }
}

/// Model selection per service operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Models {
    pub file: ModelSpec,
    pub folder: ModelSpec,
    pub architecture: ModelSpec,
    pub image: ModelSpec,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            file: ModelSpec::Single(Defaults::TEXT_MODEL.to_string()),
            folder: ModelSpec::Single(Defaults::TEXT_MODEL.to_string()),
            architecture: ModelSpec::Single(Defaults::TEXT_MODEL.to_string()),
            image: ModelSpec::Single(Defaults::IMAGE_MODEL.to_string()),
        }
    }
}

/// Worker counts per reduction phase. Read once per run, clamped to [`crate::utils::config::MAX_CONCURRENCY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Concurrency {
    /// Workers for the map phase (chunk analysis).
    pub archi_analysis: usize,
    /// Workers for the reduce phase (group combination).
    pub report_chunking: usize,
}

impl Default for Concurrency {
    fn default() -> Self {
        Self {
            archi_analysis: Defaults::CONCURRENCY,
            report_chunking: Defaults::CONCURRENCY,
        }
    }
}

/// Full options (CLI, config file, env). Defaults match an unconfigured install.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Base URL of the description service.
    pub api_base_url: String,
    /// Directory receiving every output file.
    pub output_dir: PathBuf,
    pub json_output_file: String,
    pub markdown_output_file: String,
    pub report_output_file: String,
    pub estimation_file: String,
    pub mode: RunMode,
    pub models: Models,
    /// Files above this size (bytes) are not extracted. Images are exempt.
    pub max_file_size: u64,
    /// Pacing delay between enrichment batches.
    pub request_delay: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Units per enrichment batch.
    pub batch_size: usize,
    pub concurrency: Concurrency,
    /// Upper bound for one chunk / one combination group (bytes).
    pub max_chunk_size: usize,
    /// Walk directories only.
    pub only_folders: bool,
    /// Do not store extracted content on nodes.
    pub no_content: bool,
    /// Debug logging.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            api_base_url: Defaults::API_BASE_URL.to_string(),
            output_dir: PathBuf::from(Defaults::OUTPUT_DIR),
            json_output_file: Defaults::JSON_OUTPUT_FILE.to_string(),
            markdown_output_file: Defaults::MARKDOWN_OUTPUT_FILE.to_string(),
            report_output_file: Defaults::REPORT_OUTPUT_FILE.to_string(),
            estimation_file: Defaults::ESTIMATION_FILE.to_string(),
            mode: RunMode::Full,
            models: Models::default(),
            max_file_size: Defaults::MAX_FILE_SIZE,
            request_delay: Duration::from_millis(Defaults::REQUEST_DELAY_MS),
            request_timeout: Duration::from_secs(Defaults::REQUEST_TIMEOUT_SECS),
            batch_size: Defaults::BATCH_SIZE,
            concurrency: Concurrency::default(),
            max_chunk_size: Defaults::MAX_CHUNK_SIZE,
            only_folders: false,
            no_content: false,
            verbose: false,
        }
    }
}

impl Opts {
    /// True when files are left out of the walk (flag or folder-only mode).
    pub fn skip_files(&self) -> bool {
        self.only_folders || self.mode == RunMode::FolderOnly
    }

    /// True when extracted content is kept on file nodes.
    pub fn store_content(&self) -> bool {
        !(self.no_content || self.mode == RunMode::DescriptionOnly)
    }

    pub fn json_output_path(&self) -> PathBuf {
        self.output_path(&self.json_output_file)
    }

    pub fn markdown_output_path(&self) -> PathBuf {
        self.output_path(&self.markdown_output_file)
    }

    pub fn report_output_path(&self) -> PathBuf {
        self.output_path(&self.report_output_file)
    }

    pub fn estimation_output_path(&self) -> PathBuf {
        self.output_path(&self.estimation_file)
    }

    fn output_path(&self, file: &str) -> PathBuf {
        Path::new(&self.output_dir).join(file)
    }
}
