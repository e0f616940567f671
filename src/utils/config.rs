//! Application configuration constants.
//! Defaults, limits and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!("{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable name for `key` (e.g. `API_BASE_URL` -> `ARCHI_API_BASE_URL`).
    pub fn env_var(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix, key)
    }
}

// ---- Defaults ----

/// Values used when neither the config file, env nor CLI set them.
pub struct Defaults;

impl Defaults {
    pub const API_BASE_URL: &'static str = "http://localhost:3005";
    pub const OUTPUT_DIR: &'static str = ".";
    pub const JSON_OUTPUT_FILE: &'static str = "output.json";
    pub const MARKDOWN_OUTPUT_FILE: &'static str = "output.md";
    pub const REPORT_OUTPUT_FILE: &'static str = "report.md";
    pub const ESTIMATION_FILE: &'static str = "estimation.md";
    pub const TEXT_MODEL: &'static str = "mistral-small-2501";
    pub const IMAGE_MODEL: &'static str = "magistral-small-2509";
    /// 1 MiB.
    pub const MAX_FILE_SIZE: u64 = 1024 * 1024;
    pub const REQUEST_DELAY_MS: u64 = 200;
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;
    pub const BATCH_SIZE: usize = 5;
    pub const CONCURRENCY: usize = 4;
    pub const MAX_CHUNK_SIZE: usize = 100_000;
}

/// Ceiling for any configured worker count.
pub const MAX_CONCURRENCY: usize = 32;

// ---- Enrichment ----

/// Limits applied while building enrichment inputs.
pub struct EnrichConsts;

impl EnrichConsts {
    /// Extracted content is cut to this many characters before description.
    pub const MAX_CONTENT_CHARS: usize = 5000;
    /// Children listed in a folder summary; the rest are counted.
    pub const FOLDER_SUMMARY_MAX_CHILDREN: usize = 20;
    /// A child's description is cut to this many characters in a folder summary.
    pub const CHILD_DESCRIPTION_MAX_CHARS: usize = 100;
    /// Prefix for image descriptions.
    pub const IMAGE_DESCRIPTION_PREFIX: &'static str = "Image analysis: ";
}

/// Extensions routed to the image strategy.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Extensions read as plain text.
pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "go", "rs", "js", "py", "java", "c", "cpp", "h", "hpp", "css", "html", "xml",
    "json", "yaml", "yml", "toml", "ini", "cfg", "conf",
];

/// Extensions handled by a document reader.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["docx", "xlsx", "xls", "pdf"];

// ---- Image preparation ----

/// Re-encoding loop limits for image uploads.
pub struct ImageConsts;

impl ImageConsts {
    /// Transfer ceiling for one encoded image. 5 MiB.
    pub const MAX_BYTES: usize = 5 * 1024 * 1024;
    pub const START_QUALITY: u8 = 85;
    pub const MIN_QUALITY: u8 = 50;
    pub const QUALITY_STEP: u8 = 10;
    pub const SCALE_STEP: f64 = 0.9;
    /// Stop shrinking once either side drops below this (pixels).
    pub const MIN_SIDE: u32 = 100;
}

// ---- Reduction ----

/// Separator placed between analyses in a combination request.
pub const ANALYSIS_SEPARATOR: &str = "\n\n---\n\n";

// ---- Estimation ----

/// Per-unit processing estimates used by `estimate`.
pub struct EstimateConsts;

impl EstimateConsts {
    pub const SECS_PER_FILE: u64 = 4;
    pub const SECS_PER_FOLDER: u64 = 7;
}

// ---- Progress ----

/// Text progress line layout.
pub struct ProgressConsts;

impl ProgressConsts {
    pub const BAR_WIDTH: usize = 40;
    pub const FILLED: char = '█';
    pub const EMPTY: char = '░';
}
