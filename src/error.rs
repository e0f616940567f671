//! Typed errors for the enrichment and reduction core.
//!
//! Application flows wrap these in `anyhow` with context; the core keeps them typed so callers
//! can tell best-effort failures (per-unit enrichment) from fatal ones (walk, reduction).

use std::path::PathBuf;

/// Failure of one call to the description service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },
    #[error("decoding response: {0}")]
    Decode(String),
    #[error("preparing image: {0}")]
    Image(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Failure to turn a file into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("file too large ({size} bytes, max {max})")]
    TooLarge { size: u64, max: u64 },
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Failure to enrich one unit. Never fatal for a run.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("{path}: {source}")]
    Service {
        path: PathBuf,
        #[source]
        source: ServiceError,
    },
    #[error("{path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },
}

impl EnrichError {
    pub fn path(&self) -> &PathBuf {
        match self {
            EnrichError::Service { path, .. } | EnrichError::Extract { path, .. } => path,
        }
    }

    /// Unsupported types are expected in any tree and are not worth a warning.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            EnrichError::Extract {
                source: ExtractError::Unsupported(_),
                ..
            }
        )
    }
}

/// Failure while building the node tree. Aborts the build; no partial tree is returned.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("traversal error at {}: {message}", display_path(.path))]
    Traversal {
        path: Option<PathBuf>,
        message: String,
    },
    #[error("root path {0} does not exist")]
    MissingRoot(PathBuf),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Fatal failure of the map-reduce reduction. No partial analysis is returned.
#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    /// `index` is 0-based; the message shows the 1-based chunk number.
    #[error("error analyzing chunk {}: {source}", .index + 1)]
    Analyze {
        index: usize,
        #[source]
        source: ServiceError,
    },
    #[error("error combining group {} in round {round}: {source}", .group + 1)]
    Combine {
        round: usize,
        group: usize,
        #[source]
        source: ServiceError,
    },
    #[error("nothing to reduce")]
    Empty,
}

impl ReduceError {
    /// 0-based chunk index for map-phase failures.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            ReduceError::Analyze { index, .. } => Some(*index),
            _ => None,
        }
    }
}
