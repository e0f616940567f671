//! Archi: walk a directory tree, describe every file and folder with an AI service, and reduce
//! the result into an architecture report.

pub mod describe;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod service;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use describe::describe_dir;
pub use error::{EnrichError, ExtractError, ReduceError, ServiceError, WalkError};
pub use estimate::{estimate_dir, estimate_tree};
pub use extract::{DocumentExtractor, Extractor};
pub use pipeline::{RunStage, build_tree};
pub use report::architecture_report;
pub use service::{Analyst, ApiClient, Describer};

/// Result alias used by public archi API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
