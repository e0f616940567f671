//! Description service: the capabilities the core consumes, and the HTTP client implementing them.
//!
//! The batch passes only see [`Describer`]; the reduction engine only sees [`Analyst`]. Tests
//! plug in-process fakes in both places.

pub mod client;
pub mod image;
pub mod prompts;
pub mod protocol;

pub use client::ApiClient;
pub use protocol::{ModelSpec, ProviderModel};

use std::path::Path;

use crate::error::ServiceError;

/// Per-unit enrichment used by the file and folder passes.
pub trait Describer: Send + Sync {
    /// Describe extracted text of the file `name`.
    fn describe_file(&self, content: &str, name: &str) -> Result<String, ServiceError>;

    /// Describe the image at `path`. Implementations handle any size reduction before upload.
    fn describe_image(&self, path: &Path) -> Result<String, ServiceError>;

    /// Describe the folder `name` from its textual summary.
    fn describe_folder(&self, summary: &str, name: &str) -> Result<String, ServiceError>;
}

/// Chunk analysis and combination used by the reduction engine.
pub trait Analyst: Send + Sync {
    fn analyze(&self, chunk: &str, label: &str) -> Result<String, ServiceError>;

    /// Merge an ordered group of analyses into one.
    fn combine(&self, analyses: &[String]) -> Result<String, ServiceError>;
}
