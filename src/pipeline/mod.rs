//! Pipeline components: run context, tree builder, enrichment passes, orchestration.

pub mod context;
pub mod enrich;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;

pub use context::{RunContext, RunStage};
pub use enrich::{Enricher, PassReport, folder_summary};
pub use error_handler::report_skipped_units;
pub use orchestrator::{EnrichedTree, ScanSummary, run_pipeline};
pub use walk::build_tree;
