//! Engine module: reusable algorithms and the CLI front

pub mod arg_parser;
pub mod chunker;
pub mod cli;
pub mod pool;
pub mod progress;
pub mod reduce;
pub mod render;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::{Action, Cli, Commands};
pub use chunker::{Chunk, Chunks, partition};
pub use cli::handle_run;
pub use pool::{BatchPool, BatchReport, batch_ranges, run_indexed};
pub use progress::{Progress, progress_line};
pub use reduce::{ReduceConfig, Reducer, Reduction, group_by_size};
pub use render::{format_duration, tree_json, tree_lines, tree_markdown};
