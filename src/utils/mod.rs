pub mod archi_toml;
pub mod config;
pub mod env;
pub mod logger;
pub mod tempfiles;

pub use archi_toml::{apply_file_to_opts, load_archi_toml, parse_archi_toml, validate_opts};
pub use config::*;
pub use env::{apply_env_to_opts, load_dotenv};
pub use logger::setup_logging;
pub use tempfiles::{prepare_output_dir, write_atomic};
