//! Environment overrides: process env, then `.env` in the working directory.

use log::debug;
use std::path::{Path, PathBuf};

use crate::types::Opts;
use crate::utils::config::PackagePaths;

/// Load `dir/.env` into the process environment. Variables already set win.
pub fn load_dotenv(dir: &Path) {
    let env_path = dir.join(".env");
    if env_path.is_file() {
        match dotenvy::from_path(&env_path) {
            Ok(()) => debug!("loaded {}", env_path.display()),
            Err(e) => log::warn!("{}: {}", env_path.display(), e),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    let name = PackagePaths::get().env_var(key);
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Apply `ARCHI_API_BASE_URL` and `ARCHI_OUTPUT_DIR` when set and non-empty.
pub fn apply_env_to_opts(opts: &mut Opts) {
    if let Some(url) = env_value("API_BASE_URL") {
        opts.api_base_url = url;
    }
    if let Some(dir) = env_value("OUTPUT_DIR") {
        opts.output_dir = PathBuf::from(dir);
    }
}
