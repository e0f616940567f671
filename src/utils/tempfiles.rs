use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Sibling temp path for `final_path` (`<name>.tmp`).
pub fn temp_path_for(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    final_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.tmp"))
}

pub fn rename_temp_to_final(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path).with_context(|| {
        format!(
            "atomic rename temp output to final path ({} -> {})",
            temp_path.display(),
            final_path.display()
        )
    })
}

/// Write `contents` to a temp file next to `path`, then rename over `path`. Readers see the
/// old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);
    if let Err(e) = fs::write(&temp_path, contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("write temp output {}", temp_path.display()));
    }
    rename_temp_to_final(&temp_path, path)
}

/// Create the output directory unless it is the working directory.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir == Path::new(".") {
        return Ok(());
    }
    fs::create_dir_all(dir).with_context(|| format!("create output directory {}", dir.display()))
}
