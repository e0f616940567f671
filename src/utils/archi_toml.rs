//! Load `archi.toml` (CLI only) and validate the merged options.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::service::ModelSpec;
use crate::types::{Opts, RunMode};
use crate::utils::config::{MAX_CONCURRENCY, PackagePaths};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiToml {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    concurrency: ConcurrencySection,
    #[serde(default)]
    models: ModelsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    api_base_url: Option<String>,
    output_dir: Option<PathBuf>,
    json_output_file: Option<String>,
    markdown_output_file: Option<String>,
    report_output_file: Option<String>,
    estimation_file: Option<String>,
    mode: Option<String>,
    max_file_size: Option<u64>,
    request_delay_ms: Option<u64>,
    batch_size: Option<usize>,
    request_timeout_secs: Option<u64>,
    max_chunk_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConcurrencySection {
    archi_analysis: Option<usize>,
    report_chunking: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelsSection {
    file: Option<ModelSpec>,
    folder: Option<ModelSpec>,
    architecture: Option<ModelSpec>,
    image: Option<ModelSpec>,
}

/// Parse config text. Unknown keys are an error so typos do not go unnoticed.
pub fn parse_archi_toml(text: &str) -> Result<ArchiToml> {
    toml::from_str(text).context("parse config")
}

/// Load the config file at `explicit`, or `./archi.toml` when none is given.
/// A missing explicit file is a warning; a missing default file is silent. Parse errors are fatal.
pub fn load_archi_toml(explicit: Option<&Path>) -> Result<Option<ArchiToml>> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(PackagePaths::get().config_filename()),
    };
    if !path.is_file() {
        if explicit.is_some() {
            warn!("Config file not found: {}, using defaults", path.display());
        }
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let file = parse_archi_toml(&text).with_context(|| format!("in {}", path.display()))?;
    info!("Loading configuration from: {}", path.display());
    Ok(Some(file))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
pub fn apply_file_to_opts(file: &ArchiToml, opts: &mut Opts) -> Result<()> {
    let s = &file.settings;
    apply_file_opt!(s, opts, api_base_url => api_base_url);
    apply_file_opt!(s, opts, output_dir => output_dir);
    apply_file_opt!(s, opts, json_output_file => json_output_file);
    apply_file_opt!(s, opts, markdown_output_file => markdown_output_file);
    apply_file_opt!(s, opts, report_output_file => report_output_file);
    apply_file_opt!(s, opts, estimation_file => estimation_file);
    apply_file_opt!(s, opts, max_file_size => max_file_size);
    apply_file_opt!(s, opts, batch_size => batch_size);
    apply_file_opt!(s, opts, max_chunk_size => max_chunk_size);
    if let Some(mode) = s.mode.as_deref() {
        opts.mode = RunMode::parse(mode).with_context(|| {
            format!("mode '{mode}' must be one of: full, description-only, folder-only")
        })?;
    }
    if let Some(ms) = s.request_delay_ms {
        opts.request_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = s.request_timeout_secs {
        opts.request_timeout = Duration::from_secs(secs);
    }

    let c = &file.concurrency;
    apply_file_opt!(c, opts.concurrency, archi_analysis => archi_analysis);
    apply_file_opt!(c, opts.concurrency, report_chunking => report_chunking);

    let m = &file.models;
    apply_file_opt!(m, opts.models, file => file);
    apply_file_opt!(m, opts.models, folder => folder);
    apply_file_opt!(m, opts.models, architecture => architecture);
    apply_file_opt!(m, opts.models, image => image);
    Ok(())
}

fn clamp_concurrency(name: &str, value: &mut usize) {
    if *value > MAX_CONCURRENCY {
        warn!(
            "concurrency.{} value {} is higher than allowed max {}, clamping to {}",
            name, value, MAX_CONCURRENCY, MAX_CONCURRENCY
        );
        *value = MAX_CONCURRENCY;
    }
}

/// Check merged options. Worker counts above the ceiling are clamped with a warning;
/// everything else invalid is an error.
pub fn validate_opts(opts: &mut Opts) -> Result<()> {
    if opts.api_base_url.trim().is_empty() {
        bail!("api_base_url cannot be empty");
    }
    for (name, value) in [
        ("json_output_file", &opts.json_output_file),
        ("markdown_output_file", &opts.markdown_output_file),
        ("report_output_file", &opts.report_output_file),
        ("estimation_file", &opts.estimation_file),
    ] {
        if value.trim().is_empty() {
            bail!("{name} cannot be empty");
        }
    }
    if opts.max_file_size == 0 {
        bail!("max_file_size must be positive");
    }
    if opts.batch_size == 0 {
        bail!("batch_size must be >= 1");
    }
    if opts.max_chunk_size == 0 {
        bail!("max_chunk_size must be >= 1");
    }
    if opts.concurrency.archi_analysis == 0 {
        bail!("concurrency.archi_analysis must be >= 1");
    }
    if opts.concurrency.report_chunking == 0 {
        bail!("concurrency.report_chunking must be >= 1");
    }
    clamp_concurrency("archi_analysis", &mut opts.concurrency.archi_analysis);
    clamp_concurrency("report_chunking", &mut opts.concurrency.report_chunking);

    for (name, spec) in [
        ("models.file", &opts.models.file),
        ("models.folder", &opts.models.folder),
        ("models.architecture", &opts.models.architecture),
        ("models.image", &opts.models.image),
    ] {
        if let Some(problem) = spec.validate() {
            bail!("{name}: {problem}");
        }
    }
    Ok(())
}
