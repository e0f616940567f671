//! CLI command handler: full run by default, `estimate` and `architecture` on request.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::Opts;
use crate::describe::describe_dir;
use crate::engine::arg_parser::{Action, Cli};
use crate::estimate::estimate_dir;
use crate::extract::DocumentExtractor;
use crate::report::architecture_report;
use crate::service::ApiClient;
use crate::utils::{
    apply_env_to_opts, apply_file_to_opts, load_archi_toml, load_dotenv, prepare_output_dir,
    setup_logging, validate_opts,
};

/// Merge defaults < config file < env < CLI flags, then validate.
pub fn setup_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();
    if let Some(file) = load_archi_toml(cli.config.as_deref())? {
        apply_file_to_opts(&file, &mut opts)?;
    }
    load_dotenv(&std::env::current_dir().context("current directory")?);
    apply_env_to_opts(&mut opts);

    if let Some(v) = cli.only_folders {
        opts.only_folders = v;
    }
    if let Some(v) = cli.no_content {
        opts.no_content = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    validate_opts(&mut opts)?;
    prepare_output_dir(&opts.output_dir)?;
    Ok(opts)
}

/// Run whatever the command line asks for.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose.unwrap_or(false));
    let opts = setup_opts(cli)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    match cli.action() {
        Action::Estimate(dir) => {
            estimate_dir(&dir, &opts)?;
        }
        Action::Architecture => {
            let client = ApiClient::new(&opts).context("build API client")?;
            architecture_report(&opts, &client)?;
        }
        Action::Describe(dir) => {
            let client = ApiClient::new(&opts).context("build API client")?;
            info!("API endpoint: {}", client.base_url());
            let extractor = DocumentExtractor::new(opts.max_file_size);
            describe_dir(&dir, &opts, &client, &extractor)?;
        }
    }
    Ok(())
}
