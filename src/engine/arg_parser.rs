use clap::{Parser, Subcommand};
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Describe a directory tree with an AI description service.
#[derive(Clone, Parser)]
#[command(name = "archi")]
#[command(about = "Walk a directory, describe every file and folder, write output.json and output.md.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory to analyze. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Config file. Default: `archi.toml` in the working directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only walk and describe folders.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub only_folders: Option<bool>,

    /// Do not store extracted file content in output.json.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub no_content: Option<bool>,

    /// Only count files and folders and estimate execution time (same as `estimate`).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub count_only: Option<bool>,

    /// Analyze existing outputs into an architecture report (same as `architecture`).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub better_archi: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Count files and folders and estimate execution time.
    #[command(alias = "count")]
    Estimate {
        /// Directory to count. Default: current directory.
        #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
        dir: PathBuf,
    },
    /// Generate an architecture report from output.json and output.md.
    #[command(visible_alias = "arch", alias = "archi")]
    Architecture,
}

/// What a parsed command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Describe(PathBuf),
    Estimate(PathBuf),
    Architecture,
}

impl Cli {
    /// Subcommands win over flags; `--better-archi` wins over `--count-only`.
    pub fn action(&self) -> Action {
        match &self.command {
            Some(Commands::Estimate { dir }) => Action::Estimate(dir.clone()),
            Some(Commands::Architecture) => Action::Architecture,
            None if self.better_archi.unwrap_or(false) => Action::Architecture,
            None if self.count_only.unwrap_or(false) => Action::Estimate(self.dir.clone()),
            None => Action::Describe(self.dir.clone()),
        }
    }
}
