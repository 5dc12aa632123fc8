use std::{env, sync::Arc};

use anyhow::Context;
use clap::Parser;
use dirzip_lib::{Config, merge_configs};
use tracing_subscriber::{EnvFilter, fmt};

mod error;
mod fs_utils;
mod naming;
mod packaging;
mod process;
mod sink;

use crate::process::{RunSettings, process_root_within_tokio};
use crate::sink::ConsoleSink;

#[derive(Parser, Debug)]
#[command(
    name = "dirzip",
    author,
    version,
    about = "Zip every subdirectory of a directory, each into its own archive",
    long_about = None
)]
pub struct Cli {
    /// Directory whose subdirectories are archived (defaults to the current directory)
    #[arg()]
    pub root: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Archive suffix appended to each subdirectory name
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Glob patterns on entry names to leave out (can be specified multiple times)
    #[arg(short = 's', long)]
    pub skip: Vec<String>,

    /// Maximum number of directories archived at once (0 = unbounded)
    #[arg(short = 'j', long)]
    pub max_tasks: Option<usize>,

    /// Delete an archive whose directory walk failed instead of keeping it
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub remove_partial: bool,

    /// Dry run (list the archives that would be written)
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub dry: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate YAML config to stdout
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub generate_yaml_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Step 1: Read environment
    let env_config = Config::from_env();

    // Step 2: Read config file (if any)
    let file_config = match cli.config.clone().or(env_config.config.clone()) {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };

    // Step 3: Merge configs: env < file < CLI
    let merged = merge_configs(env_config, file_config, cli_to_config(&cli)).with_defaults();
    tracing::debug!(?merged, "effective configuration");

    if cli.generate_yaml_config {
        let yaml = serde_yaml::to_string(&merged)?;
        println!("{yaml}");
        return Ok(());
    }

    let cwd = env::current_dir().context("resolving current directory")?;
    let settings = RunSettings::from_config(&merged, &cwd)?;
    if settings.dry {
        println!("--- DRY RUN ---");
    }

    match process_root_within_tokio(settings, Arc::new(ConsoleSink)) {
        Ok(summary) => {
            tracing::info!(
                archived = summary.archived,
                failed = summary.failed,
                skipped = summary.skipped,
                "done"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("run aborted: {e:?}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Converts CLI struct into Config. Flags left at their defaults stay
/// unset so that file and environment values can show through.
fn cli_to_config(cli: &Cli) -> Config {
    Config {
        root: cli.root.clone(),
        config: cli.config.clone(),
        extension: cli.extension.clone(),
        skip: if cli.skip.is_empty() {
            None
        } else {
            Some(cli.skip.clone())
        },
        max_tasks: cli.max_tasks,
        remove_partial: cli.remove_partial.then_some(true),
        dry: cli.dry.then_some(true),
    }
}
