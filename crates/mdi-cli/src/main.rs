//! # mdi CLI entry point
//!
//! Parses command-line arguments and dispatches to command handlers. The
//! bare form `mdi <dataset_path> <spec_identifier>` checks a dataset; `list`
//! and `show` inspect the available specs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mdi_cli::check::{run_check, CheckArgs};
use mdi_cli::config::SpecSource;
use mdi_cli::loader_for;
use mdi_cli::specs::{run_list, run_show, ShowArgs};

/// MLLAM data interface: check that a dataset has the variables, dimensions,
/// and attributes a published spec requires.
#[derive(Parser, Debug)]
#[command(
    name = "mdi",
    version,
    about,
    long_about = None,
    subcommand_negates_reqs = true
)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read specs from `<DIR>/<name>/<version>.yaml` instead of the bundle.
    #[arg(long, global = true, value_name = "DIR")]
    specs_root: Option<PathBuf>,

    #[command(flatten)]
    check: CheckArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every available spec identifier.
    List,

    /// Print a spec document as YAML.
    Show(ShowArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("mdi CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = SpecSource::resolve(cli.specs_root.as_deref(), cli.config.as_deref())
        .and_then(|source| {
            tracing::debug!(?source, "resolved spec source");
            let loader = loader_for(&source);
            match &cli.command {
                Some(Commands::List) => run_list(&loader),
                Some(Commands::Show(args)) => run_show(args, &loader),
                None => run_check(&cli.check, &loader),
            }
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
