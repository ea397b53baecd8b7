//! `jnl`: open, create and search worklog entries, and keep the quick-link
//! tree in sync.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jnl_journal::JournalConfig;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser, Debug)]
#[command(name = "jnl", version, about = "Worklog journal with tag-driven quick links")]
struct Cli {
    /// Journal root directory (overrides the config file)
    #[arg(long, global = true, env = "JNL_DIR")]
    root: Option<PathBuf>,

    /// Config file (default: <config dir>/jnl/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Open every entry of a project
    #[command(visible_aliases = ["p", "project"])]
    Proj {
        /// Project prefix (default: contents of ./.project)
        name: Option<String>,
    },

    /// Create an empty entry and open it
    New,

    /// Open today's daily entry, creating it if needed, then scan
    #[command(visible_aliases = ["daily", "t"])]
    Today,

    /// Open the previous daily entry, then scan
    #[command(visible_aliases = ["y", "yd"])]
    Yesterday,

    /// Open the entry with this guid
    Open {
        guid: String,
    },

    /// Rebuild the quick-link tree
    Scan,

    /// Show git status of the journal
    #[command(visible_alias = "st")]
    Stat,

    /// Pull, scan, show status and optionally push
    Sync {
        #[arg(value_enum)]
        mode: Option<SyncMode>,
    },

    /// Search entries and open the chosen one
    Search {
        /// Case-insensitive pattern, or /pattern/ for case-sensitive
        pattern: String,
    },

    /// List entries carrying a tag
    Tagged {
        name: String,
        value: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SyncMode {
    /// Run `git autopush` after the scan
    Push,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `--config`, else the per-user config file if present, else defaults;
/// `--root` / `JNL_DIR` replaces the root of whichever was picked.
fn resolve_config(
    root: Option<&Path>,
    config_path: Option<&Path>,
    default_path: Option<PathBuf>,
) -> Result<JournalConfig> {
    let config = match config_path {
        Some(path) => JournalConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => match default_path.filter(|path| path.is_file()) {
            Some(path) => JournalConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => JournalConfig::default(),
        },
    };
    Ok(match root {
        Some(root) => config.with_root(root),
        None => config,
    })
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(
        cli.root.as_deref(),
        cli.config.as_deref(),
        JournalConfig::default_path(),
    )?;
    debug!("Journal root {}", config.root.display());

    let command = cli.command.unwrap_or(Commands::Proj { name: None });
    commands::dispatch(command, config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
