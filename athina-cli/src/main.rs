use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{history, ignore, init, list, remove, reset, revert, stash, status, update};

#[derive(Parser)]
#[command(name = "athina")]
#[command(version, about = "Local per-file version history", long_about = None)]
struct Cli {
    /// Working directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize athina in the working directory
    Init,

    /// Show added, deleted and modified files
    Status,

    /// Record changes to the given files, or to every file if none are given
    Update {
        files: Vec<PathBuf>,
    },

    /// Remove the history of the given files
    Remove {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Add files to the ignore list
    Ignore {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Remove the files from the ignore list instead
        #[arg(long)]
        remove: bool,
    },

    /// Restart the history of the given files from their current content,
    /// or wipe every history if no file is given
    Reset {
        files: Vec<PathBuf>,

        /// Do not ask for confirmation before wiping every history
        #[arg(short, long)]
        force: bool,
    },

    /// Restore a file to the content it had at a history entry
    Revert {
        file: PathBuf,

        /// Identity of the history entry (a unique prefix is enough)
        identity: String,
    },

    /// Show the history of a file, newest first
    History {
        file: PathBuf,

        /// Number of entries to show
        #[arg(default_value_t = athina_core::DEFAULT_HISTORY_DEPTH)]
        depth: usize,

        /// Show the edit of each entry
        #[arg(short, long)]
        patch: bool,
    },

    /// List tracked or ignored files
    List {
        #[arg(value_enum)]
        kind: list::ListKind,
    },

    /// Group file histories into named snapshots
    Stash {
        #[command(subcommand)]
        command: stash::StashCommand,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.dir;

    match cli.command {
        Commands::Init => init::run(dir),
        Commands::Status => status::run(dir),
        Commands::Update { files } => update::run(files, dir),
        Commands::Remove { files } => remove::run(files, dir),
        Commands::Ignore { files, remove } => ignore::run(files, remove, dir),
        Commands::Reset { files, force } => reset::run(files, force, dir),
        Commands::Revert { file, identity } => revert::run(file, identity, dir),
        Commands::History { file, depth, patch } => history::run(file, depth, patch, dir),
        Commands::List { kind } => list::run(kind, dir),
        Commands::Stash { command } => stash::run(command, dir),
    }
}

/// 2: invalid argument, 3: not found, 4: corrupt history, 1: anything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    let core = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<athina_core::Error>());

    match core {
        Some(athina_core::Error::InvalidArgument(_)) => 2,
        Some(e) if e.is_not_found() => 3,
        Some(e) if e.is_corruption() => 4,
        _ => 1,
    }
}
