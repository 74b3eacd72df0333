use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use super::update::short;

#[derive(Subcommand)]
pub enum StashCommand {
    /// Snapshot the histories of the given files, or of every tracked file
    Create { files: Vec<PathBuf> },

    /// List stash commits
    List,

    /// Show the files of a stash commit
    Show {
        /// Commit hash (a unique prefix is enough)
        hash: String,
    },
}

pub fn run(command: StashCommand, dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;

    match command {
        StashCommand::Create { files } => {
            let filenames = files
                .iter()
                .map(|file| super::file_key(repo.workdir(), file))
                .collect::<Result<Vec<_>>>()?;

            let commit = repo.create_stash(&filenames)?;
            println!(
                "{} {} {}",
                "✓ Stashed".green().bold(),
                short(&commit.hash).yellow(),
                format!("({} file(s))", commit.items.len()).dimmed()
            );
        }
        StashCommand::List => {
            let stash = repo.stash()?;
            if stash.stashes.is_empty() {
                println!("{}", "No stash commits".dimmed());
            }
            for commit in &stash.stashes {
                println!(
                    "{} {}",
                    commit.hash.yellow(),
                    format!("{} file(s)", commit.items.len()).dimmed()
                );
            }
        }
        StashCommand::Show { hash } => {
            let commit = repo.stash_commit(&hash)?;

            println!("{} {}", "Commit".bold(), commit.hash.yellow());
            for item in &commit.items {
                println!(
                    "  {} {}",
                    item.filename.cyan(),
                    format!("{} entries", item.filediffs.len()).dimmed()
                );
            }
        }
    }

    Ok(())
}
