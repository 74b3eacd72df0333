use anyhow::{Context, Result};
use athina_core::{AppliedChange, UpdateOutcome};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

pub fn run(files: Vec<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;
    let pipeline = repo.pipeline();

    if files.is_empty() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Scanning for changes...");

        let result = pipeline.update_all_with(|change| {
            spinner.set_message(format!("Updated {}", change.filename));
        });
        spinner.finish_and_clear();

        let applied = result?;
        for change in &applied {
            print_change(change);
        }

        let failed = applied
            .iter()
            .filter(|change| matches!(change.outcome, UpdateOutcome::Failed { .. }))
            .count();
        if failed == 0 {
            println!("{}", "✓ All files have been updated".green().bold());
        } else {
            println!("{} {} file(s) could not be updated", "!".red().bold(), failed);
        }
        return Ok(());
    }

    for file in files {
        let filename = super::file_key(repo.workdir(), &file)?;
        let outcome = pipeline
            .update_file(&filename)
            .with_context(|| format!("Failed to update {}", filename))?;

        print_change(&AppliedChange { filename, outcome });
    }

    Ok(())
}

fn print_change(change: &AppliedChange) {
    let name = &change.filename;
    match &change.outcome {
        UpdateOutcome::Added => println!("  {} {}", "added".green(), name),
        UpdateOutcome::Deleted { identity } => {
            println!("  {} {} {}", "deleted".red(), name, short(identity).dimmed())
        }
        UpdateOutcome::Modified { identity } => {
            println!("  {} {} {}", "modified".yellow(), name, short(identity).dimmed())
        }
        UpdateOutcome::AlreadyDeleted => {
            println!("  {} {}", "already deleted".dimmed(), name)
        }
        UpdateOutcome::Failed { reason } => {
            println!("  {} {} {}", "failed".red().bold(), name, reason.dimmed())
        }
        UpdateOutcome::Unchanged => {}
    }
}

pub fn short(identity: &str) -> &str {
    identity.get(..12).unwrap_or(identity)
}
