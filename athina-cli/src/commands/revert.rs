use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(file: PathBuf, identity: String, dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;
    let filename = super::file_key(repo.workdir(), &file)?;

    let reverted = repo
        .revert_engine()
        .revert_to_identity(&filename, &identity)
        .with_context(|| format!("Failed to revert {}", filename))?;

    println!(
        "{} {} {}",
        "✓ Reverted".green().bold(),
        filename,
        format!("to entry #{}", reverted.target).dimmed()
    );
    println!("  {}: {}", "Revert entry".bold(), reverted.entry.hash);

    Ok(())
}
