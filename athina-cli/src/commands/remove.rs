use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(files: Vec<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;

    for file in files {
        let filename = super::file_key(repo.workdir(), &file)?;
        repo.untrack(&filename)
            .with_context(|| format!("Failed to remove {}", filename))?;

        println!("{} {}", "✓ Removed history of".green(), filename);
    }

    Ok(())
}
