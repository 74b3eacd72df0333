use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use std::path::PathBuf;

pub fn run(files: Vec<PathBuf>, force: bool, dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;

    if !files.is_empty() {
        for file in files {
            let filename = super::file_key(repo.workdir(), &file)?;
            repo.reset_file(&filename)
                .with_context(|| format!("Failed to reset {}", filename))?;

            println!("{} {}", "✓ Reset history of".green(), filename);
        }
        return Ok(());
    }

    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Remove the history of every tracked file?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Reset cancelled".yellow());
            return Ok(());
        }
    }

    repo.reset_all()?;
    println!("{}", "✓ Athina has been reset".green().bold());

    Ok(())
}
