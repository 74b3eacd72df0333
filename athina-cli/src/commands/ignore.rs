use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(files: Vec<PathBuf>, remove: bool, dir: Option<PathBuf>) -> Result<()> {
    let mut repo = super::open_repository(dir)?;

    for file in files {
        let filename = super::file_key(repo.workdir(), &file)?;

        if remove {
            if repo.unignore(&filename)? {
                println!("{} {}", "✓ No longer ignoring".green(), filename);
            } else {
                println!("{} {}", "Not ignored:".yellow(), filename);
            }
        } else if repo.ignore(&filename)? {
            println!("{} {}", "✓ Ignoring".green(), filename);
        } else {
            println!("{} {}", "Already ignored:".yellow(), filename);
        }
    }

    Ok(())
}
