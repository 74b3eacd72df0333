use anyhow::Result;
use athina_core::Repository;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(dir: Option<PathBuf>) -> Result<()> {
    let workdir = super::get_workdir(dir)?;
    let repo = Repository::init(&workdir)?;

    println!("{}", "✓ Athina has been initialized".green().bold());
    println!("  {}: {}", "Store".bold(), repo.storage().root().display());

    Ok(())
}
