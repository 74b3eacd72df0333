use anyhow::{Context, Result};
use athina_core::{Action, OpKind};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(file: PathBuf, depth: usize, patch: bool, dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;
    let filename = super::file_key(repo.workdir(), &file)?;

    let entries = repo
        .history(&filename, depth)
        .with_context(|| format!("Failed to read history of {}", filename))?;

    println!("{} {}", "History of".bold(), filename.cyan());
    println!();

    for entry in entries {
        let change = match entry.change {
            Action::Add => entry.change.as_str().green(),
            Action::Delete => entry.change.as_str().red(),
            Action::Revert => entry.change.as_str().magenta(),
            _ => entry.change.as_str().yellow(),
        };

        println!("{} {}", entry.hash.yellow(), change);
        if let Some(created) = entry.created {
            println!("  {}: {}", "Date".bold(), created.format("%Y-%m-%d %H:%M:%S"));
        }
        if !entry.delta.is_empty() {
            println!("  {}: {}", "Delta".bold(), entry.delta.dimmed());
        }

        if patch && !entry.diffs.is_empty() {
            let mut line = String::new();
            for op in &entry.diffs {
                let text = match op.kind {
                    OpKind::Equal => op.text.normal(),
                    OpKind::Insert => op.text.green().underline(),
                    OpKind::Delete => op.text.red().strikethrough(),
                };
                line.push_str(&text.to_string());
            }
            for patch_line in line.lines() {
                println!("    {}", patch_line);
            }
        }

        println!();
    }

    Ok(())
}
