use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Files,
    Ignored,
}

pub fn run(kind: ListKind, dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;

    let names = match kind {
        ListKind::Files => repo.tracked_files()?,
        ListKind::Ignored => repo.config().ignored.clone(),
    };

    if names.is_empty() {
        let what = match kind {
            ListKind::Files => "No tracked files",
            ListKind::Ignored => "No ignored files",
        };
        println!("{}", what.dimmed());
    }

    for name in names {
        println!("{}", name);
    }

    Ok(())
}
