use anyhow::Result;
use athina_core::Action;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(dir: Option<PathBuf>) -> Result<()> {
    let repo = super::open_repository(dir)?;

    let mut changes = 0;
    for event in repo.scan()? {
        if event.is_already_recorded() {
            continue;
        }

        let icon = match event.action {
            Action::Add => "+".green(),
            Action::Delete => "-".red(),
            Action::Modify => "~".yellow(),
            Action::Error => "!".red().bold(),
            Action::None | Action::Revert => continue,
        };

        changes += 1;
        match &event.error {
            Some(error) => println!("  {} {} {}", icon, event.filename, error.to_string().red()),
            None => println!("  {} {}", icon, event.filename),
        }
    }

    if changes == 0 {
        println!("{}", "No changes".green());
    } else {
        println!();
        println!("Run {} to record these changes", "athina update".cyan());
    }

    Ok(())
}
