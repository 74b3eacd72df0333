pub mod history;
pub mod ignore;
pub mod init;
pub mod list;
pub mod remove;
pub mod reset;
pub mod revert;
pub mod stash;
pub mod status;
pub mod update;

use anyhow::{Context, Result};
use athina_core::Repository;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub fn get_workdir(custom_path: Option<PathBuf>) -> Result<PathBuf> {
    match custom_path {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("Cannot determine the current directory"),
    }
}

pub fn open_repository(dir: Option<PathBuf>) -> Result<Repository> {
    let workdir = get_workdir(dir)?;
    debug!("Opening athina store in {:?}", workdir);
    Repository::open(&workdir).with_context(|| {
        format!(
            "No athina store in {}. Run 'athina init' first.",
            workdir.display()
        )
    })
}

/// Turns a command-line path into the store key for that file.
///
/// Relative paths are taken relative to the working directory; absolute
/// paths must point inside it.
pub fn file_key(workdir: &Path, path: &Path) -> Result<String> {
    let invalid = |reason: String| anyhow::Error::new(athina_core::Error::InvalidArgument(reason));

    let relative = if path.is_absolute() {
        let workdir = workdir
            .canonicalize()
            .with_context(|| format!("Cannot resolve {}", workdir.display()))?;
        path.strip_prefix(&workdir)
            .map_err(|_| invalid(format!("{} is outside {}", path.display(), workdir.display())))?
            .to_path_buf()
    } else {
        path.to_path_buf()
    };

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| invalid(format!("{} is not valid UTF-8", path.display())))?,
            ),
            _ => return Err(invalid(format!("{} leaves the working directory", path.display()))),
        }
    }

    if parts.is_empty() {
        return Err(invalid(format!("{} does not name a file", path.display())));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_key_normalizes_relative_paths() {
        let dir = TempDir::new().unwrap();

        assert_eq!(file_key(dir.path(), Path::new("a.txt")).unwrap(), "a.txt");
        assert_eq!(file_key(dir.path(), Path::new("./a.txt")).unwrap(), "a.txt");
        assert_eq!(file_key(dir.path(), Path::new("src/lib.rs")).unwrap(), "src/lib.rs");
    }

    #[test]
    fn test_file_key_accepts_absolute_paths_inside_workdir() {
        let dir = TempDir::new().unwrap();
        let absolute = dir.path().canonicalize().unwrap().join("a.txt");

        assert_eq!(file_key(dir.path(), &absolute).unwrap(), "a.txt");
    }

    #[test]
    fn test_file_key_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();

        assert!(file_key(dir.path(), Path::new("../a.txt")).is_err());
        assert!(file_key(dir.path(), Path::new(".")).is_err());
        assert!(file_key(dir.path(), Path::new("/definitely/elsewhere.txt")).is_err());
    }
}
