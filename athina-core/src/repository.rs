use crate::config::Config;
use crate::detector::{ChangeDetector, Scan};
use crate::error::{Error, Result};
use crate::models::{FileHistoryRecord, HistoryEntry};
use crate::pipeline::UpdatePipeline;
use crate::revert::RevertEngine;
use crate::stash::{Commit, CommitItem, Stash};
use crate::storage::{Storage, STORE_DIR};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_HISTORY_DEPTH: usize = 5;

/// A working directory together with its store and loaded configuration.
#[derive(Debug)]
pub struct Repository {
    workdir: PathBuf,
    storage: Storage,
    config: Config,
}

impl Repository {
    /// Bootstraps the store under `workdir` if needed and opens it.
    pub fn init<P: AsRef<Path>>(workdir: P) -> Result<Self> {
        let workdir = workdir.as_ref().to_path_buf();
        let storage = Storage::init(workdir.join(STORE_DIR))?;
        let config = storage.load_config()?;
        info!("Initialized athina in {:?}", workdir);
        Ok(Self {
            workdir,
            storage,
            config,
        })
    }

    pub fn open<P: AsRef<Path>>(workdir: P) -> Result<Self> {
        let workdir = workdir.as_ref().to_path_buf();
        let storage = Storage::open(workdir.join(STORE_DIR))?;
        let config = storage.load_config()?;
        Ok(Self {
            workdir,
            storage,
            config,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn detector(&self) -> ChangeDetector<'_> {
        ChangeDetector::new(&self.workdir, &self.storage, &self.config)
    }

    pub fn pipeline(&self) -> UpdatePipeline<'_> {
        UpdatePipeline::new(&self.workdir, &self.storage, &self.config)
    }

    pub fn revert_engine(&self) -> RevertEngine<'_> {
        RevertEngine::new(&self.workdir, &self.storage)
    }

    pub fn scan(&self) -> Result<Scan<'_>> {
        self.detector().scan()
    }

    // Config operations
    pub fn ignore(&mut self, path: &str) -> Result<bool> {
        let added = self.config.ignore(path);
        if added {
            self.storage.save_config(&self.config)?;
        }
        Ok(added)
    }

    pub fn unignore(&mut self, path: &str) -> Result<bool> {
        let removed = self.config.unignore(path);
        if removed {
            self.storage.save_config(&self.config)?;
        }
        Ok(removed)
    }

    // File operations
    pub fn tracked_files(&self) -> Result<Vec<String>> {
        self.storage.list_records()
    }

    /// Drops the history of `filename` without touching the working file.
    pub fn untrack(&self, filename: &str) -> Result<()> {
        self.storage.remove_record(filename)
    }

    /// Replaces the record of `filename` with a fresh one whose origin is
    /// the current disk content.
    pub fn reset_file(&self, filename: &str) -> Result<FileHistoryRecord> {
        if !self.storage.has_record(filename) {
            return Err(Error::RecordNotFound(filename.to_string()));
        }
        self.pipeline().add_file(filename)
    }

    /// Wipes the store and bootstraps an empty one.
    pub fn reset_all(self) -> Result<Self> {
        self.storage.destroy()?;
        Self::init(self.workdir)
    }

    /// Up to `depth` entries of the log, newest first.
    pub fn history(&self, filename: &str, depth: usize) -> Result<Vec<HistoryEntry>> {
        let record = self.storage.load_record(filename)?;
        Ok(record.log.into_iter().rev().take(depth).collect())
    }

    // Stash operations
    pub fn stash(&self) -> Result<Stash> {
        self.storage.load_stash()
    }

    /// Looks up a stash commit by full hash or unique prefix.
    pub fn stash_commit(&self, hash: &str) -> Result<Commit> {
        self.storage
            .load_stash()?
            .commit_by_hash(hash)
            .cloned()
            .ok_or_else(|| Error::CommitNotFound(hash.to_string()))
    }

    /// Groups the current logs of `filenames` (every tracked file when empty)
    /// into a new stash commit.
    pub fn create_stash(&self, filenames: &[String]) -> Result<Commit> {
        let filenames = if filenames.is_empty() {
            self.tracked_files()?
        } else {
            filenames.to_vec()
        };

        let items = filenames
            .iter()
            .map(|name| {
                self.storage
                    .load_record(name)
                    .map(|record| CommitItem::from_record(&record))
            })
            .collect::<Result<Vec<_>>>()?;

        let commit = Commit::new(items);
        let mut stash = self.storage.load_stash()?;
        stash.push(commit.clone());
        self.storage.save_stash(&stash)?;

        info!("Stashed {} file(s) as {}", commit.items.len(), commit.hash);
        Ok(commit)
    }
}
