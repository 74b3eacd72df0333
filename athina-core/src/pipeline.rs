//! Applies classified changes to the store.

use crate::config::Config;
use crate::delta;
use crate::detector::ChangeDetector;
use crate::error::{Error, Result};
use crate::models::{Action, ChangeEvent, FileHistoryRecord, HistoryEntry};
use crate::reconstruct::reconstruct;
use crate::storage::{validate_filename, Storage};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// What an update did to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Added,
    Deleted { identity: String },
    Modified { identity: String },
    Unchanged,
    /// The file was missing and its log already ends with a delete marker.
    AlreadyDeleted,
    /// Applying the change failed; the file's record is left as it was.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    pub filename: String,
    pub outcome: UpdateOutcome,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdatePipeline<'a> {
    workdir: &'a Path,
    storage: &'a Storage,
    config: &'a Config,
}

impl<'a> UpdatePipeline<'a> {
    pub fn new(workdir: &'a Path, storage: &'a Storage, config: &'a Config) -> Self {
        Self {
            workdir,
            storage,
            config,
        }
    }

    fn detector(&self) -> ChangeDetector<'a> {
        ChangeDetector::new(self.workdir, self.storage, self.config)
    }

    /// Starts tracking `filename` with its current content as the origin.
    ///
    /// An existing record for the same path is replaced.
    pub fn add_file(&self, filename: &str) -> Result<FileHistoryRecord> {
        validate_filename(filename)?;
        let content = fs::read_to_string(self.workdir.join(filename))?;

        let record = FileHistoryRecord::new(filename, content);
        self.storage.save_record(&record)?;

        info!("Adding file: {}", filename);
        Ok(record)
    }

    /// Appends a delete marker to the record.
    pub fn delete_file(&self, filename: &str) -> Result<HistoryEntry> {
        let record = self.storage.load_record(filename)?;
        self.append(record, HistoryEntry::deleted())
    }

    /// Appends the delta between the reconstructed state and the disk.
    ///
    /// Returns `None` when the file is unchanged.
    pub fn modify_file(&self, filename: &str) -> Result<Option<HistoryEntry>> {
        let record = self.storage.load_record(filename)?;
        let current = reconstruct(&record)?;
        let on_disk = fs::read_to_string(self.workdir.join(filename))?;

        let delta = delta::diff(&current, &on_disk);
        if delta.is_noop() {
            info!("No changes detected in file: {}", filename);
            return Ok(None);
        }

        self.append(record, HistoryEntry::modified(delta)).map(Some)
    }

    /// Updates one file, classifying it the same way a full scan would.
    pub fn update_file(&self, filename: &str) -> Result<UpdateOutcome> {
        self.apply(self.detector().detect(filename))
    }

    /// Applies the store mutation implied by a change event.
    pub fn apply(&self, event: ChangeEvent) -> Result<UpdateOutcome> {
        let ChangeEvent {
            action,
            filename,
            record,
            pending,
            error,
        } = event;

        match action {
            Action::Add => {
                self.add_file(&filename)?;
                Ok(UpdateOutcome::Added)
            }
            Action::Delete => {
                let record = match record {
                    Some(record) => record,
                    None => self.storage.load_record(&filename)?,
                };
                if record.is_marked_deleted() {
                    debug!("{} is already marked deleted", filename);
                    return Ok(UpdateOutcome::AlreadyDeleted);
                }
                let entry = self.append(record, HistoryEntry::deleted())?;
                Ok(UpdateOutcome::Deleted {
                    identity: entry.hash,
                })
            }
            Action::Modify => {
                let entry = match (record, pending) {
                    (Some(record), Some(delta)) if !delta.is_noop() => {
                        self.append(record, HistoryEntry::modified(delta))?
                    }
                    _ => match self.modify_file(&filename)? {
                        Some(entry) => entry,
                        None => return Ok(UpdateOutcome::Unchanged),
                    },
                };
                Ok(UpdateOutcome::Modified {
                    identity: entry.hash,
                })
            }
            Action::None => {
                debug!("No changes detected in file: {}", filename);
                Ok(UpdateOutcome::Unchanged)
            }
            Action::Error => Err(error.unwrap_or(Error::PathNotFound(filename))),
            Action::Revert => Err(Error::InvalidArgument(format!(
                "revert of {} cannot be applied as an update",
                filename
            ))),
        }
    }

    /// Drains a full scan, applying each event in order.
    ///
    /// The first `Error` event aborts the batch; changes applied before it
    /// stay persisted. A file whose change cannot be applied is reported as
    /// `Failed` and the drain continues.
    pub fn update_all(&self) -> Result<Vec<AppliedChange>> {
        self.update_all_with(|_| {})
    }

    /// Like [`update_all`](Self::update_all), reporting each applied change.
    pub fn update_all_with<F>(&self, mut on_applied: F) -> Result<Vec<AppliedChange>>
    where
        F: FnMut(&AppliedChange),
    {
        let mut applied = Vec::new();

        for event in self.detector().scan()? {
            let filename = event.filename.clone();
            let outcome = match event.action {
                Action::Error => self.apply(event)?,
                _ => self.apply(event).unwrap_or_else(|e| {
                    warn!("Failed to update {}: {}", filename, e);
                    UpdateOutcome::Failed {
                        reason: e.to_string(),
                    }
                }),
            };

            let change = AppliedChange { filename, outcome };
            on_applied(&change);
            applied.push(change);
        }

        Ok(applied)
    }

    fn append(&self, mut record: FileHistoryRecord, entry: HistoryEntry) -> Result<HistoryEntry> {
        info!("{}: {} ({})", entry.change.as_str(), record.filename, entry.hash);
        record.push(entry.clone());
        self.storage.save_record(&record)?;
        Ok(entry)
    }
}
