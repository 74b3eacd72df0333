//! Classifies paths as added, deleted, modified or unchanged.

use crate::config::Config;
use crate::delta::{self, Delta};
use crate::error::{Error, Result};
use crate::models::{Action, ChangeEvent, FileHistoryRecord};
use crate::reconstruct::reconstruct;
use crate::storage::{validate_filename, Storage, STORE_DIR};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector<'a> {
    workdir: &'a Path,
    storage: &'a Storage,
    config: &'a Config,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(workdir: &'a Path, storage: &'a Storage, config: &'a Config) -> Self {
        Self {
            workdir,
            storage,
            config,
        }
    }

    /// Classifies one path from store presence, disk presence and content.
    ///
    /// | tracked | on disk | result                         |
    /// |---------|---------|--------------------------------|
    /// | no      | no      | `Error`                        |
    /// | no      | yes     | `Add`                          |
    /// | yes     | no      | `Delete`                       |
    /// | yes     | yes     | `None`, or `Modify` with delta |
    pub fn detect(&self, filename: &str) -> ChangeEvent {
        if let Err(e) = validate_filename(filename) {
            return ChangeEvent::failed(filename, e);
        }

        let tracked = self.storage.has_record(filename);
        let on_disk = self.workdir.join(filename).is_file();

        match (tracked, on_disk) {
            (false, false) => {
                ChangeEvent::failed(filename, Error::PathNotFound(filename.to_string()))
            }
            (false, true) => ChangeEvent::new(Action::Add, filename),
            (true, false) => self.deletion(filename),
            (true, true) => self.compare(filename),
        }
    }

    // An unreadable record still yields a Delete; applying it reports the failure.
    fn deletion(&self, filename: &str) -> ChangeEvent {
        let event = ChangeEvent::new(Action::Delete, filename);
        match self.storage.load_record(filename) {
            Ok(record) => event.with_record(record),
            Err(_) => event,
        }
    }

    fn compare(&self, filename: &str) -> ChangeEvent {
        match self.pending_delta(filename) {
            Ok((record, delta)) if delta.is_noop() => {
                ChangeEvent::new(Action::None, filename).with_record(record)
            }
            Ok((record, delta)) => {
                debug!("Changes detected in {}: {}", filename, delta);
                ChangeEvent::new(Action::Modify, filename)
                    .with_record(record)
                    .with_pending(delta)
            }
            Err(e) => ChangeEvent::failed(filename, e),
        }
    }

    /// Loads the record and diffs its reconstructed state against the disk.
    pub fn pending_delta(&self, filename: &str) -> Result<(FileHistoryRecord, Delta)> {
        let record = self.storage.load_record(filename)?;
        let current = reconstruct(&record)?;
        let on_disk = fs::read_to_string(self.workdir.join(filename))?;
        let delta = delta::diff(&current, &on_disk);
        Ok((record, delta))
    }

    /// Starts a full scan.
    ///
    /// Failing to enumerate the store or the working directory is fatal;
    /// anything that goes wrong for a single path becomes an `Error` event.
    pub fn scan(&self) -> Result<Scan<'a>> {
        let tracked = self.storage.list_records()?;
        let entries = fs::read_dir(self.workdir)?;
        debug!(
            "Scanning {:?}: {} tracked files",
            self.workdir,
            tracked.len()
        );

        Ok(Scan {
            detector: *self,
            tracked: tracked.into_iter(),
            entries,
        })
    }
}

/// Lazy, single-pass sequence of change events.
///
/// Every tracked path is classified first; then the top level of the working
/// directory is walked and untracked, non-ignored files are reported as `Add`.
pub struct Scan<'a> {
    detector: ChangeDetector<'a>,
    tracked: std::vec::IntoIter<String>,
    entries: fs::ReadDir,
}

impl Scan<'_> {
    fn next_untracked(&mut self) -> Option<ChangeEvent> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let dir = self.detector.workdir.display().to_string();
                    return Some(ChangeEvent::failed(dir, e.into()));
                }
            };

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    let name = raw.to_string_lossy().to_string();
                    let reason = format!("{} is not valid UTF-8", name);
                    return Some(ChangeEvent::failed(name, Error::InvalidArgument(reason)));
                }
            };

            if name == STORE_DIR || self.detector.config.is_ignored(&name) {
                continue;
            }

            match entry.path().metadata() {
                Ok(metadata) if metadata.is_dir() => continue,
                Ok(_) => {}
                Err(e) => return Some(ChangeEvent::failed(name, e.into())),
            }

            if self.detector.storage.has_record(&name) {
                continue;
            }

            return Some(ChangeEvent::new(Action::Add, name));
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = ChangeEvent;

    fn next(&mut self) -> Option<ChangeEvent> {
        let event = match self.tracked.next() {
            Some(filename) => self.detector.detect(&filename),
            None => self.next_untracked()?,
        };

        if let Some(error) = &event.error {
            warn!("Scan error for {}: {}", event.filename, error);
        }
        Some(event)
    }
}
