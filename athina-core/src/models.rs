use crate::delta::{render_ops, Delta, DiffOp};
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// Older records store an absent op list as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<DiffOp>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<DiffOp>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Why a history entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "File add")]
    Add,
    #[serde(rename = "File delete")]
    Delete,
    #[serde(rename = "File modify")]
    Modify,
    #[serde(rename = "File revert")]
    Revert,
    #[serde(rename = "none")]
    None,
    #[serde(rename = "error")]
    Error,
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Add => "File add",
            Action::Delete => "File delete",
            Action::Modify => "File modify",
            Action::Revert => "File revert",
            Action::None => "none",
            Action::Error => "error",
        }
    }
}

/// One immutable, hashed change in a file's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub hash: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub diffs: Vec<DiffOp>,
    #[serde(default)]
    pub delta: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub added: bool,
    pub change: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    fn new(diffs: Vec<DiffOp>, delta: String, deleted: bool, added: bool, change: Action) -> Self {
        let hash = identity(&diffs, &delta, deleted, added, change);
        Self {
            hash,
            diffs,
            delta,
            deleted,
            added,
            change,
            created: Some(Utc::now()),
        }
    }

    /// The first entry of every log.
    pub fn added() -> Self {
        Self::new(Vec::new(), String::new(), false, true, Action::Add)
    }

    pub fn deleted() -> Self {
        Self::new(Vec::new(), String::new(), true, false, Action::Delete)
    }

    pub fn modified(delta: Delta) -> Self {
        Self::new(delta.ops, delta.encoded, false, false, Action::Modify)
    }

    pub fn reverted(delta: Delta) -> Self {
        Self::new(delta.ops, delta.encoded, false, false, Action::Revert)
    }

    /// Recomputes the identity from the entry's content.
    pub fn compute_hash(&self) -> String {
        identity(&self.diffs, &self.delta, self.deleted, self.added, self.change)
    }

    /// Degenerate markers carrying both flags replay as nothing.
    pub fn is_marker(&self) -> bool {
        self.deleted && self.added
    }
}

/// Content fingerprint of a history entry.
///
/// Entries with the same ops, delta, flags and action share an identity.
pub fn identity(diffs: &[DiffOp], delta: &str, deleted: bool, added: bool, change: Action) -> String {
    let canonical = format!(
        "{}{}{}{}{}",
        render_ops(diffs),
        delta,
        deleted,
        added,
        change.as_str()
    );
    digest(&canonical)
}

pub(crate) fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// The full history of one tracked file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileHistoryRecord {
    pub filename: String,
    pub origin: String,
    #[serde(rename = "Diffs", default)]
    pub log: Vec<HistoryEntry>,
}

impl FileHistoryRecord {
    pub fn new(filename: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            origin: origin.into(),
            log: vec![HistoryEntry::added()],
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.log.push(entry);
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.log.last()
    }

    pub fn is_marked_deleted(&self) -> bool {
        self.last().is_some_and(|entry| entry.deleted && !entry.added)
    }

    /// Position of the first entry whose identity is exactly `identity`.
    pub fn position_of(&self, identity: &str) -> Option<usize> {
        self.log.iter().position(|entry| entry.hash == identity)
    }

    /// Resolves a full identity or a unique prefix of one to a log position.
    ///
    /// Content entries resolve to their first occurrence. Delete markers all
    /// share one identity, so they resolve to the most recent one.
    pub fn resolve(&self, identity: &str) -> Result<usize, Error> {
        let position = match self.position_of(identity) {
            Some(position) => position,
            None => self.resolve_prefix(identity)?,
        };

        let entry = &self.log[position];
        if entry.change == Action::Delete {
            let hash = &entry.hash;
            if let Some(latest) = self.log.iter().rposition(|e| &e.hash == hash) {
                return Ok(latest);
            }
        }
        Ok(position)
    }

    fn resolve_prefix(&self, identity: &str) -> Result<usize, Error> {
        let not_found = || Error::EntryNotFound {
            filename: self.filename.clone(),
            identity: identity.to_string(),
        };

        if identity.len() < MIN_PREFIX_LEN {
            return Err(not_found());
        }

        let mut candidates = self
            .log
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.hash.starts_with(identity));

        let (position, first) = candidates.next().ok_or_else(not_found)?;
        if candidates.any(|(_, entry)| entry.hash != first.hash) {
            return Err(Error::InvalidArgument(format!(
                "identity prefix {} is ambiguous in {}",
                identity, self.filename
            )));
        }

        Ok(position)
    }
}

pub const MIN_PREFIX_LEN: usize = 4;

/// Classification of one path, produced by the change detector.
#[derive(Debug)]
pub struct ChangeEvent {
    pub action: Action,
    pub filename: String,
    pub record: Option<FileHistoryRecord>,
    pub pending: Option<Delta>,
    pub error: Option<Error>,
}

impl ChangeEvent {
    pub fn new(action: Action, filename: impl Into<String>) -> Self {
        Self {
            action,
            filename: filename.into(),
            record: None,
            pending: None,
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: Error) -> Self {
        Self::new(Action::Error, filename).with_error(error)
    }

    pub fn with_record(mut self, record: FileHistoryRecord) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_pending(mut self, delta: Delta) -> Self {
        self.pending = Some(delta);
        self
    }

    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// A delete whose marker is already the last entry of the log.
    pub fn is_already_recorded(&self) -> bool {
        self.action == Action::Delete
            && self
                .record
                .as_ref()
                .is_some_and(FileHistoryRecord::is_marked_deleted)
    }
}
