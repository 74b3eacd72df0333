//! Named groupings of history entries.
//!
//! A stash is a derived view: it copies entries out of per-file logs and
//! hashes them into items and commits, but nothing in the update or revert
//! path reads it.

use crate::models::{digest, FileHistoryRecord, HistoryEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitItem {
    pub hash: String,
    pub filename: String,
    pub filediffs: Vec<HistoryEntry>,
}

impl CommitItem {
    pub fn new(filename: impl Into<String>, filediffs: Vec<HistoryEntry>) -> Self {
        let mut item = Self {
            hash: String::new(),
            filename: filename.into(),
            filediffs,
        };
        item.hash = item.compute_hash();
        item
    }

    /// Snapshot of a record's whole log.
    pub fn from_record(record: &FileHistoryRecord) -> Self {
        Self::new(record.filename.clone(), record.log.clone())
    }

    pub fn compute_hash(&self) -> String {
        let mut input = self.filename.clone();
        for entry in &self.filediffs {
            input.push_str(&entry.compute_hash());
        }
        digest(&input)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub items: Vec<CommitItem>,
}

impl Commit {
    pub fn new(items: Vec<CommitItem>) -> Self {
        let mut commit = Self {
            hash: String::new(),
            items,
        };
        commit.hash = commit.compute_hash();
        commit
    }

    pub fn compute_hash(&self) -> String {
        let input: String = self.items.iter().map(CommitItem::compute_hash).collect();
        digest(&input)
    }

    pub fn add_item(&mut self, item: CommitItem) {
        self.items.push(item);
        self.hash = self.compute_hash();
    }

    /// Removes every item with the given hash; returns whether any was removed.
    pub fn remove_item(&mut self, hash: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.hash != hash);
        self.hash = self.compute_hash();
        self.items.len() != before
    }

    pub fn item_by_filename(&self, filename: &str) -> Option<&CommitItem> {
        self.items.iter().find(|item| item.filename == filename)
    }

    pub fn item_by_hash(&self, hash: &str) -> Option<&CommitItem> {
        self.items.iter().find(|item| item.hash == hash)
    }
}

/// Contents of `stash.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stash {
    #[serde(default)]
    pub stashes: Vec<Commit>,
}

impl Stash {
    pub fn push(&mut self, commit: Commit) {
        self.stashes.push(commit);
    }

    /// Looks a commit up by full hash or by unique prefix.
    pub fn commit_by_hash(&self, hash: &str) -> Option<&Commit> {
        if let Some(commit) = self.stashes.iter().find(|commit| commit.hash == hash) {
            return Some(commit);
        }
        let mut matches = self
            .stashes
            .iter()
            .filter(|commit| !hash.is_empty() && commit.hash.starts_with(hash));
        match (matches.next(), matches.next()) {
            (Some(commit), None) => Some(commit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta;

    fn record(name: &str, states: &[&str]) -> FileHistoryRecord {
        let mut record = FileHistoryRecord::new(name, states[0]);
        for pair in states.windows(2) {
            record.push(HistoryEntry::modified(delta::diff(pair[0], pair[1])));
        }
        record
    }

    #[test]
    fn test_item_hash_depends_on_filename_and_entries() {
        let a = CommitItem::from_record(&record("a.txt", &["A", "AB"]));
        let b = CommitItem::from_record(&record("b.txt", &["A", "AB"]));
        let c = CommitItem::from_record(&record("a.txt", &["A", "AC"]));

        assert_eq!(a.hash, a.compute_hash());
        assert_ne!(a.hash, b.hash);
        assert_ne!(a.hash, c.hash);
    }

    #[test]
    fn test_commit_hash_tracks_items() {
        let a = CommitItem::from_record(&record("a.txt", &["A", "AB"]));
        let b = CommitItem::from_record(&record("b.txt", &["x"]));

        let mut commit = Commit::new(vec![a.clone()]);
        let single = commit.hash.clone();

        commit.add_item(b.clone());
        assert_ne!(commit.hash, single);
        assert_eq!(commit.item_by_filename("b.txt"), Some(&b));
        assert_eq!(commit.item_by_hash(&a.hash), Some(&a));

        assert!(commit.remove_item(&b.hash));
        assert!(!commit.remove_item(&b.hash));
        assert_eq!(commit.hash, single);
        assert!(commit.item_by_filename("b.txt").is_none());
    }

    #[test]
    fn test_stash_lookup() {
        let commit = Commit::new(vec![CommitItem::from_record(&record("a.txt", &["A"]))]);
        let mut stash = Stash::default();
        stash.push(commit.clone());

        assert_eq!(stash.commit_by_hash(&commit.hash), Some(&commit));
        assert_eq!(stash.commit_by_hash(&commit.hash[..6]), Some(&commit));
        assert!(stash.commit_by_hash("").is_none());
        assert!(stash.commit_by_hash("not-a-hash").is_none());
    }

    #[test]
    fn test_stash_json_shape() {
        let stash: Stash = serde_json::from_str(r#"{"stashes":[]}"#).unwrap();
        assert!(stash.stashes.is_empty());

        let mut stash = Stash::default();
        stash.push(Commit::new(Vec::new()));
        let json: serde_json::Value = serde_json::to_value(&stash).unwrap();
        assert!(json["stashes"][0]["hash"].is_string());
        assert!(json["stashes"][0]["items"].is_array());
    }
}
