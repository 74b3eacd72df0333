use crate::delta;
use crate::error::Result;
use crate::models::HistoryEntry;
use crate::reconstruct::{reconstruct, reconstruct_through};
use crate::storage::Storage;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Reverted {
    /// Log position of the entry that was restored.
    pub target: usize,
    /// The `Revert` entry appended to the log.
    pub entry: HistoryEntry,
    pub content: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RevertEngine<'a> {
    workdir: &'a Path,
    storage: &'a Storage,
}

impl<'a> RevertEngine<'a> {
    pub fn new(workdir: &'a Path, storage: &'a Storage) -> Self {
        Self { workdir, storage }
    }

    /// Restores `filename` to its content as of `identity`.
    ///
    /// Entries after the target are not replayed. The restoration is
    /// recorded as a new `Revert` entry whose delta leads from the current
    /// state to the target state; the existing log is never truncated.
    /// `identity` may be a unique prefix of a full identity. When several
    /// entries share the identity, the earliest one is the target, except for
    /// delete markers, where the latest one is.
    ///
    /// Nothing is written when the identity is unknown. The working file is
    /// written before the record, so a failed write leaves the log untouched.
    pub fn revert_to_identity(&self, filename: &str, identity: &str) -> Result<Reverted> {
        let mut record = self.storage.load_record(filename)?;
        let target = record.resolve(identity)?;

        let content = reconstruct_through(&record, target)?;
        let current = reconstruct(&record)?;
        let entry = HistoryEntry::reverted(delta::diff(&current, &content));

        let path = self.workdir.join(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &content)?;

        record.push(entry.clone());
        self.storage.save_record(&record)?;

        info!(
            "File {} has been reverted to {}",
            filename, record.log[target].hash
        );
        Ok(Reverted {
            target,
            entry,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Error;
    use crate::models::Action;
    use crate::pipeline::UpdatePipeline;
    use crate::storage::STORE_DIR;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        storage: Storage,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let storage = Storage::init(dir.path().join(STORE_DIR)).unwrap();
            Self {
                dir,
                storage,
                config: Config::default(),
            }
        }

        /// Tracks `name` through each of `states`, returning the identities.
        fn history(&self, name: &str, states: &[&str]) -> Vec<String> {
            let pipeline = UpdatePipeline::new(self.dir.path(), &self.storage, &self.config);
            for state in states {
                fs::write(self.dir.path().join(name), state).unwrap();
                pipeline.update_file(name).unwrap();
            }
            self.storage
                .load_record(name)
                .unwrap()
                .log
                .into_iter()
                .map(|entry| entry.hash)
                .collect()
        }

        fn engine(&self) -> RevertEngine<'_> {
            RevertEngine::new(self.dir.path(), &self.storage)
        }

        fn read(&self, name: &str) -> String {
            fs::read_to_string(self.dir.path().join(name)).unwrap()
        }
    }

    #[test]
    fn test_revert_restores_earlier_state() {
        let fx = Fixture::new();
        let ids = fx.history("f.txt", &["A", "AB", "ABC"]);
        assert_eq!(ids.len(), 3);

        let reverted = fx.engine().revert_to_identity("f.txt", &ids[0]).unwrap();
        assert_eq!(reverted.target, 0);
        assert_eq!(reverted.content, "A");
        assert_eq!(fx.read("f.txt"), "A");

        let record = fx.storage.load_record("f.txt").unwrap();
        assert_eq!(record.log.len(), 4);
        assert_eq!(record.log[3].change, Action::Revert);
        assert_eq!(record.log[3].hash, reverted.entry.hash);
        assert_eq!(&record.log[..3].iter().map(|e| e.hash.clone()).collect::<Vec<_>>(), &ids);
        assert_eq!(reconstruct(&record).unwrap(), "A");
    }

    #[test]
    fn test_revert_to_middle_entry() {
        let fx = Fixture::new();
        let ids = fx.history("f.txt", &["A", "AB", "ABC"]);

        fx.engine().revert_to_identity("f.txt", &ids[1]).unwrap();

        assert_eq!(fx.read("f.txt"), "AB");
        let record = fx.storage.load_record("f.txt").unwrap();
        assert_eq!(reconstruct(&record).unwrap(), "AB");
    }

    #[test]
    fn test_revert_is_itself_revertible() {
        let fx = Fixture::new();
        let ids = fx.history("f.txt", &["one\n", "one\ntwo\n", "one\ntwo\nthree\n"]);

        fx.engine().revert_to_identity("f.txt", &ids[0]).unwrap();
        fx.engine().revert_to_identity("f.txt", &ids[2]).unwrap();

        assert_eq!(fx.read("f.txt"), "one\ntwo\nthree\n");
        let record = fx.storage.load_record("f.txt").unwrap();
        assert_eq!(record.log.len(), 5);
        assert_eq!(reconstruct(&record).unwrap(), "one\ntwo\nthree\n");
    }

    #[test]
    fn test_revert_accepts_identity_prefix() {
        let fx = Fixture::new();
        let ids = fx.history("f.txt", &["A", "AB"]);

        let reverted = fx.engine().revert_to_identity("f.txt", &ids[0][..10]).unwrap();
        assert_eq!(reverted.content, "A");
    }

    #[test]
    fn test_unknown_identity_changes_nothing() {
        let fx = Fixture::new();
        fx.history("f.txt", &["A", "AB", "ABC"]);
        let before = fx.storage.load_record("f.txt").unwrap();

        let err = fx
            .engine()
            .revert_to_identity("f.txt", "nonexistent")
            .unwrap_err();

        assert!(matches!(err, Error::EntryNotFound { .. }));
        assert!(err.is_not_found());
        assert_eq!(fx.storage.load_record("f.txt").unwrap(), before);
        assert_eq!(fx.read("f.txt"), "ABC");
    }

    #[test]
    fn test_revert_untracked_file() {
        let fx = Fixture::new();

        assert!(matches!(
            fx.engine().revert_to_identity("f.txt", "abcd"),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_revert_recreates_deleted_file() {
        let fx = Fixture::new();
        let ids = fx.history("f.txt", &["keep me"]);
        fs::remove_file(fx.dir.path().join("f.txt")).unwrap();
        UpdatePipeline::new(fx.dir.path(), &fx.storage, &fx.config)
            .update_file("f.txt")
            .unwrap();

        fx.engine().revert_to_identity("f.txt", &ids[0]).unwrap();

        assert_eq!(fx.read("f.txt"), "keep me");
        let record = fx.storage.load_record("f.txt").unwrap();
        assert_eq!(record.log.len(), 3);
        assert!(delta::is_noop(&record.log[2].delta));
    }
}
