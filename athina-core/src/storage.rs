use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::FileHistoryRecord;
use crate::stash::Stash;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

pub const STORE_DIR: &str = ".athina";

const OBJECTS_DIR: &str = "objects";
const CONFIG_FILE: &str = "config.json";
const STASH_FILE: &str = "stash.json";

/// Directory-based store: one JSON record per tracked path under `objects/`.
///
/// There is no locking; two processes writing the same record race and the
/// last writer wins.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates the store layout if missing. Existing files are left alone.
    pub fn init<P: AsRef<Path>>(root: P) -> Result<Self> {
        let storage = Self {
            root: root.as_ref().to_path_buf(),
        };
        storage.initialize()?;
        Ok(storage)
    }

    /// Opens an existing store.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let storage = Self {
            root: root.as_ref().to_path_buf(),
        };
        if !storage.objects_dir().is_dir() {
            return Err(Error::StoreNotInitialized(storage.root));
        }
        Ok(storage)
    }

    fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.objects_dir())?;

        let config_path = self.root.join(CONFIG_FILE);
        if !config_path.exists() {
            write_json(&config_path, &Config::default())?;
        }

        let stash_path = self.root.join(STASH_FILE);
        if !stash_path.exists() {
            write_json(&stash_path, &Stash::default())?;
        }

        debug!("Store initialized at {:?}", self.root);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.root.join(OBJECTS_DIR)
    }

    // Record operations
    pub fn has_record(&self, filename: &str) -> bool {
        self.record_path(filename)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    pub fn load_record(&self, filename: &str) -> Result<FileHistoryRecord> {
        let path = self.record_path(filename)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::RecordNotFound(filename.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_record(&self, record: &FileHistoryRecord) -> Result<()> {
        let path = self.record_path(&record.filename)?;
        write_json(&path, record)?;
        debug!(
            "Saved record for {} ({} entries)",
            record.filename,
            record.log.len()
        );
        Ok(())
    }

    pub fn remove_record(&self, filename: &str) -> Result<()> {
        let path = self.record_path(filename)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed record for {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::RecordNotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every tracked path, sorted.
    pub fn list_records(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        collect_records(&self.objects_dir(), "", &mut names)?;
        names.sort();
        Ok(names)
    }

    // Config operations
    pub fn load_config(&self) -> Result<Config> {
        read_json_or_default(&self.root.join(CONFIG_FILE))
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        write_json(&self.root.join(CONFIG_FILE), config)
    }

    // Stash operations
    pub fn load_stash(&self) -> Result<Stash> {
        read_json_or_default(&self.root.join(STASH_FILE))
    }

    pub fn save_stash(&self, stash: &Stash) -> Result<()> {
        write_json(&self.root.join(STASH_FILE), stash)
    }

    /// Deletes the whole store directory.
    pub fn destroy(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!("Removed store at {:?}", self.root);
        Ok(())
    }

    // Helper methods
    fn record_path(&self, filename: &str) -> Result<PathBuf> {
        validate_filename(filename)?;
        Ok(self.objects_dir().join(filename))
    }
}

/// Record keys are relative paths that stay inside the working directory.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(Error::InvalidArgument("empty filename".to_string()));
    }
    let escapes = Path::new(filename)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::InvalidArgument(format!(
            "{} is not a relative path inside the working directory",
            filename
        )));
    }
    Ok(())
}

/// Prefix of in-flight temporary files; leftovers from an interrupted write are not records.
const TEMP_PREFIX: &str = ".athina-tmp";

fn collect_records(dir: &Path, prefix: &str, names: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(TEMP_PREFIX) {
            continue;
        }
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };

        if entry.file_type()?.is_dir() {
            collect_records(&entry.path(), &key, names)?;
        } else {
            names.push(key);
        }
    }
    Ok(())
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Writes through a temporary sibling and renames it over `path`.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::InvalidArgument(format!("{:?} has no parent directory", path)))?;
    fs::create_dir_all(dir)?;

    let mut file = tempfile::Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir)?;
    serde_json::to_writer(&mut file, value)?;
    file.write_all(b"\n")?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryEntry;
    use crate::stash::{Commit, CommitItem};
    use tempfile::TempDir;

    fn store() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::init(dir.path().join(STORE_DIR)).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_storage_initialization() {
        let (dir, storage) = store();
        let root = dir.path().join(STORE_DIR);

        assert!(root.join("objects").is_dir());
        assert_eq!(
            fs::read_to_string(root.join("config.json")).unwrap().trim(),
            r#"{"ignored":[]}"#
        );
        assert_eq!(
            fs::read_to_string(root.join("stash.json")).unwrap().trim(),
            r#"{"stashes":[]}"#
        );
        assert!(storage.list_records().unwrap().is_empty());
    }

    #[test]
    fn test_open_requires_init() {
        let dir = TempDir::new().unwrap();
        let err = Storage::open(dir.path().join(STORE_DIR)).unwrap_err();

        assert!(matches!(err, Error::StoreNotInitialized(_)));
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let (dir, storage) = store();
        let mut config = Config::default();
        config.ignore("notes.txt");
        storage.save_config(&config).unwrap();

        let reopened = Storage::init(dir.path().join(STORE_DIR)).unwrap();
        assert!(reopened.load_config().unwrap().is_ignored("notes.txt"));
    }

    #[test]
    fn test_record_crud() {
        let (_dir, storage) = store();
        let record = FileHistoryRecord::new("a.txt", "hello");

        assert!(!storage.has_record("a.txt"));
        storage.save_record(&record).unwrap();
        assert!(storage.has_record("a.txt"));

        let loaded = storage.load_record("a.txt").unwrap();
        assert_eq!(loaded, record);

        storage.remove_record("a.txt").unwrap();
        assert!(!storage.has_record("a.txt"));
        assert!(matches!(
            storage.load_record("a.txt"),
            Err(Error::RecordNotFound(_))
        ));
        assert!(matches!(
            storage.remove_record("a.txt"),
            Err(Error::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_nested_records_are_listed() {
        let (_dir, storage) = store();
        storage
            .save_record(&FileHistoryRecord::new("src/main.rs", "fn main() {}"))
            .unwrap();
        storage
            .save_record(&FileHistoryRecord::new("b.txt", "b"))
            .unwrap();
        storage
            .save_record(&FileHistoryRecord::new("a.txt", "a"))
            .unwrap();

        assert_eq!(
            storage.list_records().unwrap(),
            vec!["a.txt", "b.txt", "src/main.rs"]
        );
        assert!(storage.has_record("src/main.rs"));
    }

    #[test]
    fn test_leftover_temp_files_are_not_records() {
        let (_dir, storage) = store();
        storage
            .save_record(&FileHistoryRecord::new("a.txt", "A"))
            .unwrap();
        fs::write(storage.objects_dir().join(".athina-tmpX1y2Z3"), "{\"Filen").unwrap();

        assert_eq!(storage.list_records().unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_rejects_escaping_filenames() {
        let (_dir, storage) = store();

        for name in ["", "../outside.txt", "/etc/passwd", "a/../../b"] {
            assert!(
                matches!(storage.load_record(name), Err(Error::InvalidArgument(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(!storage.has_record("../outside.txt"));
    }

    #[test]
    fn test_corrupt_record_is_serialization_error() {
        let (_dir, storage) = store();
        fs::write(storage.objects_dir().join("a.txt"), "{not json").unwrap();

        assert!(matches!(
            storage.load_record("a.txt"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_stash_persistence() {
        let (_dir, storage) = store();
        let mut record = FileHistoryRecord::new("a.txt", "A");
        record.push(HistoryEntry::deleted());

        let mut stash = storage.load_stash().unwrap();
        stash.push(Commit::new(vec![CommitItem::from_record(&record)]));
        storage.save_stash(&stash).unwrap();

        assert_eq!(storage.load_stash().unwrap(), stash);
    }

    #[test]
    fn test_destroy() {
        let (dir, storage) = store();
        storage.destroy().unwrap();

        assert!(!dir.path().join(STORE_DIR).exists());
        storage.destroy().unwrap();
    }
}
