use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No history record for: {0}")]
    RecordNotFound(String),

    #[error("No history entry {identity} in {filename}")]
    EntryNotFound { filename: String, identity: String },

    #[error("Stash commit not found: {0}")]
    CommitNotFound(String),

    #[error("File is neither on disk nor tracked: {0}")]
    PathNotFound(String),

    #[error("Malformed delta: {0}")]
    MalformedDelta(String),

    #[error("Corrupt history for {filename}: {reason}")]
    CorruptHistory { filename: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store not initialized at: {0:?}")]
    StoreNotInitialized(PathBuf),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::RecordNotFound(_)
                | Error::EntryNotFound { .. }
                | Error::CommitNotFound(_)
                | Error::PathNotFound(_)
        )
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::MalformedDelta(_) | Error::CorruptHistory { .. })
    }
}
