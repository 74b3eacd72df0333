//! # athina-core
//!
//! Core library for athina - local, per-file version history.
//!
//! Every tracked file keeps an origin snapshot and an append-only log of
//! reversible deltas. Replaying the log against the origin yields the file's
//! current logical content; reverting replays a prefix of the log and records
//! the restoration as one more entry.

pub mod config;
pub mod delta;
pub mod detector;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod reconstruct;
pub mod repository;
pub mod revert;
pub mod stash;
pub mod storage;

pub use config::Config;
pub use delta::{Delta, DiffOp, OpKind};
pub use detector::{ChangeDetector, Scan};
pub use error::{Error, Result};
pub use models::{Action, ChangeEvent, FileHistoryRecord, HistoryEntry};
pub use pipeline::{AppliedChange, UpdateOutcome, UpdatePipeline};
pub use reconstruct::{reconstruct, reconstruct_through};
pub use repository::{Repository, DEFAULT_HISTORY_DEPTH};
pub use revert::{RevertEngine, Reverted};
pub use stash::{Commit, CommitItem, Stash};
pub use storage::{Storage, STORE_DIR};
