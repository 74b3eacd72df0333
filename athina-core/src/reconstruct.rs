//! Replays a record's log against its origin.

use crate::delta;
use crate::error::{Error, Result};
use crate::models::{FileHistoryRecord, HistoryEntry};
use tracing::debug;

/// Current logical content of a tracked file.
///
/// An empty log yields the origin unchanged. A delta that does not apply is
/// reported as [`Error::CorruptHistory`].
pub fn reconstruct(record: &FileHistoryRecord) -> Result<String> {
    replay(record, &record.log)
}

/// Content of a tracked file as of the entry at `position`, inclusive.
pub fn reconstruct_through(record: &FileHistoryRecord, position: usize) -> Result<String> {
    let end = position.saturating_add(1).min(record.log.len());
    replay(record, &record.log[..end])
}

fn replay(record: &FileHistoryRecord, entries: &[HistoryEntry]) -> Result<String> {
    let mut state = record.origin.clone();

    for (index, entry) in entries.iter().enumerate() {
        if entry.is_marker() || delta::is_noop(&entry.delta) {
            continue;
        }

        debug!(file = %record.filename, index, hash = %entry.hash, "replaying entry");
        state = delta::apply(&state, &entry.delta).map_err(|e| Error::CorruptHistory {
            filename: record.filename.clone(),
            reason: format!("entry {} ({}) does not apply: {}", index, entry.hash, e),
        })?;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryEntry;

    fn chain(states: &[&str]) -> FileHistoryRecord {
        let mut record = FileHistoryRecord::new("f.txt", states[0]);
        for pair in states.windows(2) {
            record.push(HistoryEntry::modified(delta::diff(pair[0], pair[1])));
        }
        record
    }

    #[test]
    fn test_empty_log_returns_origin() {
        let mut record = FileHistoryRecord::new("f.txt", "origin\n");
        record.log.clear();

        assert_eq!(reconstruct(&record).unwrap(), "origin\n");
    }

    #[test]
    fn test_replays_every_entry() {
        let record = chain(&["fn main() {}\n", "fn main() {\n}\n", "fn main() {\n    run();\n}\n"]);

        similar_asserts::assert_eq!(reconstruct(&record).unwrap(), "fn main() {\n    run();\n}\n");
    }

    #[test]
    fn test_reconstruct_through_stops_at_position() {
        let record = chain(&["A", "AB", "ABC"]);

        assert_eq!(reconstruct_through(&record, 0).unwrap(), "A");
        assert_eq!(reconstruct_through(&record, 1).unwrap(), "AB");
        assert_eq!(reconstruct_through(&record, 2).unwrap(), "ABC");
        assert_eq!(reconstruct_through(&record, 99).unwrap(), "ABC");
    }

    #[test]
    fn test_skips_markers_and_delete_entries() {
        let mut record = chain(&["A", "AB"]);
        record.push(HistoryEntry::deleted());

        let mut marker = HistoryEntry::modified(delta::diff("nothing", "matches"));
        marker.added = true;
        marker.deleted = true;
        record.push(marker);

        assert_eq!(reconstruct(&record).unwrap(), "AB");
    }

    #[test]
    fn test_out_of_order_delta_is_corrupt_history() {
        let mut record = FileHistoryRecord::new("f.txt", "A");
        record.push(HistoryEntry::modified(delta::diff("ABC", "ABCD")));

        let err = reconstruct(&record).unwrap_err();
        assert!(matches!(err, Error::CorruptHistory { ref filename, .. } if filename == "f.txt"));
        assert!(err.is_corruption());
    }
}
