//! Per-user history mutations.
//!
//! Every operation mutates the in-memory store and then persists the whole
//! store through a [`StoreSink`]. Logical failures (unknown user, bad index)
//! happen before any mutation and never touch the sink.

use crate::input::validate_username;
use crate::{Error, MeasurementRecord, Result, Store, StoreSink, UserHistory};
use chrono::NaiveDateTime;

/// Append a record to a user's history, creating the user if needed
pub fn append<S: StoreSink + ?Sized>(
    store: &mut Store,
    sink: &mut S,
    username: &str,
    record: MeasurementRecord,
) -> Result<()> {
    let username = validate_username(username)?;

    let history = store.users.entry(username.clone()).or_default();
    history.push(record);
    tracing::debug!("Appended entry for '{}' ({} total)", username, history.len());

    sink.persist(store)
}

/// Remove the first record whose timestamp equals `timestamp`
///
/// Timestamps only have second precision, so two entries may share one;
/// only the oldest of them is removed. Use [`delete_at`] to target a
/// specific position. Nothing is persisted when no record matches.
pub fn delete_one<S: StoreSink + ?Sized>(
    store: &mut Store,
    sink: &mut S,
    username: &str,
    timestamp: NaiveDateTime,
) -> Result<MeasurementRecord> {
    let username = validate_username(username)?;
    let history = user_history_mut(store, &username)?;

    let index = history
        .iter()
        .position(|r| r.timestamp == timestamp)
        .ok_or_else(|| {
            Error::NotFound(format!("entry at {} for user '{}'", timestamp, username))
        })?;
    let record = history.remove(index);
    tracing::debug!("Removed entry at {} for '{}'", timestamp, username);

    sink.persist(store)?;
    Ok(record)
}

/// Remove the record at `index` (0 = oldest) from a user's history
pub fn delete_at<S: StoreSink + ?Sized>(
    store: &mut Store,
    sink: &mut S,
    username: &str,
    index: usize,
) -> Result<MeasurementRecord> {
    let username = validate_username(username)?;
    let history = user_history_mut(store, &username)?;
    if index >= history.len() {
        return Err(Error::NotFound(format!(
            "entry {} for user '{}' ({} entries)",
            index,
            username,
            history.len()
        )));
    }

    let record = history.remove(index);
    tracing::debug!("Removed entry {} for '{}'", index, username);

    sink.persist(store)?;
    Ok(record)
}

/// Remove a user and their whole history
pub fn clear<S: StoreSink + ?Sized>(
    store: &mut Store,
    sink: &mut S,
    username: &str,
) -> Result<UserHistory> {
    let username = validate_username(username)?;
    let history = store
        .users
        .remove(&username)
        .ok_or_else(|| Error::NotFound(format!("user '{}'", username)))?;
    tracing::debug!("Cleared {} entries for '{}'", history.len(), username);

    sink.persist(store)?;
    Ok(history)
}

fn user_history_mut<'a>(store: &'a mut Store, username: &str) -> Result<&'a mut UserHistory> {
    store
        .users
        .get_mut(username)
        .ok_or_else(|| Error::NotFound(format!("user '{}'", username)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, JsonFileSink};
    use chrono::NaiveDate;
    use std::io;

    /// Sink counting saves, optionally failing every one
    #[derive(Default)]
    struct MemorySink {
        saves: usize,
        last: Option<Store>,
        fail: bool,
    }

    impl StoreSink for MemorySink {
        fn persist(&mut self, store: &Store) -> Result<()> {
            if self.fail {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.saves += 1;
            self.last = Some(store.clone());
            Ok(())
        }
    }

    fn at(day: u32, secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(12, 0, secs)
            .unwrap()
    }

    fn record(day: u32, weight: f64) -> MeasurementRecord {
        MeasurementRecord::new(weight, 180.0, at(day, 0))
    }

    #[test]
    fn test_append_creates_user_and_persists() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();

        let r = MeasurementRecord::new(70.0, 175.0, at(1, 0));
        append(&mut store, &mut sink, "alice", r).unwrap();

        let history = store.history("alice").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].bmi, 22.86);
        assert_eq!(history[0].category, Category::Normal);
        assert_eq!(sink.saves, 1);
        assert_eq!(sink.last.as_ref(), Some(&store));
    }

    #[test]
    fn test_append_is_monotonic() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();
        append(&mut store, &mut sink, "bob", record(1, 80.0)).unwrap();

        let before = store.history("bob").unwrap().len();
        let newest = record(2, 75.0);
        append(&mut store, &mut sink, "bob", newest.clone()).unwrap();

        let history = store.history("bob").unwrap();
        assert_eq!(history.len(), before + 1);
        assert_eq!(history.last(), Some(&newest));
    }

    #[test]
    fn test_append_trims_username_and_rejects_blank() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();

        append(&mut store, &mut sink, "  carol ", record(1, 60.0)).unwrap();
        assert!(store.contains_user("carol"));

        let err = append(&mut store, &mut sink, "   ", record(1, 60.0)).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "username", .. }));
        assert_eq!(sink.saves, 1);
    }

    #[test]
    fn test_delete_one_removes_first_match_only() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();
        append(&mut store, &mut sink, "alice", record(1, 70.0)).unwrap();
        append(&mut store, &mut sink, "alice", record(1, 71.0)).unwrap();
        append(&mut store, &mut sink, "alice", record(2, 72.0)).unwrap();

        let removed = delete_one(&mut store, &mut sink, "alice", at(1, 0)).unwrap();
        assert_eq!(removed.weight_kg, 70.0);

        let weights: Vec<f64> = store
            .history("alice")
            .unwrap()
            .iter()
            .map(|r| r.weight_kg)
            .collect();
        assert_eq!(weights, vec![71.0, 72.0]);
    }

    #[test]
    fn test_delete_one_without_match_is_not_found() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();
        append(&mut store, &mut sink, "alice", record(1, 70.0)).unwrap();

        let err = delete_one(&mut store, &mut sink, "alice", at(9, 9)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(store.history("alice").unwrap().len(), 1);
        assert_eq!(sink.saves, 1);
    }

    #[test]
    fn test_delete_one_without_match_keeps_file_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bmi_data.json");
        // Second entry is skipped on load; rewriting the file would lose it
        let doc = r#"{"alice": [
            {"date": "2024-06-01 12:00:00", "weight": 70, "height": 180, "bmi": 21.6, "category": "Normal weight"},
            {"date": "2024-06-02 12:00:00", "weight": 71}
        ]}"#;
        std::fs::write(&path, doc).unwrap();

        let mut sink = JsonFileSink::new(&path);
        let mut store = sink.load();
        let timestamp = crate::parse_timestamp("2030-01-01 00:00:00").unwrap();

        let err = delete_one(&mut store, &mut sink, "alice", timestamp).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc);
    }

    #[test]
    fn test_delete_one_unknown_user() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();

        let err = delete_one(&mut store, &mut sink, "nobody", at(1, 0)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(sink.saves, 0);
    }

    #[test]
    fn test_delete_at() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();
        append(&mut store, &mut sink, "alice", record(1, 70.0)).unwrap();
        append(&mut store, &mut sink, "alice", record(2, 71.0)).unwrap();

        let removed = delete_at(&mut store, &mut sink, "alice", 1).unwrap();
        assert_eq!(removed.weight_kg, 71.0);
        assert_eq!(store.history("alice").unwrap().len(), 1);

        let err = delete_at(&mut store, &mut sink, "alice", 1).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_clear_removes_user() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();
        append(&mut store, &mut sink, "alice", record(1, 70.0)).unwrap();
        append(&mut store, &mut sink, "bob", record(1, 90.0)).unwrap();

        let cleared = clear(&mut store, &mut sink, "alice").unwrap();
        assert_eq!(cleared.len(), 1);
        assert!(store.history("alice").is_none());
        assert!(store.contains_user("bob"));

        let err = clear(&mut store, &mut sink, "alice").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_lookups_trim_username() {
        let mut store = Store::new();
        let mut sink = MemorySink::default();
        append(&mut store, &mut sink, " alice ", record(1, 70.0)).unwrap();
        append(&mut store, &mut sink, "alice", record(2, 71.0)).unwrap();
        append(&mut store, &mut sink, "alice", record(3, 72.0)).unwrap();

        assert_eq!(store.history(" alice ").unwrap().len(), 3);
        assert!(store.contains_user("alice  "));

        delete_one(&mut store, &mut sink, " alice", at(1, 0)).unwrap();
        delete_at(&mut store, &mut sink, "alice ", 0).unwrap();
        let cleared = clear(&mut store, &mut sink, " alice ").unwrap();
        assert_eq!(cleared.len(), 1);
        assert!(!store.contains_user("alice"));

        let err = clear(&mut store, &mut sink, "  ").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "username", .. }));
    }

    #[test]
    fn test_clear_unknown_user_leaves_file_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bmi_data.json");
        let mut sink = JsonFileSink::new(&path);

        let mut store = Store::new();
        append(&mut store, &mut sink, "alice", record(1, 70.0)).unwrap();
        let before = std::fs::read(&path).unwrap();

        let err = clear(&mut store, &mut sink, "mallory").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(store.to_json_bytes().unwrap(), before);
    }

    #[test]
    fn test_persistence_failure_is_distinct_from_not_found() {
        let mut store = Store::new();
        let mut sink = MemorySink {
            fail: true,
            ..Default::default()
        };

        let err = append(&mut store, &mut sink, "alice", record(1, 70.0)).unwrap_err();
        assert!(err.is_persistence());
        // In-memory store keeps the entry even though it was not saved
        assert_eq!(store.history("alice").unwrap().len(), 1);

        let err = clear(&mut store, &mut sink, "nobody").unwrap_err();
        assert!(!err.is_persistence());
    }
}
