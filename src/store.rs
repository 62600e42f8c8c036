//! # Filesystem-backed message store
//!
//! One pretty-printed JSON file per accepted message, named
//! `fakesmtpd-client-<id>.json` inside the message directory. Listing
//! rediscovers state by scanning the directory, which is O(n) in stored
//! messages per call; fine for a test fixture.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const FILE_PREFIX: &str = "fakesmtpd-client-";
const FILE_SUFFIX: &str = ".json";

/// The durable record produced by one completed SMTP session. Every field
/// holds raw lines exactly as the client sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub from: String,
    pub recipients: Vec<String>,
    pub body: Vec<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed message record: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct MessageStore {
    dir: PathBuf,
    // Serializes put/clear. Readers go straight to the directory.
    mutate: Mutex<()>,
}

impl MessageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            mutate: Mutex::new(()),
        }
    }

    /// Where a message with the given id lives (or would live) on disk.
    pub fn message_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{id}{FILE_SUFFIX}"))
    }

    /// Persists a message and returns its location. The record is written
    /// to a temporary name and renamed into place, so a reader never
    /// observes a half-written file. A colliding id is overwritten.
    pub fn put(&self, message: &Message) -> Result<PathBuf, StoreError> {
        let _guard = self.mutate.lock().unwrap_or_else(|e| e.into_inner());
        let outfile = self.message_path(&message.message_id);
        let tmp = self.dir.join(format!(
            ".{FILE_PREFIX}{}{FILE_SUFFIX}.tmp",
            message.message_id
        ));
        fs::write(&tmp, serde_json::to_string_pretty(message)?)?;
        fs::rename(&tmp, &outfile)?;
        Ok(outfile)
    }

    /// Enumerates every stored message as `(id, location)`, sorted by id so
    /// the order is stable between mutations within one run.
    pub fn list(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let mut found = self.scan()?;
        found.sort();
        Ok(found)
    }

    /// Resolves one message by id with a direct path probe; no scan.
    pub fn get(&self, id: &str) -> Result<Option<Message>, StoreError> {
        let raw = match fs::read_to_string(self.message_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Deletes every stored message. A `put` racing a `clear` may survive
    /// or be deleted; no ordering is guaranteed across the two.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.mutate.lock().unwrap_or_else(|e| e.into_inner());
        for (_, path) in self.scan()? {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn scan(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
                found.push((id_from_filename(name), path));
            }
        }
        Ok(found)
    }
}

/// Recovers the id from a stored file's name by dropping everything that
/// isn't a digit.
fn id_from_filename(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> Message {
        Message {
            message_id: id.to_owned(),
            from: "MAIL FROM:<x@example.org>".to_owned(),
            recipients: vec!["RCPT TO:<y@example.org>".to_owned()],
            body: vec!["Subject: hi".to_owned(), "".to_owned(), "yo".to_owned()],
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        let message = sample("20260825120000000000001");
        let outfile = store.put(&message).unwrap();
        assert!(outfile.ends_with("fakesmtpd-client-20260825120000000000001.json"));

        let read_back = store.get(&message.message_id).unwrap().unwrap();
        assert_eq!(read_back, message);
    }

    #[test]
    fn get_unknown_id_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        assert!(store.get("19700101000000000000000").unwrap().is_none());
    }

    #[test]
    fn list_reports_ids_and_locations_in_stable_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        store.put(&sample("20260825120000000000002")).unwrap();
        store.put(&sample("20260825120000000000001")).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0, "20260825120000000000001");
        assert_eq!(listed[1].0, "20260825120000000000002");
        assert_eq!(listed[0].1, store.message_path(&listed[0].0));
    }

    #[test]
    fn list_ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        store.put(&sample("20260825120000000000001")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a message").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        store.put(&sample("20260825120000000000001")).unwrap();
        store.put(&sample("20260825120000000000002")).unwrap();
        store.clear().unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn id_survives_the_filename_encoding() {
        assert_eq!(
            id_from_filename("fakesmtpd-client-20260825120102123456789.json"),
            "20260825120102123456789"
        );
    }
}
