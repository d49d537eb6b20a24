//! Record store persistence.
//!
//! The whole store is a single JSON document. Loading degrades to an empty
//! store on any failure; saving replaces the document atomically.

use crate::{Error, MeasurementRecord, Result, Store, UserHistory};
use fs2::FileExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Raw document shape: username → list of not-yet-validated records
type RawDocument = BTreeMap<String, Vec<Value>>;

impl Store {
    /// Load the store, falling back to an empty one.
    ///
    /// A missing, unreadable or structurally malformed file yields an empty
    /// store. Records that fail validation inside an otherwise well-formed
    /// document are skipped with a warning and the rest are kept.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No data file found at {:?}, starting empty", path);
            return Self::default();
        }

        let contents = match read_locked(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Unable to read data file {:?}: {}. Starting empty.", path, e);
                return Self::default();
            }
        };

        match decode(&contents, false) {
            Ok(store) => {
                tracing::debug!("Loaded {} users from {:?}", store.len(), path);
                store
            }
            Err(e) => {
                tracing::warn!("Failed to parse data file {:?}: {}. Starting empty.", path, e);
                Self::default()
            }
        }
    }

    /// Load the store without degrading.
    ///
    /// A missing file is still an empty store, but unreadable files and any
    /// malformed record are reported as errors.
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = read_locked(path)?;
        decode(&contents, true)
    }

    /// Save the store, replacing the file atomically
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames it
    /// over the original so readers never observe a partial document.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(&self.to_json_bytes()?)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} users to {:?}", self.len(), path);
        Ok(())
    }

    /// Serialized document, pretty-printed with four-space indentation
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(self, &mut ser)?;
        Ok(buf)
    }
}

/// Persistence target for history mutations
pub trait StoreSink {
    fn persist(&mut self, store: &Store) -> Result<()>;
}

/// Sink writing the store to a JSON file
#[derive(Clone, Debug)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store this sink writes to
    pub fn load(&self) -> Store {
        Store::load(&self.path)
    }
}

impl StoreSink for JsonFileSink {
    fn persist(&mut self, store: &Store) -> Result<()> {
        store.save(&self.path)
    }
}

fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();
    read?;

    Ok(contents)
}

fn decode(contents: &str, strict: bool) -> Result<Store> {
    let raw: RawDocument = serde_json::from_str(contents)
        .map_err(|e| Error::Schema(format!("expected an object of user lists: {}", e)))?;

    let mut store = Store::default();
    for (username, entries) in raw {
        let mut history = UserHistory::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<MeasurementRecord>(entry) {
                Ok(record) => history.push(record),
                Err(e) if strict => {
                    return Err(Error::Schema(format!(
                        "user '{}' entry {}: {}",
                        username,
                        index + 1,
                        e
                    )));
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed entry {} for user '{}': {}",
                        index + 1,
                        username,
                        e
                    );
                }
            }
        }
        store.users.insert(username, history);
    }
    Ok(store)
}
