//! Core SealStore implementation

use eyre::{Context, Result, bail};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counts reported by `ss stats`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Distinct record ids
    pub records: usize,
    /// Lines in the log, including superseded ones
    pub log_lines: usize,
    /// Lines skipped during replay
    pub skipped_lines: usize,
}

/// Append-only JSONL record store with an in-memory id index
#[derive(Debug)]
pub struct SealStore {
    /// Path to records.jsonl
    log_path: PathBuf,
    /// id -> latest record
    index: HashMap<String, Value>,
    /// ids in first-seen order
    order: Vec<String>,
    stats: StoreStats,
}

impl SealStore {
    /// Open or create a store in the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        let log_path = base_path.join(crate::RECORD_LOG);
        debug!(?log_path, "open: called");

        let mut store = Self {
            log_path,
            index: HashMap::new(),
            order: Vec::new(),
            stats: StoreStats::default(),
        };
        store.replay()?;
        info!(records = store.index.len(), "Opened seal store");
        Ok(store)
    }

    fn replay(&mut self) -> Result<()> {
        if !self.log_path.exists() {
            debug!("replay: no log yet");
            return Ok(());
        }

        let file = fs::File::open(&self.log_path).context("Failed to open record log")?;
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.context("Failed to read record log")?;
            if line.trim().is_empty() {
                continue;
            }
            self.stats.log_lines += 1;

            let record: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "replay: skipping corrupt line");
                    self.stats.skipped_lines += 1;
                    continue;
                }
            };
            let Some(id) = record.get("id").and_then(Value::as_str).map(String::from) else {
                warn!(line = line_no + 1, "replay: skipping record without id");
                self.stats.skipped_lines += 1;
                continue;
            };
            self.insert(id, record);
        }
        self.stats.records = self.index.len();
        Ok(())
    }

    fn insert(&mut self, id: String, record: Value) {
        if !self.index.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.index.insert(id, record);
    }

    /// Append a record under `id`
    ///
    /// The record must be a JSON object whose `id` field equals `id`.
    pub fn put(&mut self, id: &str, record: &Value) -> Result<()> {
        debug!(%id, "put: called");
        match record.get("id").and_then(Value::as_str) {
            Some(found) if found == id => {}
            Some(found) => bail!("Record id mismatch: expected {}, found {}", id, found),
            None => bail!("Record {} has no string id field", id),
        }

        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .context("Failed to open record log for append")?;

        file.lock_exclusive().context("Failed to lock record log")?;
        let written = writeln!(file, "{}", line).and_then(|_| file.flush());
        FileExt::unlock(&file).context("Failed to unlock record log")?;
        written.context("Failed to append record")?;

        self.insert(id.to_string(), record.clone());
        self.stats.log_lines += 1;
        self.stats.records = self.index.len();
        Ok(())
    }

    /// Serialize and append a typed record
    pub fn put_as<T: Serialize>(&mut self, id: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record).context("Failed to encode record")?;
        self.put(id, &value)
    }

    /// Latest record stored under `id`
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.index.get(id)
    }

    /// Latest record under `id`, decoded into `T`
    pub fn get_as<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        match self.index.get(id) {
            Some(value) => {
                let record = serde_json::from_value(value.clone()).context(format!("Failed to decode record {}", id))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Records in first-seen order, optionally filtered by `tipo`
    pub fn list(&self, tipo: Option<&str>) -> Vec<&Value> {
        self.order
            .iter()
            .filter_map(|id| self.index.get(id))
            .filter(|record| match tipo {
                Some(t) => record.get("tipo").and_then(Value::as_str) == Some(t),
                None => true,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.stats.clone()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
