use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use snafu::{ResultExt, Snafu};

use crate::record::{NaturalKey, WorkdayRecord};
use crate::{StoreDecodingSnafu, StoreIoSnafu, WdResult};

/// Backing store for imported records.
///
/// Uniqueness on the natural key is the store's own invariant: callers
/// attempt the write and handle the rejection, rather than querying first.
/// This keeps the dedup decision free of read-then-write races when the
/// store is shared with concurrent writers.
pub trait FeedbackStore {
    fn insert(&mut self, record: WorkdayRecord) -> Result<(), InsertError>;
    fn records(&self) -> &[WorkdayRecord];
}

#[derive(Debug, Snafu)]
pub enum InsertError {
    /// Routine on re-import; the orchestrator counts these and moves on.
    #[snafu(display("duplicate feedback for '{about}' from '{from_name}'"))]
    Duplicate { about: String, from_name: String },
    #[snafu(display("store write failed for {path}: {source}"))]
    Write {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("store encoding failed: {source}"))]
    Encode { source: serde_json::Error },
}

/// In-memory store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<WorkdayRecord>,
    keys: HashSet<NaturalKey>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl FeedbackStore for MemoryStore {
    fn insert(&mut self, record: WorkdayRecord) -> Result<(), InsertError> {
        if !self.keys.insert(record.natural_key()) {
            return DuplicateSnafu {
                about: record.about,
                from_name: record.from_name,
            }
            .fail();
        }
        self.records.push(record);
        Ok(())
    }

    fn records(&self) -> &[WorkdayRecord] {
        &self.records
    }
}

/// Durable store: one JSON document per line.
///
/// Every insert is written and flushed before it is acknowledged, so each
/// row is an independently committed unit. Rows written before a crash
/// survive it, and re-opening the file rebuilds the key set, which is what
/// makes a re-run of the same import idempotent.
pub struct JsonlStore {
    path: PathBuf,
    file: File,
    records: Vec<WorkdayRecord>,
    keys: HashSet<NaturalKey>,
}

impl JsonlStore {
    /// Opens an existing store or creates an empty one.
    pub fn open(path: &Path) -> WdResult<JsonlStore> {
        let display = path.display().to_string();
        let mut records: Vec<WorkdayRecord> = Vec::new();

        if path.exists() {
            let reader = BufReader::new(File::open(path).context(StoreIoSnafu {
                path: display.clone(),
            })?);
            for (idx, line) in reader.lines().enumerate() {
                let line = line.context(StoreIoSnafu {
                    path: display.clone(),
                })?;
                if line.trim().is_empty() {
                    continue;
                }
                let record = serde_json::from_str(&line).context(StoreDecodingSnafu {
                    path: display.clone(),
                    lineno: idx + 1,
                })?;
                records.push(record);
            }
            info!("JsonlStore: loaded {} records from {}", records.len(), display);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context(StoreIoSnafu {
                path: display.clone(),
            })?;
        let keys = records.iter().map(|r| r.natural_key()).collect();

        Ok(JsonlStore {
            path: path.to_path_buf(),
            file,
            records,
            keys,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedbackStore for JsonlStore {
    fn insert(&mut self, record: WorkdayRecord) -> Result<(), InsertError> {
        if self.keys.contains(&record.natural_key()) {
            return DuplicateSnafu {
                about: record.about,
                from_name: record.from_name,
            }
            .fail();
        }

        let line = serde_json::to_string(&record).context(EncodeSnafu {})?;
        let path = self.path.display().to_string();
        writeln!(self.file, "{}", line).context(WriteSnafu { path: path.clone() })?;
        self.file.flush().context(WriteSnafu { path })?;

        debug!("JsonlStore: inserted record for '{}'", record.about);
        self.keys.insert(record.natural_key());
        self.records.push(record);
        Ok(())
    }

    fn records(&self) -> &[WorkdayRecord] {
        &self.records
    }
}
