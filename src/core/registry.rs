//! Named-matrix store with an append-only operation log.
//!
//! Undo only reverses entries that can be reversed without a snapshot:
//! creations and stored results. Deletions and edits keep no prior state,
//! so undoing them reports the entry as irreversible.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::matrix::Matrix;
use crate::io::atomic::atomic_write;

/// Name of the slot that receives the latest computed result.
pub const ANSWER: &str = "Answer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Created,
    Deleted,
    Edited,
    StoredResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub name: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            EntryKind::Created => "created",
            EntryKind::Deleted => "deleted",
            EntryKind::Edited => "edited",
            EntryKind::StoredResult => "stored result in",
        };
        write!(f, "{verb} {}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    Reverted(LogEntry),
    Irreversible(LogEntry),
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    matrices: BTreeMap<String, Matrix>,
    log: Vec<LogEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, kind: EntryKind, name: &str) {
        self.log.push(LogEntry { kind, name: name.to_string() });
    }

    pub fn create(&mut self, name: &str, matrix: Matrix) -> Result<()> {
        if self.matrices.contains_key(name) {
            bail!("matrix {name} already exists");
        }
        self.matrices.insert(name.to_string(), matrix);
        self.record(EntryKind::Created, name);
        Ok(())
    }

    pub fn edit(&mut self, name: &str, matrix: Matrix) -> Result<()> {
        match self.matrices.get_mut(name) {
            Some(slot) => *slot = matrix,
            None => bail!("matrix {name} not found"),
        }
        self.record(EntryKind::Edited, name);
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<Matrix> {
        let Some(removed) = self.matrices.remove(name) else {
            bail!("matrix {name} not found");
        };
        self.record(EntryKind::Deleted, name);
        Ok(removed)
    }

    /// Inserts or overwrites; used for computed results.
    pub fn store_result(&mut self, name: &str, matrix: Matrix) {
        self.matrices.insert(name.to_string(), matrix);
        self.record(EntryKind::StoredResult, name);
    }

    pub fn get(&self, name: &str) -> Option<&Matrix> {
        self.matrices.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matrices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn undo(&mut self) -> Undo {
        let Some(entry) = self.log.pop() else {
            return Undo::Empty;
        };
        match entry.kind {
            EntryKind::Created | EntryKind::StoredResult => {
                self.matrices.remove(&entry.name);
                Undo::Reverted(entry)
            }
            EntryKind::Deleted | EntryKind::Edited => Undo::Irreversible(entry),
        }
    }

    /// Writes `{name: grid}` as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.matrices).context("serializing matrices")?;
        atomic_write(path, text).with_context(|| format!("writing {}", path.display()))?;
        debug_log!("registry: saved {} matrices to {}", self.matrices.len(), path.display());
        Ok(())
    }

    /// Replaces the contents with the file's matrices and clears the log.
    /// A missing file loads as an empty registry.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.matrices = if path.exists() {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        self.log.clear();
        debug_log!("registry: loaded {} matrices from {}", self.matrices.len(), path.display());
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self> {
        let mut registry = Registry::new();
        registry.load(path)?;
        Ok(registry)
    }
}
