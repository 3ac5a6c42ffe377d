//! Draft persistence.
//!
//! The engine never talks to a concrete storage backend directly; it goes
//! through the [`KvStore`] trait so the same machine runs against browser
//! storage, a file, or an in-memory map in tests. `DraftStore` layers the
//! fail-open load/save/reset contract on top: corrupt or missing data reads as
//! the default empty draft, and write failures are logged and swallowed so the
//! form never crashes on a storage problem.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Draft;

/// Storage key for the draft envelope.
pub const DRAFT_KEY: &str = "rental-application/form-state-v1";
/// Storage key for the current step index.
pub const STEP_KEY: &str = "rental-application/form-step-v1";

/// Number of form steps; persisted indices are clamped to this range.
pub const STEP_COUNT: usize = 6;

/// A storage backend failure. Callers of `DraftStore` never see this; the
/// wrapper swallows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "storage error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Minimal key-value persistence interface.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, used in tests and as the default for ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store keeping the whole key space in one JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open a store at `path`, reading any existing content. An unreadable or
    /// malformed file starts empty rather than failing the session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, entries }
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(&self.entries).map_err(|e| StoreError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| StoreError(e.to_string()))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        self.flush()
    }
}

/// The persisted draft envelope. Carries the approval-gate latch and a save
/// timestamp alongside the answers so both survive reloads under the single
/// draft key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDraft {
    form: Draft,
    #[serde(default)]
    approval_granted: bool,
    saved_at: DateTime<Utc>,
}

/// Everything the engine restores on startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub draft: Draft,
    pub step: usize,
    pub approval_granted: bool,
}

/// Write-through draft persistence with fail-open reads.
#[derive(Debug)]
pub struct DraftStore<S> {
    inner: S,
}

impl<S: KvStore> DraftStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Load the last persisted state, falling back to defaults for anything
    /// missing or corrupt.
    pub fn load(&self) -> PersistedState {
        let (draft, approval_granted) = self
            .inner
            .get(DRAFT_KEY)
            .and_then(|raw| serde_json::from_str::<StoredDraft>(&raw).ok())
            .map(|stored| (stored.form, stored.approval_granted))
            .unwrap_or_default();

        let step = self
            .inner
            .get(STEP_KEY)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .map(|index| index.min(STEP_COUNT - 1))
            .unwrap_or(0);

        PersistedState {
            draft,
            step,
            approval_granted,
        }
    }

    /// Persist the draft and step index. Storage failures are logged and
    /// swallowed; the in-memory state stays authoritative.
    pub fn save(&mut self, draft: &Draft, step: usize, approval_granted: bool) {
        let stored = StoredDraft {
            form: draft.clone(),
            approval_granted,
            saved_at: Utc::now(),
        };

        match serde_json::to_string(&stored) {
            Ok(json) => {
                if let Err(e) = self.inner.set(DRAFT_KEY, &json) {
                    tracing::warn!("Failed to persist draft: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize draft: {}", e),
        }

        if let Err(e) = self.inner.set(STEP_KEY, &step.to_string()) {
            tracing::warn!("Failed to persist step index: {}", e);
        }
    }

    /// Restore the default empty draft and step 0. All-or-nothing: no partial
    /// clearing.
    pub fn reset(&mut self) {
        self.save(&Draft::default(), 0, false);
    }
}
