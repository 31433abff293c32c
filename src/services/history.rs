//! Persisted search history.
//!
//! The whole history is a single JSON document: a top-level array of
//! `{id, name}` objects, pretty-printed with tab indentation so the file
//! stays human-readable. Absence of the file is a normal startup state and
//! reads as an empty history; a file that exists but does not parse is a
//! configuration problem and surfaces as a `Storage` error.
//!
//! Every mutation is a read-modify-write of the full document. The store
//! serializes them behind an async mutex so two interleaved requests cannot
//! lose each other's update, and writes go through a temp file + rename so
//! a cancelled request never leaves a half-written document behind.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::errors::AppError;

/// One previously searched city.
///
/// Ids are unique; names are not (searching the same city twice yields two
/// entries). Insertion order is the canonical display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    /// Unique, time-derived identifier
    pub id: String,
    /// City name as the user entered it
    pub name: String,
}

/// File-backed history store. Exclusively owns the persisted document.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
    /// Disambiguates ids generated within the same millisecond.
    id_counter: AtomicU64,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            id_counter: AtomicU64::new(0),
        }
    }

    /// Generate a unique id for a new entry: millisecond timestamp plus a
    /// process-local counter suffix.
    pub fn next_id(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = self.id_counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", millis, seq)
    }

    /// Read the full history, oldest first.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>, AppError> {
        let _guard = self.lock.lock().await;
        read_document(&self.path).await
    }

    /// Append an entry. No dedup by name; the id is assumed unique.
    pub async fn add(&self, entry: HistoryEntry) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut entries = read_document(&self.path).await?;
        entries.push(entry);
        write_document(&self.path, &entries).await
    }

    /// Remove every entry with the given id. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        let mut entries = read_document(&self.path).await?;
        entries.retain(|entry| entry.id != id);
        write_document(&self.path, &entries).await
    }

    /// Whether the history file is readable (or absent, which is fine).
    /// Used by the health endpoint.
    pub async fn is_healthy(&self) -> bool {
        let _guard = self.lock.lock().await;
        read_document(&self.path).await.is_ok()
    }
}

async fn read_document(path: &Path) -> Result<Vec<HistoryEntry>, AppError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        // Missing file means nothing has been searched yet.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(AppError::Storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::Storage(format!("history file {} is corrupt: {}", path.display(), e))
    })
}

/// Replace the document contents. Serializes with tab indentation, writes
/// to a sibling temp file, then renames over the target.
async fn write_document(path: &Path, entries: &[HistoryEntry]) -> Result<(), AppError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries
        .serialize(&mut serializer)
        .map_err(|e| AppError::Storage(format!("failed to serialize history: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &buf)
        .await
        .map_err(|e| AppError::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| AppError::Storage(format!("failed to replace {}: {}", path.display(), e)))
}
