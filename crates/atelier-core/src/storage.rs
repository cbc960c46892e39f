//! Storage backend abstraction for document and manifest persistence.
//!
//! This module defines the storage contract shared by the registry layer.
//! Keys are slash-separated paths relative to a storage root. Writes are
//! unconditional whole-object replacements: the registry's manifest contract
//! is last-write-wins, so no conditional-write primitive is exposed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Error, Result};

/// Storage backend trait for file-backed state.
///
/// All backends (local directory, memory) implement this trait. Objects are
/// opaque byte blobs addressed by relative, slash-separated keys.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Reads an entire object.
    ///
    /// Returns `Error::NotFound` if the object doesn't exist.
    async fn get(&self, path: &str) -> Result<Bytes>;

    /// Writes an object, replacing any existing content at that key.
    ///
    /// Intermediate directories are created as needed.
    async fn put(&self, path: &str, data: Bytes) -> Result<()>;

    /// Deletes an object.
    ///
    /// Succeeds even if the object doesn't exist (idempotent).
    async fn delete(&self, path: &str) -> Result<()>;

    /// Lists objects that are direct children of the given directory-like
    /// prefix (e.g. `"json/"`).
    ///
    /// Returns an empty vec if nothing matches, including when the prefix
    /// directory itself does not exist.
    ///
    /// **Ordering**: results are returned in arbitrary order that may vary
    /// between backends and invocations. Callers requiring deterministic
    /// order must sort.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Validates a storage key before it is resolved against a root directory.
///
/// Keys must be relative, slash-separated, and free of `..` segments so a
/// backend can never be walked out of its root.
fn validate_key(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidInput("storage key cannot be empty".into()));
    }
    if path.starts_with('/') || path.contains('\\') {
        return Err(Error::InvalidInput(format!(
            "storage key must be relative and slash-separated: {path}"
        )));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(Error::InvalidInput(format!(
            "path traversal not allowed: {path}"
        )));
    }
    if path.contains('\n') || path.contains('\r') || path.contains('\0') {
        return Err(Error::InvalidInput(format!(
            "control characters not allowed in storage key: {path}"
        )));
    }
    Ok(())
}

// ============================================================================
// Local directory backend
// ============================================================================

/// Storage backend over a local directory tree.
///
/// Keys map directly to paths below the root; `put` creates missing
/// directories, `list` of a nonexistent directory returns empty.
#[derive(Debug, Clone)]
pub struct LocalDirBackend {
    root: PathBuf,
}

impl LocalDirBackend {
    /// Creates a backend rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory of this backend.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        validate_key(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl StorageBackend for LocalDirBackend {
    async fn get(&self, path: &str) -> Result<Bytes> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("object not found: {path}")))
            }
            Err(e) => Err(Error::storage_with_source(
                format!("failed to read {path}"),
                e,
            )),
        }
    }

    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::storage_with_source(
                    format!("failed to create directory for {path}"),
                    e,
                )
            })?;
        }
        tokio::fs::write(&target, &data)
            .await
            .map_err(|e| Error::storage_with_source(format!("failed to write {path}"), e))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage_with_source(
                format!("failed to delete {path}"),
                e,
            )),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.resolve(prefix.trim_end_matches('/'))?
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::storage_with_source(
                    format!("failed to list {prefix}"),
                    e,
                ))
            }
        };

        let dir_prefix = normalize_prefix(prefix);
        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::storage_with_source(format!("failed to list {prefix}"), e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| Error::storage_with_source(format!("failed to list {prefix}"), e))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                keys.push(format!("{dir_prefix}{name}"));
            }
        }
        Ok(keys)
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

/// In-memory storage backend for testing.
///
/// Thread-safe via `RwLock`. Not suitable for production.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryBackend {
    /// Creates a new empty memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, path: &str) -> Result<Bytes> {
        let objects = self.objects.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        objects
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("object not found: {path}")))
    }

    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        validate_key(path)?;
        self.objects
            .write()
            .map_err(|_| Error::Internal {
                message: "lock poisoned".into(),
            })?
            .insert(path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.objects
            .write()
            .map_err(|_| Error::Internal {
                message: "lock poisoned".into(),
            })?
            .remove(path);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir_prefix = normalize_prefix(prefix);
        let objects = self.objects.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        Ok(objects
            .keys()
            .filter(|k| {
                k.strip_prefix(dir_prefix.as_str())
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .cloned()
            .collect())
    }
}

/// Normalizes a listing prefix so that non-empty prefixes end with a slash.
fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}
