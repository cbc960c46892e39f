//! Manifest index persistence.
//!
//! The manifest is a single JSON document replaced whole on every save; there
//! is no incremental update primitive. Every mutation is a load-modify-save
//! cycle, so concurrent mutations can lose updates (last write wins). That is
//! the documented contract for this single-operator system; no locking is
//! layered on top.

use std::sync::Arc;

use bytes::Bytes;

use atelier_core::StorageBackend;

use crate::error::{RegistryError, Result};
use crate::paths;
use crate::record::ManifestIndex;

/// Reads and writes the manifest index file.
#[derive(Clone)]
pub struct ManifestStore {
    storage: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for ManifestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestStore")
            .field("storage", &"<StorageBackend>")
            .finish()
    }
}

impl ManifestStore {
    /// Creates a manifest store over the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Loads and parses the manifest, failing on missing or corrupt content.
    ///
    /// Used by the delete path, which must skip manifest bookkeeping rather
    /// than clobber a manifest it cannot read.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is absent, unreadable, or not valid
    /// JSON.
    pub async fn load(&self) -> Result<ManifestIndex> {
        let bytes = self.storage.get(paths::MANIFEST_FILE).await?;
        let mut index: ManifestIndex =
            serde_json::from_slice(&bytes).map_err(|e| RegistryError::Serialization {
                message: format!("failed to parse {}: {e}", paths::MANIFEST_FILE),
            })?;
        index.normalize();
        Ok(index)
    }

    /// Loads the manifest, returning an empty index when it is absent or
    /// cannot be parsed.
    ///
    /// This is the self-healing default used by create/save/list: a corrupt
    /// manifest is treated as empty and will be overwritten by the next
    /// successful mutation.
    pub async fn load_or_default(&self) -> ManifestIndex {
        match self.load().await {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(error = %e, "manifest unreadable; using empty index");
                ManifestIndex::new()
            }
        }
    }

    /// Serializes the full index and replaces the manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub async fn save(&self, index: &ManifestIndex) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(index).map_err(|e| RegistryError::Serialization {
                message: format!("failed to serialize manifest: {e}"),
            })?;
        self.storage
            .put(paths::MANIFEST_FILE, Bytes::from(json))
            .await?;
        Ok(())
    }
}
