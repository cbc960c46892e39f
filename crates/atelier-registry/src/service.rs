//! Project service: orchestrates create/save/delete/list across the document
//! store and the manifest store.
//!
//! Validation short-circuits before any I/O. Document writes are upserts;
//! manifest entries are insert-only (repeat writes never update `folder` or
//! `name`). Manifest bookkeeping failures during delete are swallowed: the
//! caller observes the outcome of the document deletion.

use std::sync::Arc;

use bytes::Bytes;

use atelier_core::StorageBackend;

use crate::documents::DocumentStore;
use crate::error::{RegistryError, Result};
use crate::manifest::ManifestStore;
use crate::paths;
use crate::reconciler::Reconciler;
use crate::record::ProjectRecord;

/// High-level operations over the project registry.
#[derive(Clone)]
pub struct ProjectService {
    documents: DocumentStore,
    manifest: ManifestStore,
    reconciler: Reconciler,
}

impl std::fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectService").finish_non_exhaustive()
    }
}

fn require(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RegistryError::validation(message)),
    }
}

impl ProjectService {
    /// Creates a service over the given storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        let documents = DocumentStore::new(storage.clone());
        let manifest = ManifestStore::new(storage);
        let reconciler = Reconciler::new(manifest.clone(), documents.clone());
        Self {
            documents,
            manifest,
            reconciler,
        }
    }

    /// Creates a project document with raw `content` and registers it in the
    /// manifest. Returns the document file name.
    ///
    /// The document write is an upsert; the manifest entry is insert-only,
    /// so repeat creates overwrite content but never touch existing metadata.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `file` or `content` is absent or
    /// empty, or a storage error if a write fails.
    pub async fn create(
        &self,
        folder: Option<String>,
        name: Option<String>,
        file: Option<String>,
        content: Option<String>,
    ) -> Result<String> {
        const REQUIRED: &str = "file and content are required";
        let file = require(file, REQUIRED)?;
        let content = require(content, REQUIRED)?;

        self.documents.write(&file, Bytes::from(content)).await?;
        self.register(folder, name, file.clone()).await?;
        Ok(file)
    }

    /// Serializes `payload` as formatted JSON, writes it as the document
    /// named `file_name`, and registers it in the manifest using `project`
    /// as the candidate display name. Returns the relative document path.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `file_name` or `payload` is absent,
    /// or a storage error if a write fails.
    pub async fn save(
        &self,
        folder: Option<String>,
        project: Option<String>,
        file_name: Option<String>,
        payload: Option<serde_json::Value>,
    ) -> Result<String> {
        const REQUIRED: &str = "fileName and payload are required";
        let file = require(file_name, REQUIRED)?;
        let payload = match payload {
            Some(value) if !value.is_null() => value,
            _ => return Err(RegistryError::validation(REQUIRED)),
        };

        let json =
            serde_json::to_vec_pretty(&payload).map_err(|e| RegistryError::Serialization {
                message: format!("failed to serialize payload: {e}"),
            })?;
        self.documents.write(&file, Bytes::from(json)).await?;
        self.register(folder, project, file.clone()).await?;
        Ok(paths::document_path(&file))
    }

    /// Appends a manifest entry for `file` unless one already exists.
    async fn register(
        &self,
        folder: Option<String>,
        name: Option<String>,
        file: String,
    ) -> Result<()> {
        let mut index = self.manifest.load_or_default().await;
        if index.ensure_entry(ProjectRecord::new(folder, name, file.clone())) {
            self.manifest.save(&index).await?;
            tracing::info!(file = %file, "registered project in manifest");
        } else {
            tracing::debug!(file = %file, "manifest entry exists; document content overwritten");
        }
        Ok(())
    }

    /// Deletes the document named `file` and removes its manifest entries.
    ///
    /// Document absence is not an error. If the manifest cannot be loaded or
    /// saved, the bookkeeping step is skipped and logged; the deletion still
    /// succeeds. Returns the file name.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `file` is absent or invalid, or a
    /// storage error if the document removal itself fails.
    pub async fn delete(&self, file: Option<String>) -> Result<String> {
        let file = require(file, "file is required")?;

        self.documents.delete(&file).await?;

        match self.manifest.load().await {
            Ok(mut index) => {
                if index.remove_file(&file) > 0 {
                    if let Err(e) = self.manifest.save(&index).await {
                        tracing::warn!(
                            file = %file,
                            error = %e,
                            "failed to save manifest after delete"
                        );
                    } else {
                        tracing::info!(file = %file, "removed project from manifest");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    file = %file,
                    error = %e,
                    "manifest unreadable; skipping manifest update for delete"
                );
            }
        }

        Ok(file)
    }

    /// Returns the reconciled project listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the document listing fails.
    pub async fn list(&self) -> Result<Vec<ProjectRecord>> {
        self.reconciler.list_projects().await
    }

    /// Returns the distinct non-empty folder values from the manifest.
    pub async fn folders(&self) -> Vec<String> {
        self.manifest.load_or_default().await.folders()
    }
}
