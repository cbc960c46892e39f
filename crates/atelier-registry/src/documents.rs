//! Document file store.
//!
//! Thin wrapper that scopes all document I/O under the `json/` prefix of the
//! projects root and validates file names before they are used as path
//! components.

use std::sync::Arc;

use bytes::Bytes;

use atelier_core::StorageBackend;

use crate::error::{RegistryError, Result};
use crate::paths;

/// Reads, writes, lists, and deletes project documents.
#[derive(Clone)]
pub struct DocumentStore {
    storage: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("storage", &"<StorageBackend>")
            .finish()
    }
}

/// Validates a document file name for use as a single path component.
///
/// Names arrive from untrusted request bodies and are joined into storage
/// keys, so separators, traversal segments, and control characters are
/// rejected up front.
fn validate_file_name(file: &str) -> Result<()> {
    if file.is_empty() {
        return Err(RegistryError::validation("file name cannot be empty"));
    }
    if file.contains('/') || file.contains('\\') {
        return Err(RegistryError::validation(format!(
            "file name cannot contain path separators: {file}"
        )));
    }
    if file == "." || file == ".." {
        return Err(RegistryError::validation(format!(
            "file name cannot be a directory reference: {file}"
        )));
    }
    if file.contains('\n') || file.contains('\r') || file.contains('\0') {
        return Err(RegistryError::validation(
            "file name cannot contain control characters",
        ));
    }
    Ok(())
}

impl DocumentStore {
    /// Creates a document store over the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Writes `content` to the document named `file`, overwriting any
    /// existing document with that name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid file name, or a storage
    /// error if the write fails.
    pub async fn write(&self, file: &str, content: Bytes) -> Result<()> {
        validate_file_name(file)?;
        self.storage
            .put(&paths::document_path(file), content)
            .await?;
        Ok(())
    }

    /// Reads the document named `file`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the document is absent or unreadable.
    pub async fn read(&self, file: &str) -> Result<Bytes> {
        validate_file_name(file)?;
        Ok(self.storage.get(&paths::document_path(file)).await?)
    }

    /// Lists every document file name currently present.
    ///
    /// Returns an empty vec when the documents directory does not exist.
    /// Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the listing fails.
    pub async fn list(&self) -> Result<Vec<String>> {
        let keys = self.storage.list(paths::DOCUMENTS_PREFIX).await?;
        Ok(keys
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(paths::DOCUMENTS_PREFIX)
                    .map(ToString::to_string)
            })
            .collect())
    }

    /// Removes the document named `file` if present; absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid file name, or a storage
    /// error if the removal itself fails.
    pub async fn delete(&self, file: &str) -> Result<()> {
        validate_file_name(file)?;
        self.storage.delete(&paths::document_path(file)).await?;
        Ok(())
    }
}
