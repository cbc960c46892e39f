//! Read-time reconciliation of manifest entries with stored documents.
//!
//! The reconciler computes the authoritative project listing by merging the
//! manifest index with the actual document set. It never mutates persisted
//! state: orphan documents are surfaced with synthesized metadata, stale
//! manifest entries are kept until an explicit delete removes them.

use std::collections::HashSet;

use crate::documents::DocumentStore;
use crate::error::Result;
use crate::manifest::ManifestStore;
use crate::record::ProjectRecord;

/// Merges manifest state with document-store reality for read operations.
#[derive(Clone)]
pub struct Reconciler {
    manifest: ManifestStore,
    documents: DocumentStore,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a reconciler over the given stores.
    #[must_use]
    pub fn new(manifest: ManifestStore, documents: DocumentStore) -> Self {
        Self {
            manifest,
            documents,
        }
    }

    /// Produces the authoritative project listing.
    ///
    /// Manifest entries come first, in manifest order, with their metadata
    /// preserved; documents missing from the manifest are appended as
    /// synthesized records in listing order. Entries whose document no longer
    /// exists are retained.
    ///
    /// # Errors
    ///
    /// Returns an error if the document listing fails. An unreadable manifest
    /// is treated as empty, not as an error.
    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        let index = self.manifest.load_or_default().await;
        let files = self.documents.list().await?;

        let known: HashSet<&str> = index.records().iter().map(|r| r.file.as_str()).collect();
        let present: HashSet<&str> = files.iter().map(String::as_str).collect();

        let stale = index
            .records()
            .iter()
            .filter(|r| !present.contains(r.file.as_str()))
            .count();
        let orphans: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|f| !known.contains(f))
            .collect();

        tracing::debug!(
            manifest_entries = index.len(),
            documents = files.len(),
            orphans = orphans.len(),
            stale,
            "reconciled project listing"
        );

        let orphans: Vec<String> = orphans.into_iter().map(ToString::to_string).collect();

        let mut records = index.into_records();
        records.extend(
            orphans
                .into_iter()
                .map(|file| ProjectRecord::new(None, None, file)),
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use bytes::Bytes;

    use atelier_core::{MemoryBackend, StorageBackend};

    use crate::paths;
    use crate::record::ManifestIndex;

    struct Fixture {
        backend: Arc<MemoryBackend>,
        reconciler: Reconciler,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(MemoryBackend::new());
        let manifest = ManifestStore::new(backend.clone());
        let documents = DocumentStore::new(backend.clone());
        Fixture {
            backend,
            reconciler: Reconciler::new(manifest, documents),
        }
    }

    async fn seed_manifest(backend: &MemoryBackend, index: &ManifestIndex) {
        backend
            .put(
                paths::MANIFEST_FILE,
                Bytes::from(serde_json::to_vec(index).unwrap()),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_state_lists_nothing() {
        let fx = fixture();
        assert!(fx.reconciler.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn orphan_documents_get_synthesized_records() {
        let fx = fixture();
        fx.backend
            .put("json/rogue.json", Bytes::from("{}"))
            .await
            .unwrap();

        let projects = fx.reconciler.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].folder, "sandbox");
        assert_eq!(projects[0].name, "rogue");
        assert_eq!(projects[0].file, "rogue.json");
    }

    #[tokio::test]
    async fn stale_manifest_entries_are_surfaced() {
        let fx = fixture();
        let mut index = ManifestIndex::new();
        index.ensure_entry(ProjectRecord::new(
            Some("demo".to_string()),
            Some("Gone".to_string()),
            "gone.json".to_string(),
        ));
        seed_manifest(&fx.backend, &index).await;

        let projects = fx.reconciler.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].file, "gone.json");
        assert_eq!(projects[0].name, "Gone");
    }

    #[tokio::test]
    async fn matched_entries_are_not_duplicated_and_keep_metadata() {
        let fx = fixture();
        let mut index = ManifestIndex::new();
        index.ensure_entry(ProjectRecord::new(
            Some("demo".to_string()),
            Some("Demo".to_string()),
            "demo.json".to_string(),
        ));
        seed_manifest(&fx.backend, &index).await;
        fx.backend
            .put("json/demo.json", Bytes::from("{}"))
            .await
            .unwrap();
        fx.backend
            .put("json/extra.json", Bytes::from("{}"))
            .await
            .unwrap();

        let projects = fx.reconciler.list_projects().await.unwrap();
        assert_eq!(projects.len(), 2);

        // Manifest entries come first and keep their hand-curated metadata.
        assert_eq!(projects[0].file, "demo.json");
        assert_eq!(projects[0].folder, "demo");

        let orphan_count = projects.iter().filter(|p| p.file == "extra.json").count();
        assert_eq!(orphan_count, 1);
    }

    #[tokio::test]
    async fn corrupt_manifest_still_lists_documents() {
        let fx = fixture();
        fx.backend
            .put(paths::MANIFEST_FILE, Bytes::from("{broken"))
            .await
            .unwrap();
        fx.backend
            .put("json/a.json", Bytes::from("{}"))
            .await
            .unwrap();

        let projects = fx.reconciler.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].file, "a.json");
    }
}
