//! Project records and the manifest index.
//!
//! A [`ProjectRecord`] describes one stored document; `file` is the primary
//! key within the manifest. Optional metadata defaults are applied when a
//! record is constructed or when a loaded index is normalized, not scattered
//! across read sites.

use serde::{Deserialize, Serialize};

/// Folder assigned to records created without an explicit folder.
pub const DEFAULT_FOLDER: &str = "sandbox";

/// Derives a display name from a document file name by stripping a trailing
/// `.json` suffix.
#[must_use]
pub fn display_name(file: &str) -> String {
    file.strip_suffix(".json").unwrap_or(file).to_string()
}

/// One manifest entry describing a stored project document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Category/grouping label.
    #[serde(default)]
    pub folder: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Document file name; unique within the manifest.
    #[serde(default)]
    pub file: String,
}

impl ProjectRecord {
    /// Creates a record for `file`, defaulting `folder` and `name` when absent
    /// or empty.
    #[must_use]
    pub fn new(folder: Option<String>, name: Option<String>, file: String) -> Self {
        let mut record = Self {
            folder: folder.unwrap_or_default(),
            name: name.unwrap_or_default(),
            file,
        };
        record.normalize();
        record
    }

    /// Applies metadata defaults in place: empty `folder` becomes
    /// [`DEFAULT_FOLDER`], empty `name` becomes the file name minus `.json`.
    pub fn normalize(&mut self) {
        if self.folder.is_empty() {
            self.folder = DEFAULT_FOLDER.to_string();
        }
        if self.name.is_empty() {
            self.name = display_name(&self.file);
        }
    }
}

/// Ordered sequence of project records, persisted as a single JSON array.
///
/// Insertion order is preserved. The index guarantees at most one record per
/// distinct `file` value; membership operations key on `file` equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestIndex {
    records: Vec<ProjectRecord>,
}

impl ManifestIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records in manifest order.
    #[must_use]
    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    /// Consumes the index, returning the records in manifest order.
    #[must_use]
    pub fn into_records(self) -> Vec<ProjectRecord> {
        self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if a record with the given `file` exists.
    #[must_use]
    pub fn contains_file(&self, file: &str) -> bool {
        self.records.iter().any(|r| r.file == file)
    }

    /// Appends `record` unless an entry with the same `file` already exists.
    ///
    /// Existing entries are never updated; repeat writes to the same `file`
    /// leave the manifest untouched. Returns true if the record was inserted.
    pub fn ensure_entry(&mut self, record: ProjectRecord) -> bool {
        if self.contains_file(&record.file) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Removes every record matching `file`, returning how many were removed.
    pub fn remove_file(&mut self, file: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.file != file);
        before - self.records.len()
    }

    /// Normalizes a loaded index: applies metadata defaults to every record,
    /// drops records with an empty `file`, and deduplicates by `file` keeping
    /// the first occurrence.
    ///
    /// Hand-edited manifests may violate these invariants on disk; loading
    /// re-establishes them before any logic runs against the index.
    pub fn normalize(&mut self) {
        self.records.retain(|r| !r.file.is_empty());
        for record in &mut self.records {
            record.normalize();
        }

        let mut seen = std::collections::HashSet::new();
        self.records.retain(|r| seen.insert(r.file.clone()));
    }

    /// Returns the distinct non-empty `folder` values in first-seen order.
    #[must_use]
    pub fn folders(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .filter(|r| !r.folder.is_empty())
            .filter(|r| seen.insert(r.folder.clone()))
            .map(|r| r.folder.clone())
            .collect()
    }
}
