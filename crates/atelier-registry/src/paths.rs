//! Storage layout for the projects root.
//!
//! All registry state lives below a single configurable root directory;
//! the key layout is defined here and nowhere else.

/// Manifest index file name, relative to the projects root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory prefix holding the project documents.
pub const DOCUMENTS_PREFIX: &str = "json/";

/// Returns the storage key for a document file name.
#[must_use]
pub fn document_path(file: &str) -> String {
    format!("{DOCUMENTS_PREFIX}{file}")
}
