//! # atelier-core
//!
//! Core abstractions for the atelier project registry.
//!
//! This crate provides the foundational types used by the registry and API
//! layers:
//!
//! - **Storage Backend**: an abstract key/value file interface with local
//!   filesystem and in-memory implementations
//! - **Error Types**: shared error definitions and result types
//! - **Observability**: logging initialization helpers

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod observability;
pub mod storage;

pub use error::{Error, Result};
pub use observability::{init_logging, LogFormat};
pub use storage::{LocalDirBackend, MemoryBackend, StorageBackend};
