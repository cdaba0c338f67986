//! docpatch — Idempotent Document Patcher
//!
//! This crate provides the document store, manifest loading and run logic for
//! the `docpatch` and `docgen` CLIs. The text transformation itself lives in
//! `docpatch-core`.

mod error;
pub mod manifest;
pub mod run;
pub mod store;

#[cfg(feature = "pyo3")]
mod python;

pub use docpatch_core::{apply, Patch, PatchError, PatchOutcome, Patched};
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use run::{create_document, patch_document, plan_patch, run_manifest, Mode, Report};
pub use store::{DocumentStore, FsStore, MemoryStore};
