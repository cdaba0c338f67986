//! Named document storage.
//!
//! A store resolves document names against a base location supplied by the
//! caller. [`FsStore`] persists to disk; [`MemoryStore`] keeps everything in a
//! map and is used by tests and embedders.

mod fs;
mod memory;

use std::path::{Component, Path};

use crate::error::{Error, Result};

pub use fs::FsStore;
pub use memory::MemoryStore;

pub trait DocumentStore {
    /// Read the full text of a document.
    /// Returns `Error::NotFound` if it does not exist.
    fn read(&self, name: &str) -> Result<String>;

    /// Replace (or create) a document with `text`.
    /// Implementations must never leave a partially written document behind.
    fn write(&self, name: &str, text: &str) -> Result<()>;
}

/// Reject names that would escape the base location.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let invalid = || Error::InvalidName {
        name: name.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid());
    }

    let mut has_file = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid())
            }
        }
    }

    if has_file {
        Ok(())
    } else {
        Err(invalid())
    }
}
