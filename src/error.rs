use std::io;
use std::path::PathBuf;

use docpatch_core::PatchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("document not found: {name}")]
    NotFound { name: String },

    #[error("failed to read {name}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("binary file rejected (NUL byte found): {name}")]
    Binary { name: String },

    #[error("non-UTF8 file rejected: {name}")]
    NotUtf8 { name: String },

    #[error("failed to write {name}")]
    WriteFailure {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid document name {name:?}: must be relative and stay inside the base directory")]
    InvalidName { name: String },

    /// The document no longer has the shape the patch expects.
    #[error("cannot patch {name}: anchor not found: {anchor:?}")]
    PatchAnchorNotFound { name: String, anchor: String },

    #[error(transparent)]
    InvalidPatch(#[from] PatchError),

    #[error("invalid manifest {}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read manifest source {}", .path.display())]
    ManifestSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}

impl Error {
    /// Errors caused by the request rather than the filesystem.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::PatchAnchorNotFound { .. }
                | Error::InvalidPatch(_)
                | Error::InvalidName { .. }
                | Error::Manifest { .. }
                | Error::InvalidManifest(_)
        )
    }

    /// The message followed by every underlying cause.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(e) = cause {
            out.push_str(": ");
            out.push_str(&e.to_string());
            cause = std::error::Error::source(e);
        }
        out
    }
}

pub type Result<T> = std::result::Result<T, Error>;
