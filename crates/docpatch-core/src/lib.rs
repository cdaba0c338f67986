//! docpatch — Idempotent Document Patcher (core library)
//!
//! This crate provides the pure text transformation behind the `docpatch` and
//! `docgen` CLIs: insert a block before an anchor unless the block's marker is
//! already present.

mod patch;

pub use patch::{apply, Patch, PatchOutcome, Patched};

/// Library error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Neither the marker nor the anchor occurs in the document.
    #[error("anchor not found: {anchor:?}")]
    AnchorNotFound { anchor: String },

    #[error("invalid patch: anchor is empty")]
    EmptyAnchor,

    #[error("invalid patch: marker is empty")]
    EmptyMarker,

    /// Without the marker inside the addition a second run could not tell the
    /// patch was already applied.
    #[error("invalid patch: marker {marker:?} does not occur in the addition")]
    MarkerNotInAddition { marker: String },

    /// The marker would be found in every document the patch can apply to.
    #[error("invalid patch: marker {marker:?} occurs in the anchor")]
    MarkerInAnchor { marker: String },
}
