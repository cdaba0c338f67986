//! Read → patch → write flows over a [`DocumentStore`].

use std::fmt;

use docpatch_core::{apply, Patch, PatchError, PatchOutcome, Patched};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::store::DocumentStore;

/// Whether computed changes are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Write,
    DryRun,
}

/// Read `name` and compute the patched content without writing anything.
pub fn plan_patch(store: &impl DocumentStore, name: &str, patch: &Patch) -> Result<Patched> {
    let text = store.read(name)?;
    apply(&text, patch).map_err(|e| match e {
        PatchError::AnchorNotFound { anchor } => Error::PatchAnchorNotFound {
            name: name.to_string(),
            anchor,
        },
        other => Error::InvalidPatch(other),
    })
}

/// Apply `patch` to the stored document `name`.
///
/// The document is rewritten only when the patch was actually applied; a
/// missing anchor leaves it untouched.
pub fn patch_document(
    store: &impl DocumentStore,
    name: &str,
    patch: &Patch,
    mode: Mode,
) -> Result<PatchOutcome> {
    let patched = plan_patch(store, name, patch)?;

    match patched.outcome {
        PatchOutcome::AlreadyApplied => {
            debug!(document = name, marker = patch.marker(), "marker present, skipping");
        }
        PatchOutcome::Applied if mode == Mode::DryRun => {
            debug!(document = name, "dry run, not writing");
        }
        PatchOutcome::Applied => {
            store.write(name, &patched.content)?;
            info!(document = name, "patch applied");
        }
    }

    Ok(patched.outcome)
}

/// Write a fresh document, replacing any previous content.
pub fn create_document(
    store: &impl DocumentStore,
    name: &str,
    content: &str,
    mode: Mode,
) -> Result<()> {
    if mode == Mode::DryRun {
        crate::store::validate_name(name)?;
        debug!(document = name, "dry run, not creating");
        return Ok(());
    }
    store.write(name, content)?;
    info!(document = name, bytes = content.len(), "document created");
    Ok(())
}

/// What happened to one manifest entry.
#[derive(Debug)]
pub enum Action {
    Expanded,
    AlreadyExpanded,
    Created,
    /// Dry run: the patch would have been applied.
    WouldExpand,
    /// Dry run: the document would have been written.
    WouldCreate,
    Failed(Error),
}

#[derive(Debug)]
pub struct EntryReport {
    pub document: String,
    pub action: Action,
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Action::Expanded => write!(f, "expanded {}", self.document),
            Action::AlreadyExpanded => write!(f, "already expanded {}", self.document),
            Action::Created => write!(f, "created {}", self.document),
            Action::WouldExpand => write!(f, "would expand {}", self.document),
            Action::WouldCreate => write!(f, "would create {}", self.document),
            Action::Failed(e) => write!(f, "failed {}: {}", self.document, e.chain()),
        }
    }
}

/// Outcome of a manifest run, one entry per patch and document in order.
#[derive(Debug, Default)]
pub struct Report {
    pub entries: Vec<EntryReport>,
}

impl Report {
    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.action, Action::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries
            .iter()
            .filter(|e| matches!(e.action, Action::Failed(_)))
    }
}

/// Run every patch, then every fresh document.
///
/// Entries are independent: a failure is recorded and the run moves on.
pub fn run_manifest(store: &impl DocumentStore, manifest: &Manifest, mode: Mode) -> Report {
    let mut report = Report::default();

    for entry in &manifest.patches {
        let action = match patch_document(store, &entry.document, &entry.patch, mode) {
            Ok(PatchOutcome::Applied) if mode == Mode::DryRun => Action::WouldExpand,
            Ok(PatchOutcome::Applied) => Action::Expanded,
            Ok(PatchOutcome::AlreadyApplied) => Action::AlreadyExpanded,
            Err(e) => {
                warn!(document = %entry.document, error = %e.chain(), "patch failed");
                Action::Failed(e)
            }
        };
        report.entries.push(EntryReport {
            document: entry.document.clone(),
            action,
        });
    }

    for doc in &manifest.documents {
        let action = match create_document(store, &doc.name, &doc.content, mode) {
            Ok(()) if mode == Mode::DryRun => Action::WouldCreate,
            Ok(()) => Action::Created,
            Err(e) => {
                warn!(document = %doc.name, error = %e.chain(), "create failed");
                Action::Failed(e)
            }
        };
        report.entries.push(EntryReport {
            document: doc.name.clone(),
            action,
        });
    }

    report
}
