use crate::PatchError;

/// An insertion of `addition` immediately before the first `anchor`, guarded by `marker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    anchor: String,
    addition: String,
    marker: String,
}

impl Patch {
    /// Build a patch, rejecting ones that could never be applied idempotently.
    pub fn new(
        anchor: impl Into<String>,
        addition: impl Into<String>,
        marker: impl Into<String>,
    ) -> Result<Self, PatchError> {
        let anchor = anchor.into();
        let addition = addition.into();
        let marker = marker.into();

        if anchor.is_empty() {
            return Err(PatchError::EmptyAnchor);
        }
        if marker.is_empty() {
            return Err(PatchError::EmptyMarker);
        }
        if !addition.contains(&marker) {
            return Err(PatchError::MarkerNotInAddition { marker });
        }
        // The anchor must be present to insert, so a marker inside it would
        // always read as already applied.
        if anchor.contains(&marker) {
            return Err(PatchError::MarkerInAnchor { marker });
        }

        Ok(Self {
            anchor,
            addition,
            marker,
        })
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn addition(&self) -> &str {
        &self.addition
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

/// Whether `apply` inserted the addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    AlreadyApplied,
}

/// Result of applying a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    /// Full document content after the patch (unchanged when already applied).
    pub content: String,
    pub outcome: PatchOutcome,
}

impl Patched {
    pub fn applied(&self) -> bool {
        self.outcome == PatchOutcome::Applied
    }
}

/// Apply `patch` to `text`.
///
/// The marker is checked first: if it occurs anywhere, `text` is returned as-is.
/// Otherwise the addition is spliced in before the first occurrence of the anchor.
pub fn apply(text: &str, patch: &Patch) -> Result<Patched, PatchError> {
    if text.contains(patch.marker()) {
        return Ok(Patched {
            content: text.to_string(),
            outcome: PatchOutcome::AlreadyApplied,
        });
    }

    let at = text
        .find(patch.anchor())
        .ok_or_else(|| PatchError::AnchorNotFound {
            anchor: patch.anchor().to_string(),
        })?;

    let (prefix, rest) = text.split_at(at);
    let mut content = String::with_capacity(text.len() + patch.addition().len());
    content.push_str(prefix);
    content.push_str(patch.addition());
    content.push_str(rest);

    Ok(Patched {
        content,
        outcome: PatchOutcome::Applied,
    })
}
