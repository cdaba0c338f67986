//! Generation manifests.
//!
//! A manifest lists the patches to apply to existing documents and the fresh
//! documents to write. Large text blocks may live in separate files referenced
//! by `addition_source` / `source`, resolved relative to the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use docpatch_core::Patch;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    patches: Vec<RawPatch>,
    #[serde(default)]
    documents: Vec<RawDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPatch {
    document: String,
    anchor: String,
    marker: String,
    addition: Option<String>,
    addition_source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    name: String,
    content: Option<String>,
    source: Option<PathBuf>,
}

/// A patch bound to the document it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    pub document: String,
    pub patch: Patch,
}

/// A document to be written from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub patches: Vec<PatchEntry>,
    pub documents: Vec<DocumentEntry>,
}

impl Manifest {
    /// Load a manifest file; sources resolve against its parent directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ManifestSource {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, path, dir)
    }

    /// Parse manifest JSON. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path, dir: &Path) -> Result<Self> {
        let raw: RawManifest = serde_json::from_str(text).map_err(|source| Error::Manifest {
            path: origin.to_path_buf(),
            source,
        })?;

        let patches = raw
            .patches
            .into_iter()
            .map(|p| -> Result<PatchEntry> {
                let addition = inline_or_source(
                    p.addition,
                    p.addition_source,
                    dir,
                    &format!("patch for {}", p.document),
                    "addition",
                )?;
                Ok(PatchEntry {
                    patch: Patch::new(p.anchor, addition, p.marker)?,
                    document: p.document,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let documents = raw
            .documents
            .into_iter()
            .map(|d| -> Result<DocumentEntry> {
                let content = inline_or_source(
                    d.content,
                    d.source,
                    dir,
                    &format!("document {}", d.name),
                    "content",
                )?;
                Ok(DocumentEntry {
                    name: d.name,
                    content,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patches, documents })
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.documents.is_empty()
    }
}

fn inline_or_source(
    inline: Option<String>,
    source: Option<PathBuf>,
    dir: &Path,
    what: &str,
    field: &str,
) -> Result<String> {
    match (inline, source) {
        (Some(text), None) => Ok(text),
        (None, Some(rel)) => {
            let path = dir.join(rel);
            fs::read_to_string(&path).map_err(|source| Error::ManifestSource { path, source })
        }
        (Some(_), Some(_)) => Err(Error::InvalidManifest(format!(
            "{what}: give either {field} or its source file, not both"
        ))),
        (None, None) => Err(Error::InvalidManifest(format!(
            "{what}: missing {field}"
        ))),
    }
}
