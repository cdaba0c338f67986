use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use tracing::debug;

use super::{validate_name, DocumentStore};
use crate::error::{Error, Result};

/// Documents stored as files under a base directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Absolute location of `name`, after validating it.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.base.join(name))
    }
}

impl DocumentStore for FsStore {
    fn read(&self, name: &str) -> Result<String> {
        let path = self.path_of(name)?;
        debug!(path = %path.display(), "reading document");

        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                name: name.to_string(),
            },
            _ => Error::Read {
                name: name.to_string(),
                source: e,
            },
        })?;

        if is_binary(&bytes) {
            return Err(Error::Binary {
                name: name.to_string(),
            });
        }

        String::from_utf8(bytes).map_err(|_| Error::NotUtf8 {
            name: name.to_string(),
        })
    }

    fn write(&self, name: &str, text: &str) -> Result<()> {
        let path = self.path_of(name)?;
        debug!(path = %path.display(), bytes = text.len(), "writing document");

        let write_failure = |source| Error::WriteFailure {
            name: name.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(write_failure)?;
            }
        }

        write_atomic(&path, text).map_err(write_failure)
    }
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| b == 0)
}

/// Write `content` to a sibling temp file, sync it, then rename it over `path`.
///
/// Existing permissions on `path` are carried over. The temp file is removed if
/// any step fails, the rename included.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    let perms = fs::metadata(path).map(|m| m.permissions()).ok();

    let pid = process::id();
    let mut attempt: u64 = 0;
    let (tmp_path, mut file) = loop {
        let candidate = dir.join(format!(".{file_name}.docpatch.tmp.{pid}.{attempt}"));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(f) => break (candidate, f),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    let written = file
        .write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .and_then(|()| {
            if let Some(p) = perms {
                fs::set_permissions(&tmp_path, p)?;
            }
            Ok(())
        });
    drop(file);

    match written.and_then(|()| fs::rename(&tmp_path, path)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}
