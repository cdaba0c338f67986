use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::{DocumentStore, Error, FsStore, Mode, Patch, PatchOutcome};

fn to_py_err(e: Error) -> PyErr {
    match e {
        Error::NotFound { .. } => PyFileNotFoundError::new_err(e.chain()),
        Error::Read { .. } | Error::WriteFailure { .. } => PyIOError::new_err(e.chain()),
        other => PyValueError::new_err(other.chain()),
    }
}

fn build_patch(anchor: &str, addition: &str, marker: &str) -> PyResult<Patch> {
    Patch::new(anchor, addition, marker).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Returns `(new_text, applied)`.
#[pyfunction]
fn apply_patch(text: &str, anchor: &str, addition: &str, marker: &str) -> PyResult<(String, bool)> {
    let patch = build_patch(anchor, addition, marker)?;
    let res = crate::apply(text, &patch).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let applied = res.applied();
    Ok((res.content, applied))
}

#[pyfunction]
#[pyo3(signature = (base, name, anchor, addition, marker, dry_run = false))]
fn patch_file(
    base: &str,
    name: &str,
    anchor: &str,
    addition: &str,
    marker: &str,
    dry_run: bool,
) -> PyResult<bool> {
    let patch = build_patch(anchor, addition, marker)?;
    let store = FsStore::new(base);
    let mode = if dry_run { Mode::DryRun } else { Mode::Write };
    let outcome = crate::patch_document(&store, name, &patch, mode).map_err(to_py_err)?;
    Ok(outcome == PatchOutcome::Applied)
}

#[pyfunction]
fn write_document(base: &str, name: &str, content: &str) -> PyResult<()> {
    FsStore::new(base).write(name, content).map_err(to_py_err)
}

#[pymodule]
fn docpatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(apply_patch, m)?)?;
    m.add_function(wrap_pyfunction!(patch_file, m)?)?;
    m.add_function(wrap_pyfunction!(write_document, m)?)?;
    Ok(())
}
