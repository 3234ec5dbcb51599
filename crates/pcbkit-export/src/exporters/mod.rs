//! Artifact writers.
//!
//! Every exporter renders its output fully in memory and only then touches
//! the filesystem, so a failure before the write phase leaves no files.

pub mod gerber;
pub mod pdf;
pub mod pnp;
pub mod step;

pub use gerber::GerberExporter;
pub use pdf::export_pdf;
pub use pnp::export_pnp;
pub use step::{export_step, STEP_MILESTONES};

use crate::board::Board;
use pcbkit_core::ExportError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub(crate) fn ensure_ready(board: &Board) -> Result<(), ExportError> {
    if !board.is_expanded() {
        return Err(ExportError::generation(format!(
            "board '{}' has not been expanded",
            board.name
        )));
    }
    if !board.is_ready() {
        return Err(ExportError::generation(format!(
            "planes of board '{}' are out of date",
            board.name
        )));
    }
    Ok(())
}

/// Writes `contents`, creating parent directories. A partially written
/// file is removed.
pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ExportError::generation(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
    }
    if let Err(e) = std::fs::write(path, contents) {
        remove_quietly(path);
        return Err(ExportError::generation(format!(
            "cannot write {}: {}",
            path.display(),
            e
        )));
    }
    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Removes files written by an export that failed later on.
pub(crate) fn cleanup(paths: &[PathBuf]) {
    for path in paths {
        remove_quietly(path);
    }
}

fn remove_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}
