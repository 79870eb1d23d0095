//! Derived-file eraser.
//!
//! Deletes one derivative and its compressed sibling, then checks that the
//! derivative is really gone. Some storage backends (object-storage mounts in
//! particular) acknowledge a delete without applying it, so the outcome comes
//! from a fresh existence check and never from the delete call alone.

use crate::storage::FileStore;
use crate::types::{DerivedFile, SizeKey};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Whether a derivative is verified gone after an erase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseOutcome {
    Deleted,
    DeleteError,
}

/// A derivative that could not be removed. Recorded against its size; never
/// aborts the asset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not delete {}: {reason}", .path.display())]
pub struct DeleteError {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of erasing one derivative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erasure {
    pub key: SizeKey,
    pub path: PathBuf,
    pub outcome: EraseOutcome,
    pub error: Option<DeleteError>,
}

/// Delete `file` (and its `.webp` sibling) and classify the result.
pub fn erase(files: &dyn FileStore, file: &DerivedFile) -> Erasure {
    let remove_result = files.remove(&file.path);
    if let Err(e) = &remove_result {
        debug!("delete of {} reported: {}", file.path.display(), e);
    }

    if let Some(sibling) = &file.sibling
        && files.exists(sibling)
        && let Err(e) = files.remove(sibling)
    {
        warn!("could not delete sibling {}: {}", sibling.display(), e);
    }

    files.invalidate(&file.path);
    if files.exists(&file.path) {
        let reason = match remove_result {
            Err(e) => e.to_string(),
            Ok(()) => "file still present after delete".to_string(),
        };
        let error = DeleteError {
            path: file.path.clone(),
            reason,
        };
        warn!(size = %file.key, "{}", error);
        Erasure {
            key: file.key,
            path: file.path.clone(),
            outcome: EraseOutcome::DeleteError,
            error: Some(error),
        }
    } else {
        debug!(size = %file.key, "deleted {}", file.path.display());
        Erasure {
            key: file.key,
            path: file.path.clone(),
            outcome: EraseOutcome::Deleted,
            error: None,
        }
    }
}
