//! Original-file path resolution.
//!
//! An asset's working file can be recorded in several places, and older or
//! migrated records are not always consistent. [`ContentRootResolver`] tries
//! each candidate in a fixed order and returns the first one that exists:
//!
//! 1. `attached_file` as recorded (absolute paths only)
//! 2. `attached_file` under the content root
//! 3. `metadata.file` under the content root
//! 4. the base name of either, directly under the content root
//!
//! No candidate existing is a normal "not found" (`None`), not an error.

use crate::storage::FileStore;
use crate::types::Asset;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait PathResolver {
    fn resolve(&self, asset: &Asset) -> Option<PathBuf>;
}

pub struct ContentRootResolver<'a> {
    content_root: PathBuf,
    files: &'a dyn FileStore,
}

impl<'a> ContentRootResolver<'a> {
    pub fn new(content_root: &Path, files: &'a dyn FileStore) -> Self {
        Self {
            content_root: content_root.to_path_buf(),
            files,
        }
    }

    /// Every candidate path in fallback order. May contain duplicates.
    pub fn candidates(&self, asset: &Asset) -> Vec<PathBuf> {
        let recorded = asset.attached_file.as_deref().filter(|f| !f.is_empty());
        let embedded = Some(asset.metadata.file.as_str()).filter(|f| !f.is_empty());
        let mut candidates = Vec::new();

        if let Some(recorded) = recorded {
            let path = Path::new(recorded);
            if path.is_absolute() {
                candidates.push(path.to_path_buf());
            }
            candidates.push(self.content_root.join(path.strip_prefix("/").unwrap_or(path)));
        }
        if let Some(embedded) = embedded {
            candidates.push(self.content_root.join(embedded));
        }
        for name in [recorded, embedded]
            .into_iter()
            .flatten()
            .filter_map(|f| Path::new(f).file_name())
        {
            candidates.push(self.content_root.join(name));
        }
        candidates
    }
}

impl PathResolver for ContentRootResolver<'_> {
    fn resolve(&self, asset: &Asset) -> Option<PathBuf> {
        let found = self
            .candidates(asset)
            .into_iter()
            .find(|p| self.files.exists(p));
        if found.is_none() {
            debug!(asset_id = asset.id, "no original file found");
        }
        found
    }
}
