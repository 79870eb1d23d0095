//! Shared test utilities for the thumb-regen test suite.
//!
//! Provides fixture builders for assets and metadata, plus in-memory or
//! misbehaving implementations of the storage and catalog seams.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let original = touch(tmp.path(), "photo.jpg");
//! let catalog = MemoryCatalog::with(vec![asset(42, "image/jpeg", "photo.jpg")]);
//! ```

use crate::catalog::{Catalog, CatalogError};
use crate::storage::{FileStore, LocalFs};
use crate::types::{Asset, AssetId, AttachmentMetadata, SizeEntry};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

// =========================================================================
// Fixture builders
// =========================================================================

/// Create an empty file and return its path.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

/// Metadata with one size entry per `(name, file, width, height)` tuple.
pub fn metadata_with_sizes(sizes: &[(&str, &str, u32, u32)]) -> AttachmentMetadata {
    AttachmentMetadata {
        sizes: sizes
            .iter()
            .map(|(name, file, width, height)| {
                (
                    name.to_string(),
                    SizeEntry {
                        file: file.to_string(),
                        width: *width,
                        height: *height,
                        mime_type: None,
                    },
                )
            })
            .collect(),
        ..Default::default()
    }
}

/// An asset with a recorded attachment path and empty metadata.
pub fn asset(id: AssetId, mime_type: &str, attached_file: &str) -> Asset {
    Asset {
        id,
        mime_type: mime_type.to_string(),
        attached_file: Some(attached_file.to_string()),
        metadata: AttachmentMetadata::default(),
    }
}

// =========================================================================
// Storage doubles
// =========================================================================

/// Local filesystem whose deletes report success but never happen.
///
/// Models object-storage mounts that acknowledge a delete they did not apply.
/// Every call is logged by name so tests can assert on ordering.
#[derive(Default)]
pub struct StubbornFs {
    ops: Mutex<Vec<String>>,
}

impl StubbornFs {
    pub fn log(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: &str) {
        self.ops.lock().unwrap().push(op.to_string());
    }
}

impl FileStore for StubbornFs {
    fn exists(&self, path: &Path) -> bool {
        self.record("exists");
        LocalFs.exists(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        self.record("list_dir");
        LocalFs.list_dir(dir)
    }

    fn remove(&self, _path: &Path) -> io::Result<()> {
        self.record("remove");
        Ok(())
    }

    fn invalidate(&self, _path: &Path) {
        self.record("invalidate");
    }
}

// =========================================================================
// Catalog doubles
// =========================================================================

/// In-memory [`Catalog`] that counts metadata writes.
#[derive(Default)]
pub struct MemoryCatalog {
    assets: Mutex<BTreeMap<AssetId, Asset>>,
    writes: AtomicUsize,
    /// When set, every `write_metadata` call fails.
    pub fail_writes: bool,
}

impl MemoryCatalog {
    pub fn with(assets: Vec<Asset>) -> Self {
        Self {
            assets: Mutex::new(assets.into_iter().map(|a| (a.id, a)).collect()),
            ..Default::default()
        }
    }

    pub fn get(&self, id: AssetId) -> Asset {
        self.assets.lock().unwrap()[&id].clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Catalog for MemoryCatalog {
    fn asset(&self, id: AssetId) -> Result<Option<Asset>, CatalogError> {
        Ok(self.assets.lock().unwrap().get(&id).cloned())
    }

    fn write_metadata(
        &self,
        id: AssetId,
        metadata: &AttachmentMetadata,
    ) -> Result<(), CatalogError> {
        if self.fail_writes {
            return Err(CatalogError::Io(io::Error::other("catalog is read-only")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut assets = self.assets.lock().unwrap();
        let asset = assets.get_mut(&id).ok_or(CatalogError::UnknownAsset(id))?;
        asset.metadata = metadata.clone();
        Ok(())
    }

    fn asset_ids(&self) -> Result<Vec<AssetId>, CatalogError> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.mime().is_eligible())
            .map(|a| a.id)
            .collect())
    }
}
