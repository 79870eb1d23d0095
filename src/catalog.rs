//! Asset catalog: where assets and their metadata records live.
//!
//! The regeneration core only needs three things from the host catalog: look
//! up an asset, write its metadata back, and list candidate ids for a batch.
//! Those are the [`Catalog`] trait.
//!
//! [`JsonCatalog`] is the file-backed implementation the CLI uses:
//!
//! ```json
//! {
//!   "version": 1,
//!   "assets": {
//!     "42": {
//!       "id": 42,
//!       "mime_type": "image/jpeg",
//!       "attached_file": "2024/05/photo-scaled.jpg",
//!       "metadata": { "file": "2024/05/photo-scaled.jpg", "sizes": { ... } }
//!     }
//!   }
//! }
//! ```
//!
//! Writes go to a temporary file that is then renamed over the catalog, so an
//! interrupted write never leaves a truncated catalog behind.

use crate::types::{Asset, AssetId, AttachmentMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Version of the catalog file format.
const CATALOG_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported catalog version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("asset {0} not found")]
    UnknownAsset(AssetId),
}

pub trait Catalog {
    /// Look up an asset. `Ok(None)` when the id is unknown.
    fn asset(&self, id: AssetId) -> Result<Option<Asset>, CatalogError>;

    /// Replace the metadata record of an asset.
    fn write_metadata(&self, id: AssetId, metadata: &AttachmentMetadata)
    -> Result<(), CatalogError>;

    /// Ids of every asset that may carry thumbnails (images and PDFs).
    fn asset_ids(&self) -> Result<Vec<AssetId>, CatalogError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    assets: BTreeMap<AssetId, Asset>,
}

/// [`Catalog`] stored as one JSON file.
#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    assets: Mutex<BTreeMap<AssetId, Asset>>,
}

impl JsonCatalog {
    /// Load the catalog at `path`. A missing file is an empty catalog.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let assets = match std::fs::read_to_string(path) {
            Ok(content) => {
                let file: CatalogFile = serde_json::from_str(&content)?;
                if file.version != CATALOG_VERSION {
                    return Err(CatalogError::Version {
                        found: file.version,
                        expected: CATALOG_VERSION,
                    });
                }
                file.assets
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            assets: Mutex::new(assets),
        })
    }

    /// Add or replace an asset and persist the catalog.
    pub fn insert(&self, asset: Asset) -> Result<(), CatalogError> {
        let mut assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        assets.insert(asset.id, asset);
        save(&self.path, &assets)
    }
}

/// Serialize the catalog next to its final location, then rename into place.
fn save(path: &Path, assets: &BTreeMap<AssetId, Asset>) -> Result<(), CatalogError> {
    let file = CatalogFile {
        version: CATALOG_VERSION,
        assets: assets.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

impl Catalog for JsonCatalog {
    fn asset(&self, id: AssetId) -> Result<Option<Asset>, CatalogError> {
        let assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        Ok(assets.get(&id).cloned())
    }

    fn write_metadata(
        &self,
        id: AssetId,
        metadata: &AttachmentMetadata,
    ) -> Result<(), CatalogError> {
        let mut assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        let asset = assets.get_mut(&id).ok_or(CatalogError::UnknownAsset(id))?;
        asset.metadata = metadata.clone();
        save(&self.path, &assets)
    }

    fn asset_ids(&self) -> Result<Vec<AssetId>, CatalogError> {
        let assets = self.assets.lock().unwrap_or_else(|e| e.into_inner());
        Ok(assets
            .values()
            .filter(|a| a.mime().is_eligible())
            .map(|a| a.id)
            .collect())
    }
}
