//! Shared types used across the regeneration pipeline.
//!
//! [`Asset`] and [`AttachmentMetadata`] mirror what the host catalog stores
//! for a media item. [`SizeKey`] and [`DerivedFile`] describe generated
//! thumbnails on disk and are rebuilt fresh for every asset.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Catalog identifier of a media asset.
pub type AssetId = u64;

/// Broad mime category used for eligibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Image,
    Pdf,
    Svg,
    Other,
}

impl MimeCategory {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/svg") {
            MimeCategory::Svg
        } else if mime.starts_with("image/") {
            MimeCategory::Image
        } else if mime == "application/pdf" {
            MimeCategory::Pdf
        } else {
            MimeCategory::Other
        }
    }

    /// Whether assets of this category can carry generated thumbnails at all.
    pub fn is_eligible(self) -> bool {
        matches!(self, MimeCategory::Image | MimeCategory::Pdf)
    }
}

/// A media item in the host catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub mime_type: String,
    /// Recorded attachment path, absolute or relative to the content root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_file: Option<String>,
    #[serde(default)]
    pub metadata: AttachmentMetadata,
}

impl Asset {
    pub fn mime(&self) -> MimeCategory {
        MimeCategory::from_mime(&self.mime_type)
    }
}

/// One generated size as recorded in metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeEntry {
    /// File name, relative to the original file's directory.
    pub file: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl SizeEntry {
    pub fn key(&self) -> SizeKey {
        SizeKey::new(self.width, self.height)
    }
}

/// Attachment metadata record, read-modify-written by the regeneration step.
///
/// Keys this crate does not understand are kept in `extra` so a write-back
/// never drops data owned by other parts of the host platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    /// Working file path relative to the content root.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Generated sizes keyed by size name (`thumbnail`, `medium`, ...).
    #[serde(default)]
    pub sizes: BTreeMap<String, SizeEntry>,
    /// Unscaled source file name when the working file is a downscaled copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AttachmentMetadata {
    /// Dimension keys of every recorded size.
    pub fn size_keys(&self) -> BTreeSet<SizeKey> {
        self.sizes.values().map(SizeEntry::key).collect()
    }
}

/// Canonical key of a derived size: its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SizeKey {
    pub width: u32,
    pub height: u32,
}

impl SizeKey {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for SizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A generated thumbnail found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFile {
    pub key: SizeKey,
    pub path: PathBuf,
    /// `<path>.webp` companion written by compression tooling, if present.
    pub sibling: Option<PathBuf>,
}

/// Join a list of size keys for display: `150x150, 300x200`.
pub fn join_keys<'a>(keys: impl IntoIterator<Item = &'a SizeKey>) -> String {
    keys.into_iter()
        .map(SizeKey::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
