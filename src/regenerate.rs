//! Regeneration driver.
//!
//! Picks the best source for an asset, runs the generator on it, and writes
//! the resulting metadata back to the catalog. Source preference:
//!
//! 1. whatever [`Hooks::source_override`](crate::hooks::Hooks::source_override)
//!    returns, if that file exists
//! 2. the unscaled `original_image`, unless the working file is an edited copy
//! 3. the working file itself
//!
//! An edited copy (`photo-e1700000000000.jpg`) carries the user's crop or
//! rotation, so regenerating from the unscaled upload would silently undo it.

use crate::hooks::Hooks;
use crate::naming;
use crate::process::{RegenError, Regenerator};
use crate::storage::FileStore;
use crate::types::{Asset, AttachmentMetadata};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Choose the file to generate derivatives from.
pub fn select_source(
    files: &dyn FileStore,
    hooks: &dyn Hooks,
    asset: &Asset,
    working: &Path,
) -> PathBuf {
    if let Some(path) = hooks.source_override(asset, working) {
        if files.exists(&path) {
            debug!(asset_id = asset.id, "source overridden: {}", path.display());
            return path;
        }
        debug!(
            asset_id = asset.id,
            "ignoring missing source override {}",
            path.display()
        );
    }

    let working_is_edit = working
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(naming::is_edited_copy);

    if !working_is_edit
        && let Some(unscaled) = asset.metadata.original_image.as_deref()
        && !unscaled.is_empty()
        && let Some(dir) = working.parent()
    {
        let path = dir.join(unscaled);
        if files.exists(&path) {
            return path;
        }
    }

    working.to_path_buf()
}

/// Regenerate every size of `asset` and persist the new metadata record.
pub fn regenerate(
    ctx: &Regenerator<'_>,
    asset: &Asset,
    original: &Path,
) -> Result<AttachmentMetadata, RegenError> {
    let source = select_source(ctx.files, ctx.hooks, asset, original);
    debug!(asset_id = asset.id, "generating from {}", source.display());

    let generated = ctx
        .generator
        .generate(asset.id, &asset.mime_type, &source)
        .map_err(|e| RegenError::Generation(e.to_string()))?;
    if generated.sizes.is_empty() {
        return Err(RegenError::Generation(
            "generator produced no sizes".to_string(),
        ));
    }

    let metadata = carry_forward(&asset.metadata, generated);
    ctx.catalog.write_metadata(asset.id, &metadata)?;
    ctx.hooks.after_update(asset.id, &metadata);
    Ok(metadata)
}

/// Copy provenance and foreign keys from the previous record into the new one.
fn carry_forward(old: &AttachmentMetadata, mut new: AttachmentMetadata) -> AttachmentMetadata {
    if new.original_image.is_none() {
        new.original_image = old.original_image.clone();
    }
    if new.file.is_empty() {
        new.file = old.file.clone();
    }
    for (key, value) in &old.extra {
        new.extra
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
    new
}
