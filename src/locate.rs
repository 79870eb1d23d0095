//! Derived-file locator.
//!
//! Finds every file that plausibly is a generated derivative of an original.
//! Two sources are merged:
//!
//! - **Recorded**: each `metadata.sizes` entry whose file name is a plain
//!   name, resolved against the original's directory, if the file or its
//!   `.webp` sibling exists. Names with separators, `..` or an absolute path
//!   are skipped.
//! - **Discovered**: one listing of the original's directory, keeping names of
//!   the form `stem-WxH.ext` (see [`naming::match_derivative`]) and orphaned
//!   `stem-WxH.ext.webp` siblings, which map back to their primary path.
//!
//! Metadata alone is not enough: a generator can fail to record a size, and
//! earlier runs can leave orphans behind. The directory scan catches those.
//!
//! The original file and the unscaled `original_image` are never returned,
//! even when a size entry points at them.

use crate::naming;
use crate::storage::FileStore;
use crate::types::{AttachmentMetadata, DerivedFile};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Locate all derivatives of `original` that exist right now.
///
/// Recorded entries come first (in size-name order), followed by discovered
/// files in file-name order. Each path appears once.
pub fn locate(
    files: &dyn FileStore,
    original: &Path,
    metadata: &AttachmentMetadata,
) -> Vec<DerivedFile> {
    let Some(dir) = original.parent() else {
        return Vec::new();
    };
    let excluded = excluded_paths(original, metadata);
    let mut seen: BTreeSet<PathBuf> = BTreeSet::new();
    let mut found = Vec::new();

    // A derivative counts while either its primary file or its sibling is on
    // disk, so orphaned siblings are erased too.
    let mut push = |found: &mut Vec<DerivedFile>, key, path: PathBuf| {
        if excluded.contains(&path) {
            debug!("not a derivative candidate: {}", path.display());
            return;
        }
        if seen.contains(&path) {
            return;
        }
        let sibling = naming::sibling_path(&path);
        let sibling = files.exists(&sibling).then_some(sibling);
        if sibling.is_none() && !files.exists(&path) {
            debug!("derivative already gone: {}", path.display());
            return;
        }
        seen.insert(path.clone());
        found.push(DerivedFile { key, path, sibling });
    };

    for (name, entry) in &metadata.sizes {
        if entry.file.is_empty() {
            continue;
        }
        if !naming::is_plain_file_name(&entry.file) {
            warn!(size = %name, "ignoring size entry outside the asset directory: {}", entry.file);
            continue;
        }
        push(&mut found, entry.key(), dir.join(&entry.file));
    }

    let Some(file_name) = original.file_name().and_then(|n| n.to_str()) else {
        return found;
    };
    let stem = naming::stem(file_name);
    let Some(ext) = naming::extension(file_name) else {
        return found;
    };

    match files.list_dir(dir) {
        Ok(names) => {
            for name in names {
                if let Some(key) = naming::match_derivative(&name, stem, ext) {
                    push(&mut found, key, dir.join(&name));
                } else if let Some(primary) = naming::sibling_primary(&name)
                    && let Some(key) = naming::match_derivative(primary, stem, ext)
                {
                    push(&mut found, key, dir.join(primary));
                }
            }
        }
        Err(e) => warn!("could not list {}: {}", dir.display(), e),
    }

    found
}

/// Paths that must never be treated as derivatives.
fn excluded_paths(original: &Path, metadata: &AttachmentMetadata) -> BTreeSet<PathBuf> {
    let mut excluded = BTreeSet::from([original.to_path_buf()]);
    if let (Some(dir), Some(unscaled)) = (original.parent(), metadata.original_image.as_deref())
        && !unscaled.is_empty()
    {
        excluded.insert(dir.join(unscaled));
    }
    excluded
}
