//! File storage capability used by the locator and the eraser.
//!
//! The pipeline never touches `std::fs` directly for listing or deleting
//! derivatives. Going through [`FileStore`] lets a deployment sit on top of a
//! caching or remote-backed filesystem, where a delete can report success
//! without taking effect and `stat` results can be stale. The eraser calls
//! [`FileStore::invalidate`] before re-checking a path for exactly that reason.

use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

pub trait FileStore {
    /// Whether `path` currently exists.
    fn exists(&self, path: &Path) -> bool;

    /// Names of the regular files directly inside `dir`, sorted by name.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Delete a file. A returned `Ok` is not proof the file is gone.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Drop any cached state for `path` so the next [`exists`](Self::exists)
    /// reflects the backing store.
    fn invalidate(&self, _path: &Path) {}
}

/// [`FileStore`] over the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileStore for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.try_exists().unwrap_or(false)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => debug!("skipping non UTF-8 file name in {}", dir.display()),
            }
        }
        Ok(names)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}
