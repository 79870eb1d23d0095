//! Resume cursor for batch runs.
//!
//! A batch walks asset ids in descending order and records the last id it
//! finished after every item. A resumed run only considers ids strictly
//! below that cursor, so an interrupted run picks up exactly where it
//! stopped: nothing is skipped and nothing is processed twice.
//!
//! ## Storage
//!
//! [`FileCursor`] keeps the cursor in a small JSON file (by default
//! `.thumb-regen-state.json` in the working root):
//!
//! ```json
//! { "version": 1, "last_id": 8 }
//! ```
//!
//! A missing, unparseable, or wrong-version file loads as "no cursor". The
//! worst case is a full rerun, which is safe because processing is
//! idempotent. Writes go through a temp file and a rename.

use crate::types::AssetId;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Version of the state file format. Bump this to discard old cursors when
/// the format changes.
const STATE_VERSION: u32 = 1;

/// Persistence for the batch cursor. One writer at a time.
pub trait CursorStore {
    /// Last processed id, if a cursor is stored.
    fn load(&self) -> Option<AssetId>;
    fn save(&self, id: AssetId) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorState {
    version: u32,
    last_id: AssetId,
}

/// [`CursorStore`] backed by a JSON state file.
#[derive(Debug, Clone)]
pub struct FileCursor {
    path: PathBuf,
}

impl FileCursor {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CursorStore for FileCursor {
    fn load(&self) -> Option<AssetId> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("could not read {}: {}", self.path.display(), e);
                return None;
            }
        };
        let state: CursorState = match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                warn!("ignoring corrupt cursor {}: {}", self.path.display(), e);
                return None;
            }
        };
        if state.version != STATE_VERSION {
            warn!(
                "ignoring cursor {} with version {}",
                self.path.display(),
                state.version
            );
            return None;
        }
        Some(state.last_id)
    }

    fn save(&self, id: AssetId) -> io::Result<()> {
        let state = CursorState {
            version: STATE_VERSION,
            last_id: id,
        };
        let json = serde_json::to_string_pretty(&state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!("cursor saved at {}", id);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
