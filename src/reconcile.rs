//! Outcome reconciler.
//!
//! Deletion and regeneration are observed by two separate directory scans, so
//! the same size can show up in more than one place. This module merges the
//! observations into three disjoint sets with the precedence
//! `delete_error > regenerated > deleted`:
//!
//! ```text
//! regenerated = { k in present | k in expected or k not protected } - delete_error
//! deleted     = deleted - regenerated - delete_error
//! missing     = expected - present
//! ```
//!
//! `missing` is not a size outcome. It lists sizes the generator reported but
//! that cannot be found on disk, and the caller surfaces it as a warning.

use crate::types::SizeKey;
use serde::Serialize;
use std::collections::BTreeSet;

/// The three disjoint per-size classifications of a processed asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SizeReport {
    pub deleted: BTreeSet<SizeKey>,
    pub delete_error: BTreeSet<SizeKey>,
    pub regenerated: BTreeSet<SizeKey>,
}

impl SizeReport {
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.deleted.len(),
            self.delete_error.len(),
            self.regenerated.len(),
        )
    }
}

/// Raw observations from one pass over an asset.
#[derive(Debug, Clone, Default)]
pub struct Observations {
    /// Sizes whose stale files were verified gone.
    pub deleted: BTreeSet<SizeKey>,
    /// Sizes whose stale files survived deletion.
    pub errors: BTreeSet<SizeKey>,
    /// Sizes of files a hook kept on disk.
    pub protected: BTreeSet<SizeKey>,
    /// Sizes the generator says it produced.
    pub expected: BTreeSet<SizeKey>,
    /// Sizes found on disk after regeneration.
    pub present: BTreeSet<SizeKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub sizes: SizeReport,
    pub missing: BTreeSet<SizeKey>,
}

pub fn reconcile(obs: &Observations) -> Reconciled {
    let regenerated: BTreeSet<SizeKey> = obs
        .present
        .iter()
        .filter(|k| obs.expected.contains(k) || !obs.protected.contains(k))
        .filter(|k| !obs.errors.contains(k))
        .copied()
        .collect();

    let deleted = obs
        .deleted
        .iter()
        .filter(|k| !regenerated.contains(k) && !obs.errors.contains(k))
        .copied()
        .collect();

    let missing = obs.expected.difference(&obs.present).copied().collect();

    Reconciled {
        sizes: SizeReport {
            deleted,
            delete_error: obs.errors.clone(),
            regenerated,
        },
        missing,
    }
}
