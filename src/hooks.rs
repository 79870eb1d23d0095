//! Named extension points called by the regeneration pipeline.
//!
//! Each method is called synchronously at one fixed point of
//! [`Regenerator::process_one`](crate::process::Regenerator::process_one) and
//! has a no-op default, so an implementation only overrides what it needs.
//!
//! | Hook | Called | Default |
//! |---|---|---|
//! | [`skip_asset`](Hooks::skip_asset) | before any file is touched | `false` |
//! | [`is_protected`](Hooks::is_protected) | per derivative, before deletion | `false` |
//! | [`before_delete`](Hooks::before_delete) | right before a derivative is deleted | no-op |
//! | [`after_delete`](Hooks::after_delete) | after the post-delete existence check | no-op |
//! | [`source_override`](Hooks::source_override) | when choosing the regeneration source | `None` |
//! | [`after_update`](Hooks::after_update) | after metadata is written back | no-op |

use crate::config::ProtectConfig;
use crate::types::{Asset, AssetId, AttachmentMetadata};
use std::path::{Path, PathBuf};

pub trait Hooks {
    /// Leave this asset untouched.
    fn skip_asset(&self, _asset: &Asset) -> bool {
        false
    }

    /// Keep this derivative on disk even though it looks stale.
    fn is_protected(&self, _asset: &Asset, _path: &Path) -> bool {
        false
    }

    fn before_delete(&self, _asset: &Asset, _path: &Path) {}

    /// `deleted` is the verified outcome, not the delete call's return value.
    fn after_delete(&self, _asset: &Asset, _path: &Path, _deleted: bool) {}

    /// Use a different file than the working file or unscaled original as
    /// the regeneration source. Ignored if the returned path does not exist.
    fn source_override(&self, _asset: &Asset, _working_file: &Path) -> Option<PathBuf> {
        None
    }

    fn after_update(&self, _asset_id: AssetId, _metadata: &AttachmentMetadata) {}
}

/// Hooks with every default in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl Hooks for NoHooks {}

/// Hooks driven by the `[protect]` section of `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredHooks {
    patterns: Vec<String>,
    skip_ids: Vec<AssetId>,
}

impl ConfiguredHooks {
    pub fn new(config: &ProtectConfig) -> Self {
        Self {
            patterns: config
                .patterns
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
            skip_ids: config.skip_ids.clone(),
        }
    }
}

impl Hooks for ConfiguredHooks {
    fn skip_asset(&self, asset: &Asset) -> bool {
        self.skip_ids.contains(&asset.id)
    }

    fn is_protected(&self, _asset: &Asset, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }
}
