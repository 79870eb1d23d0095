//! Single-asset regeneration pipeline.
//!
//! [`Regenerator::process_one`] is the one entry point both the `regen`
//! command and the batch controller go through. For one asset it:
//!
//! 1. looks the asset up and checks hooks and mime type
//! 2. resolves the working file
//! 3. locates every existing derivative and erases the unprotected ones
//! 4. regenerates from the best source and writes metadata back
//! 5. re-scans the directory and reconciles what is actually on disk
//!
//! ## Outcomes
//!
//! ```text
//! Regenerated   every size regenerated, nothing stuck, nothing missing
//! Partial       sizes regenerated, but some deletes failed or sizes are missing
//! Skipped       a hook asked to leave the asset alone
//! Failed(msg)   the asset could not be processed
//! ```
//!
//! A failure aborts the current asset only. Deletions observed before the
//! failure stay in the returned [`ProcessingResult`].

use crate::catalog::{Catalog, CatalogError};
use crate::erase::{EraseOutcome, erase};
use crate::hooks::Hooks;
use crate::imaging::ThumbnailGenerator;
use crate::locate::locate;
use crate::reconcile::{Observations, SizeReport, reconcile};
use crate::regenerate::regenerate;
use crate::resolve::PathResolver;
use crate::storage::FileStore;
use crate::types::{AssetId, MimeCategory, join_keys};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RegenError {
    #[error("asset {0} not found")]
    NotFound(AssetId),
    #[error("unsupported mime type: {0}")]
    UnsupportedType(String),
    #[error("original file for asset {0} not found")]
    SourceMissing(AssetId),
    #[error("thumbnail generation failed: {0}")]
    Generation(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Final status of one processed asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Regenerated,
    Partial,
    Skipped,
    Failed(String),
}

/// Everything known about one asset after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    pub asset_id: AssetId,
    pub outcome: Outcome,
    /// Human-readable notes: protected files, delete errors, missing sizes.
    pub details: Vec<String>,
    pub sizes: SizeReport,
}

impl ProcessingResult {
    fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            outcome: Outcome::Skipped,
            details: Vec::new(),
            sizes: SizeReport::default(),
        }
    }

    /// Full success only. `Partial` and `Skipped` are not successes.
    pub fn success(&self) -> bool {
        self.outcome == Outcome::Regenerated
    }

    /// One-line summary of the outcome.
    pub fn message(&self) -> String {
        let (deleted, errors, regenerated) = self.sizes.counts();
        match &self.outcome {
            Outcome::Regenerated => format!(
                "regenerated {} size{} ({} stale removed)",
                regenerated,
                plural(regenerated),
                deleted
            ),
            Outcome::Partial => format!(
                "regenerated {} size{}, {} delete error{}",
                regenerated,
                plural(regenerated),
                errors,
                plural(errors)
            ),
            Outcome::Skipped => "skipped".to_string(),
            Outcome::Failed(message) => message.clone(),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// The regeneration context: every collaborator one run needs.
///
/// Built once per command and shared by single-item and batch processing.
pub struct Regenerator<'a> {
    pub catalog: &'a dyn Catalog,
    pub resolver: &'a dyn PathResolver,
    pub generator: &'a dyn ThumbnailGenerator,
    pub files: &'a dyn FileStore,
    pub hooks: &'a dyn Hooks,
}

impl Regenerator<'_> {
    /// Delete stale derivatives of one asset and regenerate them.
    pub fn process_one(&self, id: AssetId) -> ProcessingResult {
        let mut result = ProcessingResult::new(id);
        match self.run(id, &mut result) {
            Ok(outcome) => result.outcome = outcome,
            Err(e) => {
                warn!(asset_id = id, "{}", e);
                result.outcome = Outcome::Failed(e.to_string());
            }
        }
        info!(asset_id = id, "{}", result.message());
        result
    }

    fn run(&self, id: AssetId, result: &mut ProcessingResult) -> Result<Outcome, RegenError> {
        let asset = self.catalog.asset(id)?.ok_or(RegenError::NotFound(id))?;

        if self.hooks.skip_asset(&asset) {
            result.details.push("skipped by hook".to_string());
            return Ok(Outcome::Skipped);
        }

        match asset.mime() {
            MimeCategory::Image | MimeCategory::Pdf
                if self.generator.supports(&asset.mime_type) => {}
            _ => return Err(RegenError::UnsupportedType(asset.mime_type.clone())),
        }

        let original = self
            .resolver
            .resolve(&asset)
            .ok_or(RegenError::SourceMissing(id))?;
        debug!(asset_id = id, "working file {}", original.display());

        let mut obs = Observations::default();
        for file in locate(self.files, &original, &asset.metadata) {
            if self.hooks.is_protected(&asset, &file.path) {
                obs.protected.insert(file.key);
                result
                    .details
                    .push(format!("protected {}", file.path.display()));
                continue;
            }
            self.hooks.before_delete(&asset, &file.path);
            let erasure = erase(self.files, &file);
            let deleted = erasure.outcome == EraseOutcome::Deleted;
            self.hooks.after_delete(&asset, &file.path, deleted);
            if deleted {
                obs.deleted.insert(erasure.key);
            } else {
                obs.errors.insert(erasure.key);
                if let Some(error) = erasure.error {
                    result.details.push(error.to_string());
                }
            }
        }
        result.sizes.delete_error = obs.errors.clone();
        result.sizes.deleted = obs.deleted.difference(&obs.errors).copied().collect();

        let metadata = regenerate(self, &asset, &original)?;
        obs.expected = metadata.size_keys();
        obs.present = locate(self.files, &original, &metadata)
            .into_iter()
            .filter(|d| self.files.exists(&d.path))
            .map(|d| d.key)
            .collect();

        let reconciled = reconcile(&obs);
        result.sizes = reconciled.sizes;
        if !reconciled.missing.is_empty() {
            result.details.push(format!(
                "generated sizes missing on disk: {}",
                join_keys(&reconciled.missing)
            ));
        }

        if result.sizes.regenerated.is_empty() && result.sizes.delete_error.is_empty() {
            return Err(RegenError::Generation(
                "no regenerated sizes found on disk".to_string(),
            ));
        }
        if result.sizes.delete_error.is_empty() && reconciled.missing.is_empty() {
            Ok(Outcome::Regenerated)
        } else {
            Ok(Outcome::Partial)
        }
    }
}
