//! Batch controller: regenerate many assets with a resumable cursor.
//!
//! ```text
//! Idle ──run──▶ Running ──all items done──▶ Completed   (cursor cleared)
//!                  │
//!                  └──cursor write fails──▶ Aborted     (cursor left as is)
//! ```
//!
//! Candidates are processed in descending id order. After every item, success
//! or failure, the item's id is written as the cursor; a resumed run keeps only
//! ids strictly below it. A failing asset is counted and the run moves on.
//! The cursor advancing past failures means a permanently broken asset is not
//! retried on resume; rerun it by id instead.
//!
//! Progress is reported as [`BatchEvent`]s over an optional channel so the
//! CLI can print while the run is going.

use crate::catalog::CatalogError;
use crate::cursor::CursorStore;
use crate::process::{Outcome, ProcessingResult, Regenerator};
use crate::types::AssetId;
use serde::Serialize;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("could not persist resume cursor: {0}")]
    Cursor(#[source] std::io::Error),
}

/// What to run.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Explicit ids. `None` means every eligible asset in the catalog.
    pub ids: Option<Vec<AssetId>>,
    /// Continue below the stored cursor.
    pub resume: bool,
    /// Discard the stored cursor first.
    pub start_over: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Progress events sent during a batch run.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
        resumed_from: Option<AssetId>,
    },
    ItemFinished {
        /// 1-based position within the run.
        position: usize,
        total: usize,
        result: ProcessingResult,
    },
    Completed {
        summary: BatchSummary,
    },
}

/// De-duplicate, sort descending, and drop everything at or above `cursor`.
pub fn select_candidates(mut ids: Vec<AssetId>, cursor: Option<AssetId>) -> Vec<AssetId> {
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids.dedup();
    if let Some(cursor) = cursor {
        ids.retain(|&id| id < cursor);
    }
    ids
}

fn emit(events: &Option<Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Run a batch to completion, or until the cursor can no longer be saved.
pub fn run(
    regen: &Regenerator<'_>,
    cursor: &dyn CursorStore,
    request: &BatchRequest,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    if request.start_over {
        cursor.clear().map_err(BatchError::Cursor)?;
    }
    let resumed_from = if request.resume { cursor.load() } else { None };

    let ids = match &request.ids {
        Some(ids) => ids.clone(),
        None => regen.catalog.asset_ids()?,
    };
    let candidates = select_candidates(ids, resumed_from);
    let total = candidates.len();
    match resumed_from {
        Some(from) => info!("resuming below {}: {} assets", from, total),
        None => info!("processing {} assets", total),
    }
    emit(
        &events,
        BatchEvent::Started {
            total,
            resumed_from,
        },
    );

    let mut summary = BatchSummary {
        total,
        ..Default::default()
    };
    for (index, id) in candidates.into_iter().enumerate() {
        let result = regen.process_one(id);
        match result.outcome {
            Outcome::Regenerated => summary.succeeded += 1,
            Outcome::Skipped => summary.skipped += 1,
            Outcome::Partial | Outcome::Failed(_) => summary.failed += 1,
        }
        emit(
            &events,
            BatchEvent::ItemFinished {
                position: index + 1,
                total,
                result,
            },
        );
        cursor.save(id).map_err(BatchError::Cursor)?;
    }

    cursor.clear().map_err(BatchError::Cursor)?;
    info!(
        "batch complete: {} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );
    emit(&events, BatchEvent::Completed { summary });
    Ok(summary)
}
