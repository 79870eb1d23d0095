//! CLI output formatting for regeneration results.
//!
//! # Display
//!
//! Every asset leads with its id and outcome. Per-size results and detail
//! notes are shown as indented context lines underneath:
//!
//! ```text
//! #42 regenerated 2 sizes (1 stale removed)
//!     regenerated: 150x150, 300x200
//!     deleted: 1024x768
//! #41 FAILED original file for asset 41 not found
//! ```
//!
//! ## Batch
//!
//! ```text
//! Regenerating 3 assets (resuming below 44)
//! [1/3] #43 regenerated 4 sizes (0 stale removed)
//!     regenerated: 150x150, 300x225, 768x576, 1024x768
//! [2/3] #42 skipped
//! ...
//! Done: 1 succeeded, 1 failed, 1 skipped of 3
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::process::{Outcome, ProcessingResult};
use crate::types::{AssetId, SizeKey, join_keys};
use std::collections::BTreeSet;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Indentation for context lines under an asset header.
const INDENT: &str = "    ";

fn header(result: &ProcessingResult) -> String {
    match &result.outcome {
        Outcome::Failed(message) => format!("#{} FAILED {}", result.asset_id, message),
        Outcome::Partial => format!("#{} PARTIAL {}", result.asset_id, result.message()),
        _ => format!("#{} {}", result.asset_id, result.message()),
    }
}

fn size_line(label: &str, keys: &BTreeSet<SizeKey>) -> Option<String> {
    (!keys.is_empty()).then(|| format!("{}{}: {}", INDENT, label, join_keys(keys)))
}

// ============================================================================
// Single asset
// ============================================================================

/// Format one processing result: header, size sets, then detail notes.
pub fn format_result(result: &ProcessingResult) -> Vec<String> {
    let mut lines = vec![header(result)];
    lines.extend(size_line("regenerated", &result.sizes.regenerated));
    lines.extend(size_line("deleted", &result.sizes.deleted));
    lines.extend(size_line("delete errors", &result.sizes.delete_error));
    for detail in &result.details {
        lines.push(format!("{}{}", INDENT, detail));
    }
    lines
}

pub fn print_result(result: &ProcessingResult) {
    for line in format_result(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            total,
            resumed_from,
        } => {
            let noun = if *total == 1 { "asset" } else { "assets" };
            match resumed_from {
                Some(from) => vec![format!(
                    "Regenerating {} {} (resuming below {})",
                    total, noun, from
                )],
                None => vec![format!("Regenerating {} {}", total, noun)],
            }
        }
        BatchEvent::ItemFinished {
            position,
            total,
            result,
        } => {
            let mut lines = format_result(result);
            lines[0] = format!("[{}/{}] {}", position, total, lines[0]);
            lines
        }
        BatchEvent::Completed { summary } => format_summary(summary),
    }
}

pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    vec![format!(
        "Done: {} succeeded, {} failed, {} skipped of {}",
        summary.succeeded, summary.failed, summary.skipped, summary.total
    )]
}

// ============================================================================
// Status
// ============================================================================

/// Format the `status` command output.
pub fn format_status(state_file: &Path, cursor: Option<AssetId>) -> Vec<String> {
    match cursor {
        Some(id) => vec![
            format!("Interrupted batch: last processed asset #{}", id),
            format!("{}Resume with `batch --resume`", INDENT),
            format!("{}State: {}", INDENT, state_file.display()),
        ],
        None => vec!["No batch in progress".to_string()],
    }
}

pub fn print_status(state_file: &Path, cursor: Option<AssetId>) {
    for line in format_status(state_file, cursor) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::SizeReport;

    fn result(outcome: Outcome) -> ProcessingResult {
        ProcessingResult {
            asset_id: 42,
            outcome,
            details: vec![],
            sizes: SizeReport::default(),
        }
    }

    fn keys(list: &[(u32, u32)]) -> BTreeSet<SizeKey> {
        list.iter().map(|&(w, h)| SizeKey::new(w, h)).collect()
    }

    // =========================================================================
    // Single asset formatting
    // =========================================================================

    #[test]
    fn regenerated_result_lists_sizes() {
        let mut r = result(Outcome::Regenerated);
        r.sizes.regenerated = keys(&[(300, 200), (150, 150)]);
        r.sizes.deleted = keys(&[(1024, 768)]);

        assert_eq!(
            format_result(&r),
            vec![
                "#42 regenerated 2 sizes (1 stale removed)",
                "    regenerated: 150x150, 300x200",
                "    deleted: 1024x768",
            ]
        );
    }

    #[test]
    fn partial_result_shows_errors_and_details() {
        let mut r = result(Outcome::Partial);
        r.sizes.regenerated = keys(&[(300, 200)]);
        r.sizes.delete_error = keys(&[(150, 150)]);
        r.details = vec!["could not delete /x/photo-150x150.jpg: denied".into()];

        let lines = format_result(&r);
        assert_eq!(lines[0], "#42 PARTIAL regenerated 1 size, 1 delete error");
        assert_eq!(lines[2], "    delete errors: 150x150");
        assert_eq!(lines[3], "    could not delete /x/photo-150x150.jpg: denied");
    }

    #[test]
    fn failed_result_header() {
        let r = result(Outcome::Failed("asset 42 not found".into()));
        assert_eq!(format_result(&r), vec!["#42 FAILED asset 42 not found"]);
    }

    #[test]
    fn skipped_result_header() {
        assert_eq!(format_result(&result(Outcome::Skipped)), vec!["#42 skipped"]);
    }

    // =========================================================================
    // Batch formatting
    // =========================================================================

    #[test]
    fn started_event() {
        let event = BatchEvent::Started {
            total: 3,
            resumed_from: Some(44),
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["Regenerating 3 assets (resuming below 44)"]
        );

        let event = BatchEvent::Started {
            total: 1,
            resumed_from: None,
        };
        assert_eq!(format_batch_event(&event), vec!["Regenerating 1 asset"]);
    }

    #[test]
    fn item_event_prefixes_position() {
        let event = BatchEvent::ItemFinished {
            position: 2,
            total: 3,
            result: result(Outcome::Skipped),
        };
        assert_eq!(format_batch_event(&event), vec!["[2/3] #42 skipped"]);
    }

    #[test]
    fn completed_event_is_summary() {
        let summary = BatchSummary {
            succeeded: 1,
            failed: 1,
            skipped: 1,
            total: 3,
        };
        assert_eq!(
            format_batch_event(&BatchEvent::Completed { summary }),
            vec!["Done: 1 succeeded, 1 failed, 1 skipped of 3"]
        );
    }

    // =========================================================================
    // Status formatting
    // =========================================================================

    #[test]
    fn status_without_cursor() {
        assert_eq!(
            format_status(Path::new("state.json"), None),
            vec!["No batch in progress"]
        );
    }

    #[test]
    fn status_with_cursor() {
        let lines = format_status(Path::new("state.json"), Some(8));
        assert_eq!(lines[0], "Interrupted batch: last processed asset #8");
        assert_eq!(lines[2], "    State: state.json");
    }
}
