//! # thumb-regen
//!
//! Detects, deletes, and regenerates stale image thumbnails for the assets of
//! a media catalog. Given one asset (or thousands), it finds every derivative
//! file the asset has on disk, removes them, regenerates the configured sizes
//! from the best available source, and reports per size what happened.
//!
//! # Architecture: One Pipeline, Two Drivers
//!
//! Everything goes through [`process::Regenerator::process_one`]. The `regen`
//! command calls it for a handful of ids; [`batch::run`] calls it for every
//! candidate and persists a resume cursor between items.
//!
//! ```text
//! asset ──▶ resolve ──▶ locate ──▶ erase ──▶ regenerate ──▶ locate ──▶ reconcile
//!           original    derivatives         from source     again      per size
//! ```
//!
//! Each collaborator is a trait, so tests swap in stubs and a host platform
//! can plug in its own catalog or storage:
//!
//! | Trait | Production implementation |
//! |-------|---------------------------|
//! | [`catalog::Catalog`] | [`catalog::JsonCatalog`] |
//! | [`resolve::PathResolver`] | [`resolve::ContentRootResolver`] |
//! | [`imaging::ThumbnailGenerator`] | [`imaging::ImageGenerator`] |
//! | [`storage::FileStore`] | [`storage::LocalFs`] |
//! | [`cursor::CursorStore`] | [`cursor::FileCursor`] |
//! | [`hooks::Hooks`] | [`hooks::ConfiguredHooks`] |
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Single-asset pipeline, outcomes, `RegenError` |
//! | [`batch`] | Batch controller with resume cursor and progress events |
//! | [`locate`] | Finds recorded and discovered derivatives of an original |
//! | [`erase`] | Deletes a derivative and its `.webp` sibling, verifies the delete |
//! | [`regenerate`] | Source selection, generation, metadata carry-forward |
//! | [`reconcile`] | Merges observations into disjoint per-size sets |
//! | [`naming`] | Filename conventions: stems, `-WxH` suffixes, edited copies |
//! | [`imaging`] | Generator trait and the `image`-crate implementation |
//! | [`config`] | `config.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Never Trust a Delete
//!
//! Storage behind a cache or an object-store mount can acknowledge a delete
//! it did not apply. The eraser invalidates the path and checks existence
//! again; only that check decides between `deleted` and `delete_error`.
//!
//! ## Disk Is the Source of Truth
//!
//! Metadata records what a generator *said* it wrote. After regeneration the
//! directory is scanned again and the result is built from what is actually
//! there. Sizes the generator reported but that are missing on disk make the
//! outcome `Partial`.
//!
//! ## Descending Ids With an Exclusive Cursor
//!
//! Batches run newest first. The cursor is the last finished id, written after
//! every item; a resumed run processes only `id < cursor`. Processing an asset
//! twice is harmless, so a crash between finishing an item and saving the
//! cursor costs one redundant regeneration and nothing else.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod cursor;
pub mod erase;
pub mod hooks;
pub mod imaging;
pub mod locate;
pub mod naming;
pub mod output;
pub mod process;
pub mod reconcile;
pub mod regenerate;
pub mod resolve;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
