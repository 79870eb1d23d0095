//! Thumbnail generation in pure Rust, no system image libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Fit** | constrained dimensions + `resize_exact` (Lanczos3) |
//! | **Crop** | `resize_to_fill` (Lanczos3) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Configured sizes and encoding quality
//! - **Backend**: [`ThumbnailGenerator`] trait + [`ImageGenerator`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ThumbnailGenerator};
pub use calculations::{constrain_dimensions, target_dimensions};
pub use params::{Quality, SizeSpec};
pub use rust_backend::ImageGenerator;
