//! Parameter types for thumbnail generation.
//!
//! These structs describe *what* to generate, not *how*. They sit between the
//! configuration (which names the sizes a site wants) and the
//! [`ImageGenerator`](super::rust_backend::ImageGenerator), which does the
//! pixel work.
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 82). Clamped on construction.
//! - [`SizeSpec`]: One named thumbnail size: bounding box plus crop flag.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(82)
    }
}

/// A configured thumbnail size.
///
/// A zero `width` or `height` means "unbounded on that axis". With `crop`
/// set, the output fills the box exactly (center crop); otherwise the image
/// is scaled to fit inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeSpec {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub crop: bool,
}

impl SizeSpec {
    pub fn new(width: u32, height: u32, crop: bool) -> Self {
        Self {
            width,
            height,
            crop,
        }
    }
}
