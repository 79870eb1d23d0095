//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::SizeSpec;
use crate::types::SizeKey;

/// Scale `source` down to fit inside `bound`, preserving aspect ratio.
///
/// A zero bound on either axis leaves that axis unconstrained. Never scales
/// up. Each output side is at least 1px.
///
/// # Examples
/// ```
/// # use thumb_regen::imaging::constrain_dimensions;
/// assert_eq!(constrain_dimensions((800, 600), (300, 300)), (300, 225));
/// assert_eq!(constrain_dimensions((800, 600), (768, 0)), (768, 576));
/// assert_eq!(constrain_dimensions((200, 100), (300, 300)), (200, 100));
/// ```
pub fn constrain_dimensions(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bound;
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let ratio_w = if max_w > 0 && src_w > max_w {
        max_w as f64 / src_w as f64
    } else {
        1.0
    };
    let ratio_h = if max_h > 0 && src_h > max_h {
        max_h as f64 / src_h as f64
    } else {
        1.0
    };
    let ratio = ratio_w.min(ratio_h);

    let w = ((src_w as f64 * ratio).round() as u32).max(1);
    let h = ((src_h as f64 * ratio).round() as u32).max(1);
    // Rounding can push a side one pixel past its bound
    let w = if max_w > 0 { w.min(max_w) } else { w };
    let h = if max_h > 0 { h.min(max_h) } else { h };
    (w, h)
}

/// Output dimensions for one configured size, or `None` when the size must
/// not be generated.
///
/// A size is skipped when its box is `0x0`, or when the result would be the
/// same as the source (which also covers sources smaller than the box:
/// thumbnails are never upscaled).
///
/// Crop sizes fill the box exactly, clipped to the source on each axis.
pub fn target_dimensions(source: (u32, u32), spec: &SizeSpec) -> Option<SizeKey> {
    if spec.width == 0 && spec.height == 0 {
        return None;
    }
    let (src_w, src_h) = source;

    let (w, h) = if spec.crop {
        let w = if spec.width == 0 {
            src_w
        } else {
            spec.width.min(src_w)
        };
        let h = if spec.height == 0 {
            src_h
        } else {
            spec.height.min(src_h)
        };
        (w, h)
    } else {
        constrain_dimensions(source, (spec.width, spec.height))
    };

    if (w, h) == source || w == 0 || h == 0 {
        None
    } else {
        Some(SizeKey::new(w, h))
    }
}
