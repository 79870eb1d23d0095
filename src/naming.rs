//! Filename conventions for originals and their derivatives.
//!
//! Generated thumbnails are named after the file they were cut from:
//!
//! ```text
//! photo-scaled.jpg          working file (downscaled copy of a large upload)
//! photo.jpg                 unscaled original, recorded as `original_image`
//! photo-150x150.jpg         derivative: stem + "-" + WxH + extension
//! photo-150x150.jpg.webp    compressed sibling of a derivative
//! photo-e1700000000000.jpg  edited copy written by the host's image editor
//! ```
//!
//! Everything here is pure string handling so the locator and the generator
//! agree on one definition of "stem".

use crate::types::SizeKey;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Suffix the host appends to downscaled copies of very large uploads.
pub const SCALED_SUFFIX: &str = "-scaled";

/// Extension of compressed siblings written next to derivatives.
pub const SIBLING_EXTENSION: &str = "webp";

/// Minimum digit run that marks an edited copy (`-e` + millisecond timestamp).
const EDIT_MARKER_DIGITS: usize = 13;

/// Split a file name into `(base, extension)`. The extension excludes the dot.
fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => (&file_name[..pos], Some(&file_name[pos + 1..])),
        _ => (file_name, None),
    }
}

/// Derivative stem for a file name: base name without extension and without
/// a trailing `-scaled`.
///
/// - `"photo-scaled.jpg"` → `"photo"`
/// - `"photo.jpg"` → `"photo"`
/// - `"my-scaled-photo.png"` → `"my-scaled-photo"`
pub fn stem(file_name: &str) -> &str {
    let (base, _) = split_extension(file_name);
    base.strip_suffix(SCALED_SUFFIX).unwrap_or(base)
}

/// Extension of a file name, without the dot.
pub fn extension(file_name: &str) -> Option<&str> {
    split_extension(file_name).1
}

/// Parse a `<width>x<height>` token. Both sides must be non-empty digit runs.
pub fn parse_dimensions(token: &str) -> Option<SizeKey> {
    let (w, h) = token.split_once('x')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(w) || !digits(h) {
        return None;
    }
    Some(SizeKey::new(w.parse().ok()?, h.parse().ok()?))
}

/// Match a directory entry against `stem + "-" + WxH + "." + extension`.
///
/// Returns the size key when `candidate` is a derivative of a file with the
/// given stem and extension. Anything else (other stems, other extensions,
/// non-numeric suffixes) yields `None`.
pub fn match_derivative(candidate: &str, stem: &str, extension: &str) -> Option<SizeKey> {
    let rest = candidate.strip_prefix(stem)?.strip_prefix('-')?;
    let token = rest.strip_suffix(extension)?.strip_suffix('.')?;
    parse_dimensions(token)
}

/// File name a generator writes for one size of a source file.
pub fn derivative_name(stem: &str, key: SizeKey, extension: &str) -> String {
    format!("{}-{}.{}", stem, key, extension)
}

/// Path of the compressed sibling of a derivative (`<path>.webp`).
pub fn sibling_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(SIBLING_EXTENSION);
    PathBuf::from(os)
}

/// Primary file name of a compressed sibling (`photo-150x150.jpg.webp` →
/// `photo-150x150.jpg`). `None` for anything that is not a sibling.
pub fn sibling_primary(file_name: &str) -> Option<&str> {
    let primary = file_name
        .strip_suffix(SIBLING_EXTENSION)?
        .strip_suffix('.')?;
    (!primary.is_empty()).then_some(primary)
}

/// Whether `name` is a bare file name: one normal path component with no
/// separators, no `.`/`..` and no root.
pub fn is_plain_file_name(name: &str) -> bool {
    Path::new(name).file_name() == Some(OsStr::new(name))
}

/// Whether a file name looks like an edited copy: it contains `-e` followed by
/// at least 13 digits (a millisecond timestamp).
pub fn is_edited_copy(file_name: &str) -> bool {
    let bytes = file_name.as_bytes();
    let mut search = 0;
    while let Some(offset) = file_name[search..].find("-e") {
        let start = search + offset + 2;
        let run = bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if run >= EDIT_MARKER_DIGITS {
            return true;
        }
        search = start;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // stem / extension
    // =========================================================================

    #[test]
    fn stem_strips_scaled_suffix() {
        assert_eq!(stem("photo-scaled.jpg"), "photo");
    }

    #[test]
    fn stem_plain_file() {
        assert_eq!(stem("photo.jpg"), "photo");
    }

    #[test]
    fn stem_keeps_inner_scaled() {
        assert_eq!(stem("my-scaled-photo.png"), "my-scaled-photo");
    }

    #[test]
    fn stem_multiple_dots() {
        assert_eq!(stem("holiday.2024.jpeg"), "holiday.2024");
        assert_eq!(extension("holiday.2024.jpeg"), Some("jpeg"));
    }

    #[test]
    fn stem_without_extension() {
        assert_eq!(stem("README"), "README");
        assert_eq!(extension("README"), None);
    }

    #[test]
    fn dotfile_has_no_extension() {
        assert_eq!(extension(".hidden"), None);
    }

    // =========================================================================
    // Dimension parsing
    // =========================================================================

    #[test]
    fn parse_dimensions_valid() {
        assert_eq!(parse_dimensions("150x150"), Some(SizeKey::new(150, 150)));
        assert_eq!(parse_dimensions("1024x768"), Some(SizeKey::new(1024, 768)));
    }

    #[test]
    fn parse_dimensions_rejects_garbage() {
        assert_eq!(parse_dimensions("notadimension"), None);
        assert_eq!(parse_dimensions("150x"), None);
        assert_eq!(parse_dimensions("x150"), None);
        assert_eq!(parse_dimensions("150x150x2"), None);
        assert_eq!(parse_dimensions("-150x150"), None);
        assert_eq!(parse_dimensions("+1x2"), None);
    }

    #[test]
    fn match_derivative_accepts_sizes() {
        assert_eq!(
            match_derivative("photo-300x200.jpg", "photo", "jpg"),
            Some(SizeKey::new(300, 200))
        );
    }

    #[test]
    fn match_derivative_rejects_other_names() {
        assert_eq!(match_derivative("photo-notadimension.jpg", "photo", "jpg"), None);
        assert_eq!(match_derivative("other.jpg", "photo", "jpg"), None);
        assert_eq!(match_derivative("photo-150x150.png", "photo", "jpg"), None);
        assert_eq!(match_derivative("photo-150x150.jpg.webp", "photo", "jpg"), None);
        assert_eq!(match_derivative("photo.jpg", "photo", "jpg"), None);
        assert_eq!(match_derivative("photograph-150x150.jpg", "photo", "jpg"), None);
    }

    #[test]
    fn derivative_name_format() {
        assert_eq!(
            derivative_name("photo", SizeKey::new(150, 150), "jpg"),
            "photo-150x150.jpg"
        );
    }

    #[test]
    fn sibling_path_appends_webp() {
        assert_eq!(
            sibling_path(Path::new("/up/photo-150x150.jpg")),
            PathBuf::from("/up/photo-150x150.jpg.webp")
        );
    }

    #[test]
    fn sibling_primary_strips_webp() {
        assert_eq!(
            sibling_primary("photo-150x150.jpg.webp"),
            Some("photo-150x150.jpg")
        );
        assert_eq!(sibling_primary("photo-150x150.jpg"), None);
        assert_eq!(sibling_primary("photowebp"), None);
        assert_eq!(sibling_primary(".webp"), None);
    }

    #[test]
    fn plain_file_names() {
        assert!(is_plain_file_name("photo-150x150.jpg"));
        assert!(!is_plain_file_name("../photo-150x150.jpg"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("sub/photo-150x150.jpg"));
        assert!(!is_plain_file_name("./photo-150x150.jpg"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
    }

    // =========================================================================
    // Edited copies
    // =========================================================================

    #[test]
    fn edited_copy_detected() {
        assert!(is_edited_copy("photo-e1700000000000.jpg"));
        assert!(is_edited_copy("photo-e17000000000001-scaled.jpg"));
    }

    #[test]
    fn short_digit_runs_are_not_edits() {
        assert!(!is_edited_copy("photo-e2024.jpg"));
        assert!(!is_edited_copy("photo-edited.jpg"));
        assert!(!is_edited_copy("photo-scaled.jpg"));
    }

    #[test]
    fn later_marker_is_found() {
        assert!(is_edited_copy("my-edit-e1700000000000.jpg"));
    }
}
