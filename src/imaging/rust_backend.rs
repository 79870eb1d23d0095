//! Pure Rust thumbnail generator built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image::ImageReader` |
//! | Fit resize | `DynamicImage::resize_exact` with `Lanczos3` on constrained dimensions |
//! | Crop resize | `DynamicImage::resize_to_fill` with `Lanczos3` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode PNG / GIF / WebP | `DynamicImage::save_with_format` |
//!
//! Derivatives are written next to the source file as `stem-WxH.ext`, with
//! the same format as the source.

use super::backend::{BackendError, ThumbnailGenerator};
use super::calculations::target_dimensions;
use super::params::{Quality, SizeSpec};
use crate::naming;
use crate::types::{AssetId, AttachmentMetadata, SizeEntry, SizeKey};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Mime types whose decoders and encoders are compiled in.
const SUPPORTED_MIME_TYPES: &[(&str, ImageFormat)] = &[
    ("image/jpeg", ImageFormat::Jpeg),
    ("image/png", ImageFormat::Png),
    ("image/gif", ImageFormat::Gif),
    ("image/webp", ImageFormat::WebP),
];

/// Thumbnail generator using the `image` crate ecosystem.
pub struct ImageGenerator {
    sizes: BTreeMap<String, SizeSpec>,
    quality: Quality,
}

impl ImageGenerator {
    pub fn new(sizes: BTreeMap<String, SizeSpec>, quality: Quality) -> Self {
        Self { sizes, quality }
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Output format for a file, inferred from its extension.
fn format_for(path: &Path) -> Result<ImageFormat, BackendError> {
    ImageFormat::from_path(path).map_err(|_| {
        BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            path.display()
        ))
    })
}

/// Encode and save `img` at `path`, matching the format to the extension.
fn save_image(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    match format_for(path)? {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path).map_err(BackendError::Io)?;
            let writer = std::io::BufWriter::new(file);
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.value());
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
        }
        ImageFormat::WebP => DynamicImage::ImageRgba8(img.to_rgba8())
            .save_with_format(path, ImageFormat::WebP)
            .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {}", e))),
        format => img.save_with_format(path, format).map_err(|e| {
            BackendError::ProcessingFailed(format!("Encode to {:?} failed: {}", format, e))
        }),
    }
}

impl ThumbnailGenerator for ImageGenerator {
    fn supports(&self, mime_type: &str) -> bool {
        let mime = mime_type.trim().to_ascii_lowercase();
        SUPPORTED_MIME_TYPES.iter().any(|(m, _)| *m == mime)
    }

    fn generate(
        &self,
        asset_id: AssetId,
        mime_type: &str,
        source: &Path,
    ) -> Result<AttachmentMetadata, BackendError> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                BackendError::ProcessingFailed(format!("Invalid file name: {}", source.display()))
            })?;
        let dir = source.parent().unwrap_or(Path::new("."));
        let stem = naming::stem(file_name);
        let ext = naming::extension(file_name).ok_or_else(|| {
            BackendError::ProcessingFailed(format!("No file extension: {}", source.display()))
        })?;

        let img = load_image(source)?;
        let original = (img.width(), img.height());

        let mut meta = AttachmentMetadata {
            width: original.0,
            height: original.1,
            ..Default::default()
        };
        let mut written: BTreeMap<SizeKey, String> = BTreeMap::new();

        for (name, spec) in &self.sizes {
            let Some(key) = target_dimensions(original, spec) else {
                debug!(asset_id, size = %name, "size not applicable to {}x{} source", original.0, original.1);
                continue;
            };

            // Two size names can resolve to the same box
            let file = match written.get(&key) {
                Some(file) => file.clone(),
                None => {
                    let file = naming::derivative_name(stem, key, ext);
                    let resized = if spec.crop {
                        img.resize_to_fill(key.width, key.height, FilterType::Lanczos3)
                    } else {
                        img.resize_exact(key.width, key.height, FilterType::Lanczos3)
                    };
                    save_image(&resized, &dir.join(&file), self.quality)?;
                    debug!(asset_id, size = %name, file = %file, "wrote derivative");
                    written.insert(key, file.clone());
                    file
                }
            };

            meta.sizes.insert(
                name.clone(),
                SizeEntry {
                    file,
                    width: key.width,
                    height: key.height,
                    mime_type: Some(mime_type.to_string()),
                },
            );
        }

        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    fn generator() -> ImageGenerator {
        let mut sizes = BTreeMap::new();
        sizes.insert("thumbnail".to_string(), SizeSpec::new(150, 150, true));
        sizes.insert("medium".to_string(), SizeSpec::new(300, 300, false));
        sizes.insert("large".to_string(), SizeSpec::new(1024, 1024, false));
        ImageGenerator::new(sizes, Quality::default())
    }

    #[test]
    fn supports_compiled_in_types() {
        let g = generator();
        assert!(g.supports("image/jpeg"));
        assert!(g.supports("image/PNG"));
        assert!(!g.supports("application/pdf"));
        assert!(!g.supports("image/heic"));
    }

    #[test]
    fn generate_writes_applicable_sizes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        create_test_jpeg(&source, 800, 600);

        let meta = generator().generate(1, "image/jpeg", &source).unwrap();

        assert_eq!(meta.width, 800);
        assert_eq!(meta.height, 600);
        // large (1024 box) would not shrink an 800px source
        assert_eq!(meta.sizes.len(), 2);
        assert_eq!(meta.sizes["thumbnail"].file, "photo-150x150.jpg");
        assert_eq!(meta.sizes["medium"].file, "photo-300x225.jpg");

        let thumb = tmp.path().join("photo-150x150.jpg");
        assert_eq!(image::image_dimensions(&thumb).unwrap(), (150, 150));
        let medium = tmp.path().join("photo-300x225.jpg");
        assert_eq!(image::image_dimensions(&medium).unwrap(), (300, 225));
    }

    #[test]
    fn generate_uses_stem_without_scaled_suffix() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo-scaled.jpg");
        create_test_jpeg(&source, 400, 300);

        let meta = generator().generate(1, "image/jpeg", &source).unwrap();
        assert_eq!(meta.sizes["thumbnail"].file, "photo-150x150.jpg");
        assert!(tmp.path().join("photo-150x150.jpg").exists());
    }

    #[test]
    fn generate_png_keeps_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("logo.png");
        RgbImage::from_pixel(400, 400, image::Rgb([10, 20, 30]))
            .save(&source)
            .unwrap();

        let meta = generator().generate(3, "image/png", &source).unwrap();
        assert_eq!(meta.sizes["medium"].file, "logo-300x300.png");
        assert_eq!(
            ImageFormat::from_path(tmp.path().join("logo-300x300.png")).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn generate_tiny_source_produces_no_sizes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("icon.jpg");
        create_test_jpeg(&source, 100, 100);

        let meta = generator().generate(1, "image/jpeg", &source).unwrap();
        assert!(meta.sizes.is_empty());
    }

    #[test]
    fn generate_nonexistent_file_errors() {
        let result = generator().generate(1, "image/jpeg", Path::new("/nonexistent/a.jpg"));
        assert!(result.is_err());
    }
}
