//! Thumbnail generation backend trait and shared types.
//!
//! The [`ThumbnailGenerator`] trait is the capability the regeneration driver
//! calls: given a source file it writes every configured size next to it and
//! returns a fresh metadata record describing what it produced.
//!
//! The production implementation is
//! [`ImageGenerator`](super::rust_backend::ImageGenerator), built on the
//! `image` crate. Tests use the `StubGenerator` in this module, which writes
//! placeholder files without decoding anything.

use crate::types::{AssetId, AttachmentMetadata};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Capability that produces derived sizes for one source file.
pub trait ThumbnailGenerator {
    /// Whether this generator can decode files of the given mime type.
    fn supports(&self, mime_type: &str) -> bool;

    /// Generate all configured sizes from `source`.
    ///
    /// Returned `sizes` entries name files relative to `source`'s directory.
    /// An empty `sizes` map is a valid return value here; the caller decides
    /// whether that counts as a failure.
    fn generate(
        &self,
        asset_id: AssetId,
        mime_type: &str,
        source: &Path,
    ) -> Result<AttachmentMetadata, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::naming;
    use crate::types::{SizeEntry, SizeKey};
    use std::sync::Mutex;

    /// Generator that writes empty placeholder files for a fixed list of
    /// sizes and records every call.
    #[derive(Default)]
    pub struct StubGenerator {
        pub sizes: Vec<(String, SizeKey)>,
        pub fail_with: Option<String>,
        pub unsupported: Vec<String>,
        /// Sizes reported in metadata but never written to disk.
        pub phantom: Vec<SizeKey>,
        pub original_image: Option<String>,
        pub calls: Mutex<Vec<RecordedCall>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub asset_id: AssetId,
        pub source: String,
    }

    impl StubGenerator {
        pub fn with_sizes(sizes: &[(&str, u32, u32)]) -> Self {
            Self {
                sizes: sizes
                    .iter()
                    .map(|(name, w, h)| (name.to_string(), SizeKey::new(*w, *h)))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn get_calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ThumbnailGenerator for StubGenerator {
        fn supports(&self, mime_type: &str) -> bool {
            !self.unsupported.iter().any(|m| m == mime_type)
        }

        fn generate(
            &self,
            asset_id: AssetId,
            _mime_type: &str,
            source: &Path,
        ) -> Result<AttachmentMetadata, BackendError> {
            self.calls.lock().unwrap().push(RecordedCall {
                asset_id,
                source: source.to_string_lossy().to_string(),
            });
            if let Some(message) = &self.fail_with {
                return Err(BackendError::ProcessingFailed(message.clone()));
            }

            let file_name = source.file_name().unwrap().to_str().unwrap();
            let stem = naming::stem(file_name);
            let ext = naming::extension(file_name).unwrap_or("jpg");
            let dir = source.parent().unwrap();

            let mut meta = AttachmentMetadata {
                width: 800,
                height: 600,
                original_image: self.original_image.clone(),
                ..Default::default()
            };
            for (name, key) in &self.sizes {
                let file = naming::derivative_name(stem, *key, ext);
                if !self.phantom.contains(key) {
                    std::fs::write(dir.join(&file), b"stub")?;
                }
                meta.sizes.insert(
                    name.clone(),
                    SizeEntry {
                        file,
                        width: key.width,
                        height: key.height,
                        mime_type: Some("image/jpeg".to_string()),
                    },
                );
            }
            Ok(meta)
        }
    }

    #[test]
    fn stub_writes_placeholder_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo-scaled.jpg");
        std::fs::write(&source, b"src").unwrap();

        let generator = StubGenerator::with_sizes(&[("thumbnail", 150, 150)]);
        let meta = generator.generate(7, "image/jpeg", &source).unwrap();

        assert_eq!(meta.sizes["thumbnail"].file, "photo-150x150.jpg");
        assert!(tmp.path().join("photo-150x150.jpg").exists());

        let calls = generator.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].asset_id, 7);
    }

    #[test]
    fn stub_failure_is_processing_error() {
        let generator = StubGenerator::failing("decoder exploded");
        let result = generator.generate(1, "image/jpeg", Path::new("/nope/a.jpg"));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(m)) if m == "decoder exploded"));
    }
}
