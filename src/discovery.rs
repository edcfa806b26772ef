//! Image discovery
//!
//! Enumerates the input root into a deterministic, ordered sequence of
//! image references. Order matters: CT slices are analyzed progressively,
//! so discovery order is the anatomical order of the study.

use crate::error::DiscoveryError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions accepted as CT slice images (case-insensitive).
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff"];

/// One discovered image, immutable once created.
#[derive(Debug, Clone)]
pub struct ImageRef {
    pub path: PathBuf,
    /// Raw file size in bytes, used for payload planning.
    pub size: u64,
    /// MIME type inferred from the extension; content is never sniffed.
    pub mime: String,
}

impl ImageRef {
    /// Exact length of the base64 encoding of this file: every 3 raw bytes
    /// become 4 output bytes, with the tail padded to a full group. The
    /// encoder used later produces exactly this many bytes, which keeps
    /// batch planning consistent with actual request sizes.
    pub fn estimated_encoded_len(&self) -> u64 {
        self.size.div_ceil(3) * 4
    }
}

/// Whether a file extension is on the supported image allow-list.
fn is_supported_extension(ext: Option<&str>) -> bool {
    match ext {
        Some(e) => SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()),
        None => false,
    }
}

/// Infer a MIME type from the file extension, defaulting to JPEG.
fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "image/jpeg".to_string())
}

/// Recursively discover supported images under `root`.
///
/// Entries are visited depth-first with each directory's children sorted
/// lexicographically by name, so the result is deterministic for a given
/// tree. Returns an error if nothing matched.
pub fn find_images(root: &Path) -> Result<Vec<ImageRef>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::InvalidRoot(root.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str());
        if !is_supported_extension(ext) {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        images.push(ImageRef {
            mime: mime_for(path),
            path: path.to_path_buf(),
            size,
        });
    }

    if images.is_empty() {
        return Err(DiscoveryError::NoImages(root.to_path_buf()));
    }
    Ok(images)
}
