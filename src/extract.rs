//! Input materialization
//!
//! Turns the CLI input path into a directory of images. A directory is
//! used in place; a ZIP archive is extracted into a scoped temporary
//! directory that is deleted when the run ends, whichever way it ends.

use crate::error::{AnalysisError, DiscoveryError};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The image root for a run. Holding the `Extracted` variant keeps the
/// temporary directory alive; dropping it removes the extracted files.
#[derive(Debug)]
pub enum InputRoot {
    Directory(PathBuf),
    Extracted(TempDir),
}

impl InputRoot {
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) => path,
            Self::Extracted(dir) => dir.path(),
        }
    }
}

/// Materialize `input` into an image root.
pub fn materialize_input(input: &Path) -> Result<InputRoot, AnalysisError> {
    if input.is_dir() {
        return Ok(InputRoot::Directory(input.to_path_buf()));
    }
    if !input.is_file() {
        return Err(DiscoveryError::InvalidRoot(input.to_path_buf()).into());
    }

    let file = File::open(input).map_err(|e| AnalysisError::Archive {
        path: input.to_path_buf(),
        source: zip::result::ZipError::Io(e),
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| match source {
        // A regular file that is not a ZIP is a bad input, not a corrupt
        // archive.
        zip::result::ZipError::InvalidArchive(_) => {
            AnalysisError::from(DiscoveryError::InvalidRoot(input.to_path_buf()))
        }
        other => AnalysisError::Archive {
            path: input.to_path_buf(),
            source: other,
        },
    })?;

    let dir = TempDir::new().map_err(|e| AnalysisError::Archive {
        path: input.to_path_buf(),
        source: zip::result::ZipError::Io(e),
    })?;
    tracing::info!(
        "extracting {} into temporary directory {}",
        input.display(),
        dir.path().display()
    );
    archive
        .extract(dir.path())
        .map_err(|source| AnalysisError::Archive {
            path: input.to_path_buf(),
            source,
        })?;

    Ok(InputRoot::Extracted(dir))
}
