//! Error taxonomy for the analysis pipeline
//!
//! Split by where an error terminates: `ServiceError` stays inside the
//! inference client's retry loop until attempts are exhausted, everything
//! in `AnalysisError` aborts or degrades a run. Ledger write failures are
//! deliberately not modeled here; they are logged and swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn the input root into a non-empty, ordered image sequence.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The input path is neither a directory nor a readable ZIP archive.
    #[error("input path is neither a directory nor a ZIP archive: {0}")]
    InvalidRoot(PathBuf),

    /// The root exists but contains no supported image files.
    #[error("no supported images found under {0}")]
    NoImages(PathBuf),
}

/// A single remote-call failure, classified for the retry policy.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("request to inference endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status with the response body for diagnostics.
    #[error("inference endpoint returned HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The endpoint answered but produced no usable text. Treated the same
    /// as a transient failure: the next attempt may yield a real result.
    #[error("inference endpoint returned an empty result")]
    EmptyResponse,
}

impl ServiceError {
    /// Whether the retry policy should attempt this call again.
    ///
    /// Rate limiting and server-side errors are transient; any other HTTP
    /// status (auth failures, bad requests) will not improve with retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::EmptyResponse => true,
            Self::Http { status, .. } => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }
}

/// Top-level error for a run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// ZIP extraction of the input archive failed.
    #[error("failed to extract archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An image could not be read during actual encoding.
    #[error("failed to read image {path}: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to initialize inference client: {0}")]
    Client(ServiceError),

    /// The inference client exhausted its retries (or hit a non-retryable
    /// error) on a batch that had no prior context to fall back on.
    #[error("batch {batch} failed terminally: {source}")]
    Inference {
        /// 1-based batch number, for operator-facing messages.
        batch: usize,
        #[source]
        source: ServiceError,
    },

    /// The final report file could not be written.
    #[error("failed to write report to {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
