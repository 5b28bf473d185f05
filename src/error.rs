//! Error types for pagestruct library.

use std::io;
use thiserror::Error;

/// Result type alias for pagestruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structural analysis.
///
/// Nothing inside the analysis pipeline itself is fatal: per-line and
/// per-page problems are logged and recorded in the quality report. These
/// variants surface only from configuration, input decoding and I/O.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input or configuration JSON could not be decoded or encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A pattern built from configuration failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The upstream extractor failed for a single page.
    #[error("Extraction failed for page {page}: {reason}")]
    PageExtraction {
        /// 0-based page index
        page: usize,
        /// Reason reported by the extractor
        reason: String,
    },

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}
