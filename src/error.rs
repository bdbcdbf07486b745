use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for lmsmeta operations.
///
/// Extraction itself is total: absent attributes and malformed optional
/// numbers resolve to defaults. Errors only surface at the edges (file I/O,
/// XML parsing, configuration) or when the caller hands over a tree without
/// the structure an image node must have.
#[derive(Debug, Error)]
pub enum LmsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse XML from {path}: {message}")]
    XmlParse { path: PathBuf, message: String },

    #[error("Missing <{element}> in {context}")]
    MissingElement { element: String, context: String },

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
