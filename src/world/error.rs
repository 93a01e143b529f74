//! Error types for world data loading.

use thiserror::Error;

use crate::navigation::NavError;

/// Errors that can occur when loading the village layout or enemy data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// Parsed data that cannot describe a playable village.
    #[error("Invalid layout '{path}': {details}")]
    InvalidLayout { path: String, details: String },

    /// Navigation grid could not be built from the layout.
    #[error(transparent)]
    Navigation(#[from] NavError),
}
