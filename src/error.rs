// src/error.rs
//! The umbrella error for file-level operations.

use fieldstamp_core::{ExportError, KeyError, MigrationError, ModelError, ResolutionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldstampError {
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("Invalid field: {0}")]
    Model(#[from] ModelError),
    #[error("Migration failed: {0}")]
    Migration(#[from] MigrationError),
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("PDF processing error: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for FieldstampError {
    fn from(e: lopdf::Error) -> Self {
        FieldstampError::Pdf(e.to_string())
    }
}
