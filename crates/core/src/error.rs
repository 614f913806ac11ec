//! Error types for every operation of the core.
//!
//! Each concern gets its own enum so callers can match on exactly the
//! outcomes an operation can produce. Migration warnings are not errors and
//! live in [`crate::migration`].

use fieldstamp_types::PositionVersion;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("Invalid field key: '{0}'")]
    InvalidKey(String),
    #[error("Field key '{0}' is already in use")]
    DuplicateKey(String),
    #[error("Field key '{key}' collides with nested path '{other}'")]
    PathCollision { key: String, other: String },
}

/// Structural problems with a single field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Field '{key}': {source}")]
    Key {
        key: String,
        #[source]
        source: KeyError,
    },
    #[error("Field '{0}' has variant 'options' but no option mappings")]
    MissingOptions(String),
    #[error("Field '{key}' declares option '{option}' more than once")]
    DuplicateOption { key: String, option: String },
    #[error("Field '{key}', option '{option}': render type 'custom' requires custom text")]
    MissingCustomText { key: String, option: String },
    #[error("Field '{key}', option '{option}': custom text is only allowed for render type 'custom'")]
    UnexpectedCustomText { key: String, option: String },
    #[error("Field '{0}' is on page 0; pages are numbered from 1")]
    InvalidPage(String),
    #[error("Field '{key}' declares {declared} placements but needs {expected}")]
    PlacementCount {
        key: String,
        declared: u32,
        expected: u32,
    },
}

/// A collection holds positions anchored in more than one way.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("Positions mix versions '{}' and '{}'", .first.as_str(), .second.as_str())]
pub struct MixedVersions {
    pub first: PositionVersion,
    pub second: PositionVersion,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    #[error("Legacy descriptor key '{0}' cannot be turned into a valid field key")]
    InvalidKey(String),
    #[error("Legacy field '{key}' declares option '{option}' more than once")]
    DuplicateOptionKey { key: String, option: String },
}

/// Why a field could not be turned into stamp actions for a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Field '{key}' has no option '{option}'")]
    UnknownOption { key: String, option: String },
    #[error("Field '{key}', option '{option}' has no placement yet")]
    MissingPlacement { key: String, option: String },
    #[error("Field '{key}' expects {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },
    #[error("Field is invalid: {0}")]
    InvalidField(#[from] ModelError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Schema version '{found}' is newer than the supported major version {supported}")]
    SchemaVersionError { found: String, supported: u32 },
    #[error("Malformed export document: {0}")]
    MalformedDocument(String),
    #[error(transparent)]
    MixedPositionVersions(#[from] MixedVersions),
    #[error("Invalid field collection: {0}")]
    InvalidField(#[from] ModelError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
