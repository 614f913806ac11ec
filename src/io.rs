//! Reading and writing the JSON files the command line works with.

use crate::error::FieldstampError;
use fieldstamp_core::{ExportDocument, Exporter, LegacyDescriptor};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

fn read_file(path: &Path, what: &str) -> Result<String, FieldstampError> {
    fs::read_to_string(path).map_err(|e| {
        FieldstampError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read {} from '{}': {}", what, path.display(), e),
        ))
    })
}

/// Loads legacy descriptors. The file holds either one tagged descriptor or
/// an array of them.
pub fn load_descriptors(path: &Path) -> Result<Vec<LegacyDescriptor>, FieldstampError> {
    let source = read_file(path, "descriptors")?;
    let value: Value = serde_json::from_str(&source)?;
    let descriptors = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(descriptors)
}

pub fn load_document(path: &Path, exporter: &Exporter) -> Result<ExportDocument, FieldstampError> {
    let source = read_file(path, "schema")?;
    Ok(exporter.from_json(&source)?)
}

pub fn write_document(
    path: &Path,
    doc: &ExportDocument,
    exporter: &Exporter,
) -> Result<(), FieldstampError> {
    let json = exporter.to_json(doc)?;
    fs::write(path, json)?;
    log::info!("Wrote schema to {}", path.display());
    Ok(())
}

/// Loads the data object values are resolved from.
pub fn load_data(path: &Path) -> Result<Value, FieldstampError> {
    let source = read_file(path, "data")?;
    Ok(serde_json::from_str(&source)?)
}
