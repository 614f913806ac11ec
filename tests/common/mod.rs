#![allow(dead_code)]

pub mod fixtures;

use std::io::Write;
use tempfile::NamedTempFile;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Writes JSON to a temporary file that lives as long as the handle.
pub fn temp_json(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(value.to_string().as_bytes())
        .expect("write temp file");
    file
}
