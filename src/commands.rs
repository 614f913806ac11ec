//! The operations behind each `fieldstamp` subcommand.
//!
//! Each function takes paths and settings, does its work through the core,
//! and returns a value for the binary to print.

use crate::error::FieldstampError;
use crate::{io, pdf_info};
use fieldstamp_core::{
    ExportDocument, Exporter, FieldKey, MigrationWarning, PdfInfo, PositionVersion, Resolver,
    ResolverConfig, StampPlan, collection, keys, migration,
};
use std::collections::HashSet;
use std::path::Path;

/// Outcome of migrating a descriptor file.
#[derive(Debug)]
pub struct MigrateOutcome {
    pub document: ExportDocument,
    pub warnings: Vec<MigrationWarning>,
}

/// Migrates legacy descriptors into a new export document.
///
/// Positions are normalized to `target` before export, so descriptors that
/// mix versioned and unversioned positions still produce a uniform
/// document. Without a PDF, page info is derived from the highest page
/// any field uses.
pub fn migrate(
    descriptors_path: &Path,
    pdf_path: Option<&Path>,
    target: PositionVersion,
    exporter: &Exporter,
) -> Result<MigrateOutcome, FieldstampError> {
    let descriptors = io::load_descriptors(descriptors_path)?;
    let mut result = migration::migrate_all(&descriptors)?;
    collection::normalize_positions(&mut result.fields, target);

    let pdf_info = match pdf_path {
        Some(path) => pdf_info::probe(path)?,
        None => {
            let last_page = result
                .fields
                .iter()
                .flat_map(|f| std::iter::once(f.page).chain(f.mappings().iter().map(|m| m.page)))
                .max()
                .unwrap_or(1);
            PdfInfo::new("", last_page)
        }
    };

    for field in &result.fields {
        if !pdf_info.contains_page(field.page) {
            log::warn!(
                "Field '{}' is on page {} but the PDF has {} page(s)",
                field.key,
                field.page,
                pdf_info.page_count
            );
        }
    }

    let document = exporter.serialize(&result.fields, pdf_info, None)?;
    Ok(MigrateOutcome {
        document,
        warnings: result.warnings,
    })
}

/// Loads and fully validates a schema, returning its field count.
pub fn validate(schema_path: &Path, exporter: &Exporter) -> Result<usize, FieldstampError> {
    let doc = io::load_document(schema_path, exporter)?;
    let fields = exporter.deserialize(&doc)?;
    Ok(fields.len())
}

/// Resolves a data file against a schema into a stamp plan.
pub fn resolve(
    schema_path: &Path,
    data_path: &Path,
    exporter: &Exporter,
    config: ResolverConfig,
) -> Result<StampPlan, FieldstampError> {
    let doc = io::load_document(schema_path, exporter)?;
    let fields = exporter.deserialize(&doc)?;
    let data = io::load_data(data_path)?;
    Ok(Resolver::new(config).resolve_document(&fields, &data)?)
}

/// The next free key for `prefix`, given the keys of an optional schema.
pub fn new_key(
    prefix: &str,
    schema_path: Option<&Path>,
    exporter: &Exporter,
) -> Result<FieldKey, FieldstampError> {
    let prefix_key = keys::parse_key(prefix)?;
    let existing: HashSet<FieldKey> = match schema_path {
        Some(path) => {
            let doc = io::load_document(path, exporter)?;
            collection::key_set(&exporter.deserialize(&doc)?)
        }
        None => HashSet::new(),
    };
    Ok(keys::generate_unique(prefix_key.as_str(), &existing))
}
