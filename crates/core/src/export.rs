//! The persisted schema format and its conversion to and from fields.
//!
//! Every exported field carries both the flat `options` key list and the
//! full `optionMappings` geometry, so a document round-trips without loss.
//! Documents that only have `options` (older minimal exports) are still
//! read; their options come back unplaced.

use crate::collection;
use crate::config::{CURRENT_FORMAT_MAJOR, CURRENT_FORMAT_MINOR, ExportConfig};
use crate::error::ExportError;
use crate::model::{
    FieldModel, FieldType, FieldVariant, OptionMapping, RenderType, Structure, VariantKind,
};
use chrono::{DateTime, Utc};
use fieldstamp_types::{FieldId, FieldKey, PdfInfo, Position, PositionVersion, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_simple(structure: &Structure) -> bool {
    *structure == Structure::Simple
}

/// A position as written to disk. The version is optional on read so that
/// documents predating versioned positions still parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPoint {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_version: Option<PositionVersion>,
}

impl ExportPoint {
    fn from_position(position: Position) -> Self {
        Self {
            x: position.x,
            y: position.y,
            position_version: Some(position.version),
        }
    }

    fn to_position(self, document_version: Option<PositionVersion>) -> Position {
        let version = self
            .position_version
            .or(document_version)
            .unwrap_or_default();
        Position::new(self.x, self.y, version)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionMappingExport {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ExportPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default)]
    pub render_type: RenderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

fn default_page() -> u32 {
    1
}

/// Export shape of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedFieldExport {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub variant: VariantKind,
    #[serde(default, skip_serializing_if = "is_simple")]
    pub structure: Structure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub page: u32,
    pub position: ExportPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    pub placement_count: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub multi_select: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_mappings: Option<Vec<OptionMappingExport>>,
}

/// The versioned, persisted schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pdf_info: PdfInfo,
    /// Version shared by every position. Absent in legacy documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_version: Option<PositionVersion>,
    pub fields: Vec<UnifiedFieldExport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Deprecated. Accepted on read, never written.
    #[serde(default, skip_serializing)]
    pub conditionals: Option<Value>,
}

impl ExportDocument {
    /// Marks the document as modified now, keeping its creation time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Parses a `MAJOR.MINOR` version string. A bare `MAJOR` is accepted.
pub fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(minor) => minor.parse().ok()?,
        None => 0,
    };
    Some((major, minor))
}

fn mapping_to_export(mapping: &OptionMapping) -> OptionMappingExport {
    OptionMappingExport {
        key: mapping.option_key.clone(),
        label: mapping.label.clone(),
        page: mapping.page,
        position: mapping.position.map(ExportPoint::from_position),
        size: mapping.size,
        render_type: mapping.render_type,
        custom_text: mapping.custom_text.clone(),
        font_size: mapping.font_size,
    }
}

fn mapping_from_export(
    export: &OptionMappingExport,
    document_version: Option<PositionVersion>,
) -> OptionMapping {
    OptionMapping {
        option_key: export.key.clone(),
        label: export.label.clone(),
        page: export.page,
        position: export.position.map(|p| p.to_position(document_version)),
        size: export.size,
        render_type: export.render_type,
        custom_text: export.custom_text.clone(),
        font_size: export.font_size,
    }
}

fn field_to_export(field: &FieldModel) -> UnifiedFieldExport {
    let (options, option_mappings) = match &field.variant {
        FieldVariant::Single => (None, None),
        FieldVariant::Options { mappings, .. } => (
            Some(mappings.iter().map(|m| m.option_key.clone()).collect()),
            Some(mappings.iter().map(mapping_to_export).collect()),
        ),
    };
    UnifiedFieldExport {
        key: field.key.to_string(),
        field_type: field.field_type,
        variant: field.variant_kind(),
        structure: field.structure,
        label: field.label.clone(),
        page: field.page,
        position: ExportPoint::from_position(field.position),
        size: field.size,
        placement_count: field.placement_count,
        enabled: field.enabled,
        multi_select: field.is_multi_select(),
        font_size: field.font_size,
        options,
        option_mappings,
    }
}

fn field_from_export(
    export: &UnifiedFieldExport,
    document_version: Option<PositionVersion>,
) -> Result<FieldModel, ExportError> {
    let variant = match export.variant {
        VariantKind::Single => {
            if export.options.is_some() || export.option_mappings.is_some() {
                return Err(ExportError::MalformedDocument(format!(
                    "field '{}' has variant 'single' but lists options",
                    export.key
                )));
            }
            FieldVariant::Single
        }
        VariantKind::Options => {
            let mappings: Vec<OptionMapping> = match (&export.option_mappings, &export.options) {
                (Some(mappings), keys) => {
                    if let Some(keys) = keys
                        && !keys.iter().eq(mappings.iter().map(|m| &m.key))
                    {
                        return Err(ExportError::MalformedDocument(format!(
                            "field '{}' lists options that disagree with its option mappings",
                            export.key
                        )));
                    }
                    mappings
                        .iter()
                        .map(|m| mapping_from_export(m, document_version))
                        .collect()
                }
                (None, Some(keys)) => keys
                    .iter()
                    .map(|key| OptionMapping::new(key.clone(), RenderType::Text))
                    .collect(),
                (None, None) => {
                    return Err(ExportError::MalformedDocument(format!(
                        "field '{}' has variant 'options' but no options",
                        export.key
                    )));
                }
            };
            FieldVariant::Options {
                mappings,
                multi_select: export.multi_select,
            }
        }
    };

    Ok(FieldModel {
        id: FieldId::generate(),
        key: FieldKey::from(export.key.as_str()),
        field_type: export.field_type,
        variant,
        structure: export.structure,
        label: export.label.clone(),
        page: export.page,
        position: export.position.to_position(document_version),
        size: export.size,
        enabled: export.enabled,
        placement_count: export.placement_count,
        font_size: export.font_size,
    })
}

/// Reads and writes [`ExportDocument`]s.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Projects a field collection into a new export document.
    ///
    /// Fails if the collection is invalid or mixes position versions.
    pub fn serialize(
        &self,
        fields: &[FieldModel],
        pdf_info: PdfInfo,
        metadata: Option<Value>,
    ) -> Result<ExportDocument, ExportError> {
        collection::validate_collection(fields)?;
        let position_version = collection::uniform_position_version(fields)?;
        let now = Utc::now();
        log::info!(
            "Serializing {} field(s) for '{}'",
            fields.len(),
            pdf_info.file_name
        );
        Ok(ExportDocument {
            version: format!("{}.{}", CURRENT_FORMAT_MAJOR, CURRENT_FORMAT_MINOR),
            created_at: now,
            updated_at: now,
            pdf_info,
            position_version,
            fields: fields.iter().map(field_to_export).collect(),
            metadata,
            conditionals: None,
        })
    }

    /// Rebuilds fields from a document. All-or-nothing: any invalid field
    /// fails the whole document.
    pub fn deserialize(&self, doc: &ExportDocument) -> Result<Vec<FieldModel>, ExportError> {
        let (major, _) = parse_version(&doc.version).ok_or_else(|| {
            ExportError::MalformedDocument(format!("unreadable version '{}'", doc.version))
        })?;
        if major > self.config.supported_major {
            return Err(ExportError::SchemaVersionError {
                found: doc.version.clone(),
                supported: self.config.supported_major,
            });
        }
        if doc.conditionals.is_some() {
            log::warn!("Ignoring deprecated 'conditionals' section");
        }

        let fields = doc
            .fields
            .iter()
            .map(|f| field_from_export(f, doc.position_version))
            .collect::<Result<Vec<_>, _>>()?;
        collection::validate_collection(&fields)?;
        log::info!(
            "Loaded {} field(s) from schema version {}",
            fields.len(),
            doc.version
        );
        Ok(fields)
    }

    pub fn to_json(&self, doc: &ExportDocument) -> Result<String, ExportError> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(doc)?
        } else {
            serde_json::to_string(doc)?
        };
        Ok(json)
    }

    /// Parses a document. Missing required members are `MalformedDocument`.
    pub fn from_json(&self, json: &str) -> Result<ExportDocument, ExportError> {
        serde_json::from_str(json).map_err(|e| ExportError::MalformedDocument(e.to_string()))
    }

    /// Parses and deserializes in one step.
    pub fn load(&self, json: &str) -> Result<Vec<FieldModel>, ExportError> {
        let doc = self.from_json(json)?;
        self.deserialize(&doc)
    }
}

pub fn serialize(
    fields: &[FieldModel],
    pdf_info: PdfInfo,
    metadata: Option<Value>,
) -> Result<ExportDocument, ExportError> {
    Exporter::default().serialize(fields, pdf_info, metadata)
}

pub fn deserialize(doc: &ExportDocument) -> Result<Vec<FieldModel>, ExportError> {
    Exporter::default().deserialize(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fields() -> Vec<FieldModel> {
        let mut name = FieldModel::single(
            FieldKey::from("personal.name"),
            FieldType::Text,
            1,
            Position::top_edge(72.5, 700.25),
        );
        name.size = Some(Size::new(150.0, 18.0));
        name.font_size = Some(11.0);

        let mut agree = FieldModel::with_options(
            FieldKey::from("agree"),
            FieldType::Checkbox,
            vec![
                OptionMapping::new("true", RenderType::Checkmark).at(2, Position::top_edge(10.0, 20.0)),
                OptionMapping::new("false", RenderType::Custom)
                    .with_custom_text("N/A")
                    .at(2, Position::top_edge(30.0, 20.0)),
            ],
            true,
        );
        agree.enabled = false;

        vec![name, agree]
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let fields = sample_fields();
        let doc = serialize(&fields, PdfInfo::new("form.pdf", 2), None).unwrap();
        let restored = deserialize(&doc).unwrap();

        assert_eq!(restored.len(), fields.len());
        for (original, back) in fields.iter().zip(&restored) {
            assert_ne!(original.id, back.id);
            assert_eq!(original.key, back.key);
            assert_eq!(original.field_type, back.field_type);
            assert_eq!(original.variant, back.variant);
            assert_eq!(original.page, back.page);
            assert_eq!(original.position, back.position);
            assert_eq!(original.placement_count, back.placement_count);
            assert_eq!(original.enabled, back.enabled);
            assert_eq!(original.size, back.size);
            assert_eq!(original.font_size, back.font_size);
        }
    }

    #[test]
    fn test_round_trip_through_json() {
        let fields = sample_fields();
        let exporter = Exporter::new(ExportConfig::new().with_pretty(true));
        let doc = exporter
            .serialize(&fields, PdfInfo::new("form.pdf", 2), Some(json!({"author": "ops"})))
            .unwrap();
        let json = exporter.to_json(&doc).unwrap();
        let parsed = exporter.from_json(&json).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(exporter.load(&json).unwrap().len(), 2);
    }

    #[test]
    fn test_export_shape() {
        let doc = serialize(&sample_fields(), PdfInfo::new("form.pdf", 2), None).unwrap();
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["version"], "2.0");
        assert_eq!(value["positionVersion"], "top-edge");
        assert_eq!(value["pdfInfo"]["fileName"], "form.pdf");
        assert!(value.get("conditionals").is_none());
        assert!(value.get("metadata").is_none());

        let agree = &value["fields"][1];
        assert_eq!(agree["variant"], "options");
        assert_eq!(agree["options"], json!(["true", "false"]));
        assert_eq!(agree["placementCount"], 2);
        assert_eq!(agree["multiSelect"], true);
        assert_eq!(agree["optionMappings"][1]["renderType"], "custom");
        assert_eq!(agree["optionMappings"][1]["customText"], "N/A");

        let name = &value["fields"][0];
        assert!(name.get("options").is_none());
        assert_eq!(name["type"], "text");
    }

    #[test]
    fn test_mixed_versions_fail_serialize() {
        let mut fields = sample_fields();
        fields[0].position = Position::legacy(1.0, 1.0);
        assert!(matches!(
            serialize(&fields, PdfInfo::new("form.pdf", 2), None).unwrap_err(),
            ExportError::MixedPositionVersions(_)
        ));
    }

    #[test]
    fn test_unplaced_options_anchor_fails_serialize_until_normalized() {
        let mut fields = vec![
            FieldModel::single(
                FieldKey::from("name"),
                FieldType::Text,
                1,
                Position::top_edge(0.0, 0.0),
            ),
            FieldModel::with_options(
                FieldKey::from("pick"),
                FieldType::Logic,
                vec![OptionMapping::new("a", RenderType::Text)],
                false,
            ),
        ];
        assert!(matches!(
            serialize(&fields, PdfInfo::new("form.pdf", 1), None).unwrap_err(),
            ExportError::MixedPositionVersions(_)
        ));

        collection::normalize_positions(&mut fields, PositionVersion::TopEdge);
        let doc = serialize(&fields, PdfInfo::new("form.pdf", 1), None).unwrap();
        assert_eq!(doc.position_version, Some(PositionVersion::TopEdge));
        assert!(doc.fields.iter().all(|f| {
            f.position.position_version == doc.position_version
        }));
    }

    #[test]
    fn test_mixed_option_mapping_versions_fail_serialize() {
        let mut fields = sample_fields();
        if let FieldVariant::Options { mappings, .. } = &mut fields[1].variant {
            mappings[1].position = Some(Position::legacy(30.0, 20.0));
        }
        assert!(matches!(
            serialize(&fields, PdfInfo::new("form.pdf", 2), None).unwrap_err(),
            ExportError::MixedPositionVersions(_)
        ));
    }

    #[test]
    fn test_invalid_collection_fails_serialize() {
        let mut fields = sample_fields();
        fields[1].key = FieldKey::from("personal.name");
        assert!(matches!(
            serialize(&fields, PdfInfo::new("form.pdf", 2), None).unwrap_err(),
            ExportError::InvalidField(_)
        ));
    }

    fn legacy_document() -> Value {
        json!({
            "version": "1.3",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-02-01T00:00:00Z",
            "pdfInfo": {"fileName": "old.pdf", "pageCount": 1},
            "fields": [
                {"key": "name", "type": "text", "variant": "single", "page": 1,
                 "position": {"x": 10, "y": 20}, "placementCount": 1},
                {"key": "color", "type": "logic", "variant": "options", "page": 1,
                 "position": {"x": 0, "y": 0}, "placementCount": 2,
                 "options": ["red", "blue"]}
            ],
            "conditionals": [{"if": "name", "then": "color"}]
        })
    }

    #[test]
    fn test_reads_legacy_document() {
        let exporter = Exporter::default();
        let fields = exporter.load(&legacy_document().to_string()).unwrap();

        assert_eq!(fields[0].position, Position::legacy(10.0, 20.0));
        assert_eq!(fields[1].option_keys().collect::<Vec<_>>(), vec!["red", "blue"]);
        assert!(fields[1].mappings().iter().all(|m| !m.is_placed()));
    }

    #[test]
    fn test_conditionals_are_never_written() {
        let exporter = Exporter::default();
        let mut doc = exporter.from_json(&legacy_document().to_string()).unwrap();
        assert!(doc.conditionals.is_some());
        doc.touch();
        let json = exporter.to_json(&doc).unwrap();
        assert!(!json.contains("conditionals"));
        assert_eq!(doc.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(doc.updated_at > doc.created_at);
    }

    #[test]
    fn test_newer_major_version_rejected() {
        let mut doc = legacy_document();
        doc["version"] = json!("3.0");
        let err = Exporter::default().load(&doc.to_string()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::SchemaVersionError { supported: 2, .. }
        ));
    }

    #[test]
    fn test_malformed_documents() {
        let exporter = Exporter::default();

        let mut missing_fields = legacy_document();
        missing_fields.as_object_mut().unwrap().remove("fields");
        assert!(matches!(
            exporter.load(&missing_fields.to_string()).unwrap_err(),
            ExportError::MalformedDocument(_)
        ));

        let mut bad_version = legacy_document();
        bad_version["version"] = json!("two");
        assert!(matches!(
            exporter.load(&bad_version.to_string()).unwrap_err(),
            ExportError::MalformedDocument(_)
        ));

        let mut no_options = legacy_document();
        no_options["fields"][1].as_object_mut().unwrap().remove("options");
        assert!(matches!(
            exporter.load(&no_options.to_string()).unwrap_err(),
            ExportError::MalformedDocument(_)
        ));
    }

    #[test]
    fn test_deserialize_is_all_or_nothing() {
        let mut doc = legacy_document();
        doc["fields"][1]["placementCount"] = json!(7);
        let err = Exporter::default().load(&doc.to_string()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidField(_)));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("2.0"), Some((2, 0)));
        assert_eq!(parse_version("1"), Some((1, 0)));
        assert_eq!(parse_version("1.x"), None);
        assert_eq!(parse_version(""), None);
    }
}
