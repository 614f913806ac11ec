//! Conversion of legacy descriptors into [`FieldModel`]s.
//!
//! All conversions are pure: the same descriptor always yields an
//! isomorphic field list (ids aside) and the same ordered warnings. Lossy
//! steps never fail; they leave a [`MigrationWarning`] in the result.

use crate::error::MigrationError;
use crate::keys;
use crate::legacy::{
    FieldAction, LegacyActionType, LegacyBooleanField, LegacyDescriptor, LegacyFlatField,
    LegacyLogicField,
};
use crate::model::{FieldModel, FieldType, OptionMapping, RenderType, Structure};
use fieldstamp_types::FieldKey;
use itertools::Itertools;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Option key used for the `true` branch of a boolean field.
pub const TRUE_OPTION: &str = "true";
/// Option key used for the `false` branch of a boolean field.
pub const FALSE_OPTION: &str = "false";

#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    /// The option has no action, so it has nowhere to stamp.
    MissingPlacement { option: String },
    /// Only the first action of the option was kept.
    DroppedActions { option: String, dropped: usize },
    /// An object-shaped field was expanded into these keys.
    Flattened { keys: Vec<String> },
    /// The legacy key was not a valid key and was rewritten.
    KeySanitized { original: String },
    /// A property of an object sample could not become a field.
    SkippedProperty { property: String, reason: &'static str },
    /// A `fillCustom` action carried no text.
    EmptyCustomText { option: String },
}

/// A non-fatal notice about information lost or altered during migration.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationWarning {
    pub key: String,
    pub kind: WarningKind,
}

impl fmt::Display for MigrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.key)?;
        match &self.kind {
            WarningKind::MissingPlacement { option } => {
                write!(f, "option {} has no placement", option)
            }
            WarningKind::DroppedActions { option, dropped } => write!(
                f,
                "option {} has {} extra action(s) that were dropped",
                option, dropped
            ),
            WarningKind::Flattened { keys } => {
                write!(f, "object field flattened into {}", keys.iter().join(", "))
            }
            WarningKind::KeySanitized { original } => {
                write!(f, "key '{}' was sanitized", original)
            }
            WarningKind::SkippedProperty { property, reason } => {
                write!(f, "property '{}' skipped: {}", property, reason)
            }
            WarningKind::EmptyCustomText { option } => {
                write!(f, "option {} uses custom text but none was given", option)
            }
        }
    }
}

/// Fields produced by a migration plus the warnings raised on the way.
#[derive(Debug, Clone, Default)]
pub struct Migration {
    pub fields: Vec<FieldModel>,
    pub warnings: Vec<MigrationWarning>,
}

impl Migration {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn warn(&mut self, key: &str, kind: WarningKind) {
        let warning = MigrationWarning {
            key: key.to_string(),
            kind,
        };
        log::warn!("Migration: {}", warning);
        self.warnings.push(warning);
    }

    fn append(&mut self, other: Migration) {
        self.fields.extend(other.fields);
        self.warnings.extend(other.warnings);
    }
}

fn migrate_key(raw: &str, out: &mut Migration) -> Result<FieldKey, MigrationError> {
    if keys::is_valid(raw) {
        return Ok(FieldKey::from(raw));
    }
    let sanitized = keys::sanitize(raw);
    if sanitized.is_empty() {
        return Err(MigrationError::InvalidKey(raw.to_string()));
    }
    out.warn(
        &sanitized,
        WarningKind::KeySanitized {
            original: raw.to_string(),
        },
    );
    Ok(FieldKey::from(sanitized))
}

/// Structure implied by a sample value. Empty objects have no leaves and
/// stay simple.
fn infer_structure(sample: Option<&Value>) -> Structure {
    match sample {
        Some(Value::Array(_)) => Structure::Array,
        Some(Value::Object(map)) if !map.is_empty() => Structure::Object,
        _ => Structure::Simple,
    }
}

/// Converts a plain field. Object samples expand into one field per leaf
/// property, keyed `parent.child`, in the sample's property order; the
/// parent itself is not emitted.
pub fn from_field(field: &LegacyFlatField) -> Result<Migration, MigrationError> {
    let mut out = Migration::default();
    let key = migrate_key(&field.key, &mut out)?;

    match field.sample_value.as_ref() {
        Some(Value::Object(map)) if !map.is_empty() => {
            log::debug!("Flattening object field '{}'", key);
            let mut seen = HashSet::new();
            flatten_into(field, &key, map, &mut seen, &mut out);
            let flattened = out.fields.iter().map(|f| f.key.to_string()).collect();
            out.warn(key.as_str(), WarningKind::Flattened { keys: flattened });
        }
        sample => {
            let structure = infer_structure(sample);
            out.fields.push(leaf_field(field, key, structure));
        }
    }
    Ok(out)
}

fn leaf_field(template: &LegacyFlatField, key: FieldKey, structure: Structure) -> FieldModel {
    let mut model = FieldModel::single(key, template.field_type, template.page, template.position);
    model.structure = structure;
    model.label = template.label.clone();
    model.size = template.size;
    model.enabled = template.enabled;
    model.font_size = template.font_size;
    model
}

fn flatten_into(
    template: &LegacyFlatField,
    parent: &FieldKey,
    properties: &Map<String, Value>,
    seen: &mut HashSet<String>,
    out: &mut Migration,
) {
    for (name, value) in properties {
        let segment = keys::sanitize(name);
        if segment.is_empty() {
            out.warn(
                parent.as_str(),
                WarningKind::SkippedProperty {
                    property: name.clone(),
                    reason: "name has no usable key characters",
                },
            );
            continue;
        }
        let child = parent.child(&segment);
        if !seen.insert(child.to_string()) {
            out.warn(
                parent.as_str(),
                WarningKind::SkippedProperty {
                    property: name.clone(),
                    reason: "key collides with a sibling property",
                },
            );
            continue;
        }

        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_into(template, &child, nested, seen, out);
            }
            leaf => {
                let structure = infer_structure(Some(leaf));
                let mut model = leaf_field(template, child, structure);
                model.label = Some(name.clone());
                out.fields.push(model);
            }
        }
    }
}

/// Builds one option's mapping from its action list, keeping the first
/// action as the representative placement.
fn mapping_from_actions(
    field_key: &str,
    option_key: &str,
    label: Option<&str>,
    actions: &[FieldAction],
    out: &mut Migration,
) -> OptionMapping {
    let Some(first) = actions.first() else {
        out.warn(
            field_key,
            WarningKind::MissingPlacement {
                option: option_key.to_string(),
            },
        );
        let mut mapping = OptionMapping::new(option_key, RenderType::Text);
        mapping.label = label.map(str::to_string);
        return mapping;
    };

    if actions.len() > 1 {
        out.warn(
            field_key,
            WarningKind::DroppedActions {
                option: option_key.to_string(),
                dropped: actions.len() - 1,
            },
        );
    }

    let render_type = match first.action_type {
        LegacyActionType::FillLabel => RenderType::Text,
        LegacyActionType::Checkmark => RenderType::Checkmark,
        LegacyActionType::FillCustom => RenderType::Custom,
    };

    let mut mapping = OptionMapping::new(option_key, render_type)
        .at(first.position.page, first.position.to_position());
    mapping.label = label.map(str::to_string);
    mapping.size = first.size;
    mapping.font_size = first.font_size;
    if render_type == RenderType::Custom {
        let text = first.custom_text.clone().unwrap_or_else(|| {
            out.warn(
                field_key,
                WarningKind::EmptyCustomText {
                    option: option_key.to_string(),
                },
            );
            String::new()
        });
        mapping.custom_text = Some(text);
    }
    mapping
}

/// Converts an exclusive-choice logic field into an options field with
/// `multi_select = false`.
pub fn from_logic_field(field: &LegacyLogicField) -> Result<Migration, MigrationError> {
    let mut out = Migration::default();
    let key = migrate_key(&field.key, &mut out)?;

    if let Some(duplicate) = field.options.iter().map(|o| o.key.as_str()).duplicates().next() {
        return Err(MigrationError::DuplicateOptionKey {
            key: field.key.clone(),
            option: duplicate.to_string(),
        });
    }

    let mappings = field
        .options
        .iter()
        .map(|option| {
            mapping_from_actions(
                key.as_str(),
                &option.key,
                option.label.as_deref(),
                &option.actions,
                &mut out,
            )
        })
        .collect();

    log::debug!(
        "Migrated logic field '{}' with {} option(s)",
        key,
        field.options.len()
    );
    let mut model = FieldModel::with_options(key, FieldType::Logic, mappings, false);
    model.label = field.label.clone();
    out.fields.push(model);
    Ok(out)
}

/// Converts a boolean field into an options field with the synthetic
/// options `"true"` and `"false"`.
pub fn from_boolean_field(field: &LegacyBooleanField) -> Result<Migration, MigrationError> {
    let mut out = Migration::default();
    let key = migrate_key(&field.key, &mut out)?;

    let mappings = vec![
        mapping_from_actions(key.as_str(), TRUE_OPTION, None, &field.true_actions, &mut out),
        mapping_from_actions(key.as_str(), FALSE_OPTION, None, &field.false_actions, &mut out),
    ];

    log::debug!("Migrated boolean field '{}'", key);
    let mut model = FieldModel::with_options(key, FieldType::Checkbox, mappings, true);
    model.label = field.label.clone();
    out.fields.push(model);
    Ok(out)
}

pub fn migrate(descriptor: &LegacyDescriptor) -> Result<Migration, MigrationError> {
    match descriptor {
        LegacyDescriptor::Field(f) => from_field(f),
        LegacyDescriptor::Logic(f) => from_logic_field(f),
        LegacyDescriptor::Boolean(f) => from_boolean_field(f),
    }
}

/// Migrates a mixed list, concatenating fields and warnings in input order.
/// Stops at the first fatal error.
pub fn migrate_all(descriptors: &[LegacyDescriptor]) -> Result<Migration, MigrationError> {
    let mut out = Migration::default();
    for descriptor in descriptors {
        out.append(migrate(descriptor)?);
    }
    log::info!(
        "Migrated {} descriptor(s) into {} field(s) with {} warning(s)",
        descriptors.len(),
        out.fields.len(),
        out.warnings.len()
    );
    Ok(out)
}
