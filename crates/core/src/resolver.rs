//! Resolution of a field and a runtime value into page-bound stamp actions.
//!
//! Resolution is a pure function of the field, the value and the
//! [`ResolverConfig`]. Positions are emitted in the version they carry
//! unless the config names a target version, in which case every emitted
//! position passes through one conversion step.

use crate::config::ResolverConfig;
use crate::error::ResolutionError;
use crate::model::{FieldModel, FieldVariant, OptionMapping, RenderType, Structure, ValueShape};
use fieldstamp_types::{FieldKey, Position, ResourceUri, Size};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// What gets drawn at a stamp position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum StampContent {
    Text(String),
    Checkmark,
    /// Literal text configured on an option.
    Custom(String),
    /// A checkbox state.
    Boolean(bool),
    /// Image or signature content.
    Binary(ResourceUri),
}

/// One instruction for the PDF writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampAction {
    pub key: FieldKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    pub page: u32,
    pub position: Position,
    pub size: Size,
    pub content: StampContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

/// Stamp actions for a whole document, grouped by page in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StampPlan {
    pub pages: BTreeMap<u32, Vec<StampAction>>,
}

impl StampPlan {
    pub fn actions_for_page(&self, page: u32) -> &[StampAction] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &StampAction> {
        self.pages.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, action: StampAction) {
        self.pages.entry(action.page).or_default().push(action);
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

/// Text form of a scalar, used both for option keys and text stamping.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Looks a dotted key up in a data object: first as a literal member, then
/// as a nested path.
pub fn lookup<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(key) {
        return Some(value);
    }
    key.split('.')
        .try_fold(data, |current, segment| current.get(segment))
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves one field for one value.
    ///
    /// Disabled fields and null values resolve to no actions. Options fields
    /// emit actions in mapping order, never input order.
    pub fn resolve(
        &self,
        field: &FieldModel,
        value: &Value,
    ) -> Result<Vec<StampAction>, ResolutionError> {
        if !field.enabled {
            log::debug!("Field '{}' is disabled, nothing to stamp", field.key);
            return Ok(Vec::new());
        }
        if value.is_null() {
            return Ok(Vec::new());
        }
        field.validate()?;

        match &field.variant {
            FieldVariant::Single => Ok(vec![self.single_action(field, value)?]),
            FieldVariant::Options {
                mappings,
                multi_select: false,
            } => {
                let option = scalar_text(value).ok_or_else(|| ResolutionError::TypeMismatch {
                    key: field.key.to_string(),
                    expected: "an option key",
                    found: describe(value),
                })?;
                let mapping = mappings
                    .iter()
                    .find(|m| m.option_key == option)
                    .ok_or_else(|| ResolutionError::UnknownOption {
                        key: field.key.to_string(),
                        option: option.clone(),
                    })?;
                Ok(vec![self.option_action(field, mapping)?])
            }
            FieldVariant::Options {
                mappings,
                multi_select: true,
            } => {
                let selected = self.selected_options(field, value)?;
                mappings
                    .iter()
                    .filter(|m| selected.contains(m.option_key.as_str()))
                    .map(|m| self.option_action(field, m))
                    .collect()
            }
        }
    }

    /// Resolves every field against a data object, looking each key up as
    /// a (possibly dotted) path. Fields without a value are skipped.
    pub fn resolve_document(
        &self,
        fields: &[FieldModel],
        data: &Value,
    ) -> Result<StampPlan, ResolutionError> {
        let mut plan = StampPlan::default();
        for field in fields {
            let Some(value) = lookup(data, field.key.as_str()) else {
                log::debug!("No value for field '{}'", field.key);
                continue;
            };
            for action in self.resolve(field, value)? {
                plan.push(action);
            }
        }
        log::info!(
            "Resolved {} field(s) into {} stamp action(s) on {} page(s)",
            fields.len(),
            plan.len(),
            plan.pages.len()
        );
        Ok(plan)
    }

    fn selected_options(
        &self,
        field: &FieldModel,
        value: &Value,
    ) -> Result<HashSet<String>, ResolutionError> {
        let requested: Vec<String> = match value {
            Value::Bool(b) => vec![b.to_string()],
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    scalar_text(item).ok_or_else(|| ResolutionError::TypeMismatch {
                        key: field.key.to_string(),
                        expected: "an array of option keys",
                        found: format!("array containing {}", describe(item)),
                    })
                })
                .collect::<Result<_, _>>()?,
            other => {
                return Err(ResolutionError::TypeMismatch {
                    key: field.key.to_string(),
                    expected: "an array of option keys",
                    found: describe(other),
                });
            }
        };

        if let Some(unknown) = requested.iter().find(|k| field.option(k).is_none()) {
            return Err(ResolutionError::UnknownOption {
                key: field.key.to_string(),
                option: unknown.clone(),
            });
        }
        Ok(requested.into_iter().collect())
    }

    fn single_action(
        &self,
        field: &FieldModel,
        value: &Value,
    ) -> Result<StampAction, ResolutionError> {
        let mismatch = |expected: &'static str| ResolutionError::TypeMismatch {
            key: field.key.to_string(),
            expected,
            found: describe(value),
        };

        let (content, font_size) = match field.field_type.value_shape() {
            ValueShape::Text => {
                let text = match value {
                    Value::Array(items) if field.structure == Structure::Array => items
                        .iter()
                        .map(scalar_text)
                        .collect::<Option<Vec<_>>>()
                        .map(|parts| parts.join(&self.config.array_separator))
                        .ok_or_else(|| mismatch("an array of scalars"))?,
                    other => scalar_text(other).ok_or_else(|| mismatch("text"))?,
                };
                (StampContent::Text(text), Some(self.font_size(field.font_size)))
            }
            ValueShape::Boolean => {
                let checked = match value {
                    Value::Bool(b) => *b,
                    Value::String(s) if s == "true" => true,
                    Value::String(s) if s == "false" => false,
                    _ => return Err(mismatch("a boolean")),
                };
                (StampContent::Boolean(checked), None)
            }
            ValueShape::Binary => match value {
                Value::String(s) if !s.is_empty() => {
                    (StampContent::Binary(ResourceUri::from(s.as_str())), None)
                }
                _ => return Err(mismatch("a binary reference")),
            },
        };

        let size = field.effective_size();
        Ok(StampAction {
            key: field.key.clone(),
            option: None,
            page: field.page,
            position: self.place(field.position, size),
            size,
            content,
            font_size,
        })
    }

    fn option_action(
        &self,
        field: &FieldModel,
        mapping: &OptionMapping,
    ) -> Result<StampAction, ResolutionError> {
        let position = mapping
            .position
            .ok_or_else(|| ResolutionError::MissingPlacement {
                key: field.key.to_string(),
                option: mapping.option_key.clone(),
            })?;
        let size = field.option_size(mapping);
        let font_size = mapping.font_size.or(field.font_size);

        let (content, font_size) = match mapping.render_type {
            RenderType::Text => {
                let label = mapping.label.as_ref().unwrap_or(&mapping.option_key);
                (StampContent::Text(label.clone()), Some(self.font_size(font_size)))
            }
            RenderType::Checkmark => (StampContent::Checkmark, None),
            RenderType::Custom => (
                StampContent::Custom(mapping.custom_text.clone().unwrap_or_default()),
                Some(self.font_size(font_size)),
            ),
        };

        Ok(StampAction {
            key: field.key.clone(),
            option: Some(mapping.option_key.clone()),
            page: mapping.page,
            position: self.place(position, size),
            size,
            content,
            font_size,
        })
    }

    fn font_size(&self, explicit: Option<f32>) -> f32 {
        explicit.unwrap_or(self.config.default_font_size)
    }

    /// The single point where positions are converted to the plan version.
    fn place(&self, position: Position, size: Size) -> Position {
        match self.config.target_version {
            Some(target) => position.to_version(target, size.height),
            None => position,
        }
    }
}

/// Resolves with the default configuration.
pub fn resolve(field: &FieldModel, value: &Value) -> Result<Vec<StampAction>, ResolutionError> {
    Resolver::default().resolve(field, value)
}
