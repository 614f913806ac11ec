//! Field descriptors in the shapes import producers and older schemas emit.
//!
//! These are plain data; [`crate::migration`] turns them into
//! [`crate::model::FieldModel`]s.

use crate::model::FieldType;
use fieldstamp_types::{Position, PositionVersion, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_page() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_field_type() -> FieldType {
    FieldType::Text
}

/// A plain field: one key, one placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFlatField {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: FieldType,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Option<Size>,
    /// Example data; its shape decides the field's structure.
    #[serde(default)]
    pub sample_value: Option<Value>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub font_size: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyActionType {
    /// Stamp the option's label.
    FillLabel,
    /// Stamp the action's custom text.
    FillCustom,
    Checkmark,
}

/// A page-tagged point. Legacy actions never carried a version marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyPagePoint {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl LegacyPagePoint {
    pub fn to_position(self) -> Position {
        Position::new(self.x, self.y, PositionVersion::BottomEdge)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAction {
    #[serde(rename = "type")]
    pub action_type: LegacyActionType,
    pub position: LegacyPagePoint,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub custom_text: Option<String>,
    #[serde(default)]
    pub font_size: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyOption {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub actions: Vec<FieldAction>,
}

/// An exclusive choice among labeled options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyLogicField {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub options: Vec<LegacyOption>,
}

/// A true/false field with separate actions for each branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyBooleanField {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub true_actions: Vec<FieldAction>,
    #[serde(default)]
    pub false_actions: Vec<FieldAction>,
}

/// Any legacy descriptor, tagged by `kind` in mixed import lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LegacyDescriptor {
    Field(LegacyFlatField),
    Logic(LegacyLogicField),
    Boolean(LegacyBooleanField),
}

impl LegacyDescriptor {
    pub fn key(&self) -> &str {
        match self {
            LegacyDescriptor::Field(f) => &f.key,
            LegacyDescriptor::Logic(f) => &f.key,
            LegacyDescriptor::Boolean(f) => &f.key,
        }
    }
}
