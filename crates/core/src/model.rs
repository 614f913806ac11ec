//! The unified field model.
//!
//! Plain fields, logic fields and boolean fields all become one
//! [`FieldModel`]. What used to be a separate type is now the
//! [`FieldVariant`] discriminant: a `Single` field has one placement, an
//! `Options` field has one placement per selectable value.
//!
//! The editing surface mutates fields in place; invariants are checked on
//! read through [`FieldModel::validate`].

use crate::error::{KeyError, ModelError};
use crate::keys;
use fieldstamp_types::{FieldId, FieldKey, Position, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The kind of content a field stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Checkbox,
    RadioGroup,
    Image,
    Signature,
    CompositeText,
    Conditional,
    Logic,
}

/// The shape a runtime value must be coerced to for a `Single` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Boolean,
    Binary,
}

impl FieldType {
    /// Size used when a field has no explicit size.
    pub fn default_size(self) -> Size {
        match self {
            FieldType::Text | FieldType::Conditional => Size::new(200.0, 20.0),
            FieldType::CompositeText => Size::new(240.0, 20.0),
            FieldType::Checkbox | FieldType::RadioGroup | FieldType::Logic => Size::new(14.0, 14.0),
            FieldType::Image => Size::new(120.0, 120.0),
            FieldType::Signature => Size::new(180.0, 50.0),
        }
    }

    /// Prefix for auto-generated keys (`text_1`, `radio_2`, ...).
    pub fn key_prefix(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Checkbox => "checkbox",
            FieldType::RadioGroup => "radio",
            FieldType::Image => "image",
            FieldType::Signature => "signature",
            FieldType::CompositeText => "composite",
            FieldType::Conditional => "conditional",
            FieldType::Logic => "logic",
        }
    }

    pub fn value_shape(self) -> ValueShape {
        match self {
            FieldType::Checkbox => ValueShape::Boolean,
            FieldType::Image | FieldType::Signature => ValueShape::Binary,
            FieldType::Text
            | FieldType::RadioGroup
            | FieldType::CompositeText
            | FieldType::Conditional
            | FieldType::Logic => ValueShape::Text,
        }
    }
}

/// Discriminant of [`FieldVariant`], as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Single,
    Options,
}

/// Shape of the data bound to a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Structure {
    #[default]
    Simple,
    Array,
    /// Only meaningful on import: object fields are flattened into one
    /// sibling field per leaf property.
    Object,
}

/// What an option stamps when selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderType {
    /// The option's label.
    #[default]
    Text,
    Checkmark,
    /// The mapping's literal `custom_text`.
    Custom,
}

/// Placement metadata for one selectable value of an options field.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionMapping {
    pub option_key: String,
    pub label: Option<String>,
    pub page: u32,
    /// `None` until the option has been placed on the page.
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub render_type: RenderType,
    pub custom_text: Option<String>,
    pub font_size: Option<f32>,
}

impl OptionMapping {
    /// An unplaced mapping on page 1.
    pub fn new(option_key: impl Into<String>, render_type: RenderType) -> Self {
        Self {
            option_key: option_key.into(),
            label: None,
            page: 1,
            position: None,
            size: None,
            render_type,
            custom_text: None,
            font_size: None,
        }
    }

    pub fn at(mut self, page: u32, position: Position) -> Self {
        self.page = page;
        self.position = Some(position);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_custom_text(mut self, text: impl Into<String>) -> Self {
        self.custom_text = Some(text.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }
}

/// Per-variant payload of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldVariant {
    /// One placement at the field's own position.
    Single,
    /// Placement depends on the selected option(s).
    Options {
        mappings: Vec<OptionMapping>,
        /// More than one option may fire for one value.
        multi_select: bool,
    },
}

impl FieldVariant {
    pub fn kind(&self) -> VariantKind {
        match self {
            FieldVariant::Single => VariantKind::Single,
            FieldVariant::Options { .. } => VariantKind::Options,
        }
    }
}

/// One placeable field bound to one data key.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    pub id: FieldId,
    pub key: FieldKey,
    pub field_type: FieldType,
    pub variant: FieldVariant,
    pub structure: Structure,
    pub label: Option<String>,
    pub page: u32,
    pub position: Position,
    pub size: Option<Size>,
    pub enabled: bool,
    pub placement_count: u32,
    pub font_size: Option<f32>,
}

impl FieldModel {
    /// A single-placement field with a fresh id.
    pub fn single(key: FieldKey, field_type: FieldType, page: u32, position: Position) -> Self {
        Self {
            id: FieldId::generate(),
            key,
            field_type,
            variant: FieldVariant::Single,
            structure: Structure::Simple,
            label: None,
            page,
            position,
            size: None,
            enabled: true,
            placement_count: 1,
            font_size: None,
        }
    }

    /// An options field. Page and position are taken from the first placed
    /// mapping, falling back to the first mapping's page.
    pub fn with_options(
        key: FieldKey,
        field_type: FieldType,
        mappings: Vec<OptionMapping>,
        multi_select: bool,
    ) -> Self {
        let anchor = mappings.iter().find(|m| m.is_placed());
        let page = anchor
            .or_else(|| mappings.first())
            .map(|m| m.page)
            .unwrap_or(1);
        let position = anchor.and_then(|m| m.position).unwrap_or_default();
        Self {
            id: FieldId::generate(),
            key,
            field_type,
            placement_count: mappings.len() as u32,
            variant: FieldVariant::Options {
                mappings,
                multi_select,
            },
            structure: Structure::Simple,
            label: None,
            page,
            position,
            size: None,
            enabled: true,
            font_size: None,
        }
    }

    pub fn variant_kind(&self) -> VariantKind {
        self.variant.kind()
    }

    pub fn is_multi_select(&self) -> bool {
        matches!(
            self.variant,
            FieldVariant::Options {
                multi_select: true,
                ..
            }
        )
    }

    /// Option mappings in declaration order; empty for single fields.
    pub fn mappings(&self) -> &[OptionMapping] {
        match &self.variant {
            FieldVariant::Single => &[],
            FieldVariant::Options { mappings, .. } => mappings,
        }
    }

    pub fn option(&self, option_key: &str) -> Option<&OptionMapping> {
        self.mappings().iter().find(|m| m.option_key == option_key)
    }

    pub fn option_keys(&self) -> impl Iterator<Item = &str> {
        self.mappings().iter().map(|m| m.option_key.as_str())
    }

    /// The explicit size, or the field type's default.
    pub fn effective_size(&self) -> Size {
        self.size.unwrap_or_else(|| self.field_type.default_size())
    }

    /// Size of one option's placement, falling back to the field's size.
    pub fn option_size(&self, mapping: &OptionMapping) -> Size {
        mapping.size.unwrap_or_else(|| self.effective_size())
    }

    /// Number of coordinate slots this field's variant needs.
    pub fn expected_placements(&self) -> u32 {
        match &self.variant {
            FieldVariant::Single => 1,
            FieldVariant::Options { mappings, .. } => mappings.len() as u32,
        }
    }

    /// Every position the field carries: the field anchor first, then the
    /// placed options. The anchor is exported for options fields too, so it
    /// counts even when no option is placed.
    pub fn positions(&self) -> Vec<Position> {
        std::iter::once(self.position)
            .chain(self.mappings().iter().filter_map(|m| m.position))
            .collect()
    }

    /// Checks the structural invariants of this field.
    pub fn validate(&self) -> Result<(), ModelError> {
        let key = self.key.as_str();
        if !keys::is_valid(key) {
            return Err(ModelError::Key {
                key: key.to_string(),
                source: KeyError::InvalidKey(key.to_string()),
            });
        }
        if self.page == 0 {
            return Err(ModelError::InvalidPage(key.to_string()));
        }

        if let FieldVariant::Options { mappings, .. } = &self.variant {
            if mappings.is_empty() {
                return Err(ModelError::MissingOptions(key.to_string()));
            }
            let mut seen = HashSet::new();
            for mapping in mappings {
                if !seen.insert(mapping.option_key.as_str()) {
                    return Err(ModelError::DuplicateOption {
                        key: key.to_string(),
                        option: mapping.option_key.clone(),
                    });
                }
                if mapping.page == 0 {
                    return Err(ModelError::InvalidPage(key.to_string()));
                }
                match (mapping.render_type, &mapping.custom_text) {
                    (RenderType::Custom, None) => {
                        return Err(ModelError::MissingCustomText {
                            key: key.to_string(),
                            option: mapping.option_key.clone(),
                        });
                    }
                    (RenderType::Text | RenderType::Checkmark, Some(_)) => {
                        return Err(ModelError::UnexpectedCustomText {
                            key: key.to_string(),
                            option: mapping.option_key.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }

        let expected = self.expected_placements();
        if self.placement_count != expected {
            return Err(ModelError::PlacementCount {
                key: key.to_string(),
                declared: self.placement_count,
                expected,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender_field() -> FieldModel {
        FieldModel::with_options(
            FieldKey::from("gender"),
            FieldType::Logic,
            vec![
                OptionMapping::new("male", RenderType::Checkmark)
                    .at(1, Position::top_edge(10.0, 20.0)),
                OptionMapping::new("female", RenderType::Checkmark)
                    .at(1, Position::top_edge(10.0, 40.0)),
            ],
            false,
        )
    }

    #[test]
    fn test_single_field_defaults() {
        let field = FieldModel::single(
            FieldKey::from("name"),
            FieldType::Text,
            1,
            Position::top_edge(0.0, 0.0),
        );
        assert_eq!(field.variant_kind(), VariantKind::Single);
        assert_eq!(field.placement_count, 1);
        assert!(field.enabled);
        assert!(field.mappings().is_empty());
        assert_eq!(field.effective_size(), Size::new(200.0, 20.0));
        assert!(field.validate().is_ok());
    }

    #[test]
    fn test_options_field_anchor_and_count() {
        let field = gender_field();
        assert_eq!(field.placement_count, 2);
        assert_eq!(field.position, Position::top_edge(10.0, 20.0));
        assert!(!field.is_multi_select());
        assert_eq!(field.option_keys().collect::<Vec<_>>(), vec!["male", "female"]);
        assert!(field.option("female").is_some());
        assert!(field.option("other").is_none());
        assert!(field.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_key_and_page() {
        let mut field = gender_field();
        field.key = FieldKey::from("1bad");
        assert!(matches!(field.validate(), Err(ModelError::Key { .. })));

        let mut field = gender_field();
        field.page = 0;
        assert_eq!(
            field.validate(),
            Err(ModelError::InvalidPage("gender".into()))
        );
    }

    #[test]
    fn test_validate_duplicate_option() {
        let field = FieldModel::with_options(
            FieldKey::from("choice"),
            FieldType::Logic,
            vec![
                OptionMapping::new("a", RenderType::Text),
                OptionMapping::new("a", RenderType::Text),
            ],
            false,
        );
        assert_eq!(
            field.validate(),
            Err(ModelError::DuplicateOption {
                key: "choice".into(),
                option: "a".into()
            })
        );
    }

    #[test]
    fn test_validate_custom_text_rules() {
        let missing = FieldModel::with_options(
            FieldKey::from("choice"),
            FieldType::Logic,
            vec![OptionMapping::new("a", RenderType::Custom)],
            false,
        );
        assert!(matches!(
            missing.validate(),
            Err(ModelError::MissingCustomText { .. })
        ));

        let stray = FieldModel::with_options(
            FieldKey::from("choice"),
            FieldType::Logic,
            vec![OptionMapping::new("a", RenderType::Checkmark).with_custom_text("X")],
            false,
        );
        assert!(matches!(
            stray.validate(),
            Err(ModelError::UnexpectedCustomText { .. })
        ));

        let ok = FieldModel::with_options(
            FieldKey::from("choice"),
            FieldType::Logic,
            vec![OptionMapping::new("a", RenderType::Custom).with_custom_text("X")],
            false,
        );
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_options_and_placement_count() {
        let empty = FieldModel::with_options(
            FieldKey::from("choice"),
            FieldType::Logic,
            Vec::new(),
            false,
        );
        assert_eq!(
            empty.validate(),
            Err(ModelError::MissingOptions("choice".into()))
        );

        let mut field = gender_field();
        field.placement_count = 5;
        assert_eq!(
            field.validate(),
            Err(ModelError::PlacementCount {
                key: "gender".into(),
                declared: 5,
                expected: 2
            })
        );
    }

    #[test]
    fn test_option_size_falls_back_to_field() {
        let mut field = gender_field();
        field.size = Some(Size::new(12.0, 12.0));
        let mapping = field.mappings()[0].clone();
        assert_eq!(field.option_size(&mapping), Size::new(12.0, 12.0));
        let sized = mapping.with_size(Size::new(8.0, 8.0));
        assert_eq!(field.option_size(&sized), Size::new(8.0, 8.0));
    }

    #[test]
    fn test_field_type_serde_names() {
        let json = serde_json::to_string(&FieldType::RadioGroup).unwrap();
        assert_eq!(json, r#""radio-group""#);
        let parsed: FieldType = serde_json::from_str(r#""composite-text""#).unwrap();
        assert_eq!(parsed, FieldType::CompositeText);
    }
}
