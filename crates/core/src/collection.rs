//! Invariants that span a whole field collection.
//!
//! The core never owns the collection; these functions read a slice the
//! caller holds, or rewrite it in place when asked to.

use crate::error::{KeyError, MixedVersions, ModelError};
use crate::keys;
use crate::model::{FieldModel, FieldVariant};
use fieldstamp_types::{FieldKey, PositionVersion};
use std::collections::HashSet;

/// The set of keys in use, suitable for [`keys::generate_unique`].
pub fn key_set(fields: &[FieldModel]) -> HashSet<FieldKey> {
    fields.iter().map(|f| f.key.clone()).collect()
}

/// Next free key for a field of the given type.
pub fn next_key(fields: &[FieldModel], field_type: crate::model::FieldType) -> FieldKey {
    keys::generate_unique(field_type.key_prefix(), &key_set(fields))
}

/// Checks every field, key uniqueness, and that no key is the dotted parent
/// of another (which would make one data path both a scalar and an object).
pub fn validate_collection(fields: &[FieldModel]) -> Result<(), ModelError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(fields.len());
    for field in fields {
        field.validate()?;
        let key = field.key.as_str();
        if !seen.insert(key) {
            return Err(ModelError::Key {
                key: key.to_string(),
                source: KeyError::DuplicateKey(key.to_string()),
            });
        }
    }

    for field in fields {
        let key = field.key.as_str();
        let mut parent = keys::parent_key(key);
        while let Some(prefix) = parent {
            if seen.contains(prefix) {
                return Err(ModelError::Key {
                    key: prefix.to_string(),
                    source: KeyError::PathCollision {
                        key: prefix.to_string(),
                        other: key.to_string(),
                    },
                });
            }
            parent = keys::parent_key(prefix);
        }
    }
    Ok(())
}

/// The single position version shared by every position in the
/// collection, or `None` when there are no positions at all.
pub fn uniform_position_version(
    fields: &[FieldModel],
) -> Result<Option<PositionVersion>, MixedVersions> {
    let mut found: Option<PositionVersion> = None;
    for position in fields.iter().flat_map(FieldModel::positions) {
        match found {
            None => found = Some(position.version),
            Some(first) if first != position.version => {
                return Err(MixedVersions {
                    first,
                    second: position.version,
                });
            }
            Some(_) => {}
        }
    }
    Ok(found)
}

/// Rewrites every position (field and option placements) to `target`.
///
/// This is the one-time step for collections that mix fields created
/// under different position versions.
pub fn normalize_positions(fields: &mut [FieldModel], target: PositionVersion) {
    for field in fields.iter_mut() {
        let height = field.effective_size().height;
        field.position = field.position.to_version(target, height);
        let field_size = field.effective_size();
        if let FieldVariant::Options { mappings, .. } = &mut field.variant {
            for mapping in mappings.iter_mut() {
                let height = mapping.size.unwrap_or(field_size).height;
                mapping.position = mapping.position.map(|p| p.to_version(target, height));
            }
        }
    }
}
