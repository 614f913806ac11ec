//! Newtype wrappers for field identities and resource references.
//!
//! A field has two identities: a [`FieldId`] that only lives for the current
//! process, and a [`FieldKey`] that is persisted and doubles as the data-binding
//! path. Keeping them as distinct types prevents passing one where the other
//! is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(value: impl Into<Arc<str>>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_newtype!(
    /// Opaque, process-local surrogate identity of a field.
    ///
    /// Not persisted as identity: a deserialized collection gets fresh ids.
    FieldId
);

string_newtype!(
    /// The durable identity of a field and its data-binding path.
    ///
    /// Dots separate nested path segments (`personal.firstName`). Grammar
    /// checks live with the key codec; this type only carries the string.
    FieldKey
);

string_newtype!(
    /// A reference to binary content (image or signature) to be stamped.
    ResourceUri
);

impl FieldId {
    /// Creates a fresh random identity.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

impl FieldKey {
    /// Path segments separated by `.`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Appends a child segment, producing `self.child`.
    pub fn child(&self, segment: &str) -> FieldKey {
        FieldKey::from(format!("{}.{}", self.0, segment))
    }
}
