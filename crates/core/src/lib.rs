//! # fieldstamp-core
//!
//! The unified field model behind the PDF field designer:
//! - **keys**: sanitizing, validating and generating field keys
//! - **model**: the [`FieldModel`] every field representation collapses into
//! - **migration**: conversion of legacy plain/logic/boolean descriptors
//! - **resolver**: field + value → ordered, page-bound [`StampAction`]s
//! - **export**: the versioned, persisted schema document
//! - **collection**: invariants spanning a whole field list
//!
//! ## Design Principle
//!
//! Every operation is a pure function of its inputs. The crate does no I/O
//! and owns no field collection; callers hold the fields and serialize
//! their own writes.

pub use fieldstamp_types as types;

pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod keys;
pub mod legacy;
pub mod migration;
pub mod model;
pub mod resolver;

pub use types::{FieldId, FieldKey, PdfInfo, Position, PositionVersion, ResourceUri, Size};

pub use config::{ExportConfig, ResolverConfig};
pub use error::{ExportError, KeyError, MigrationError, MixedVersions, ModelError, ResolutionError};
pub use export::{ExportDocument, Exporter, UnifiedFieldExport};
pub use legacy::{LegacyBooleanField, LegacyDescriptor, LegacyFlatField, LegacyLogicField};
pub use migration::{Migration, MigrationWarning, WarningKind};
pub use model::{
    FieldModel, FieldType, FieldVariant, OptionMapping, RenderType, Structure, VariantKind,
};
pub use resolver::{Resolver, StampAction, StampContent, StampPlan};
