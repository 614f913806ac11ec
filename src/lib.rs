//! # fieldstamp
//!
//! Turns designer field schemas into stamp instructions for a PDF writer.
//!
//! The model itself lives in [`fieldstamp_core`] and is re-exported here.
//! This crate adds the file-facing pieces: JSON loading and saving
//! ([`io`]), page geometry probing of the source PDF ([`pdf_info`]) and the
//! operations behind the `fieldstamp` command line ([`commands`]).

pub use fieldstamp_core as core;
pub use fieldstamp_core::{
    ExportConfig, ExportDocument, Exporter, FieldKey, FieldModel, FieldType, FieldVariant,
    LegacyDescriptor, Migration, MigrationWarning, OptionMapping, PdfInfo, Position,
    PositionVersion, RenderType, Resolver, ResolverConfig, StampAction, StampContent, StampPlan,
    Structure, collection, keys, migration, resolver,
};

pub mod commands;
pub mod error;
pub mod io;
pub mod pdf_info;

pub use error::FieldstampError;
