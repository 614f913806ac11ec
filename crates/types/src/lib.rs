pub mod document;
pub mod geometry;
pub mod ids;

pub use document::PdfInfo;
pub use geometry::{Position, PositionVersion, Size};
pub use ids::{FieldId, FieldKey, ResourceUri};
