use serde::{Deserialize, Serialize};

/// How the `y` coordinate of a [`Position`] is anchored to the field box.
///
/// Both variants measure from the bottom of the page (PDF user space). They
/// differ in which edge of the field the coordinate points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionVersion {
    /// `y` is the field's top edge.
    TopEdge,
    /// `y` is the field's bottom edge. Unversioned data always means this.
    #[default]
    BottomEdge,
}

impl PositionVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionVersion::TopEdge => "top-edge",
            PositionVersion::BottomEdge => "bottom-edge",
        }
    }
}

impl std::str::FromStr for PositionVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-edge" => Ok(PositionVersion::TopEdge),
            "bottom-edge" | "legacy" => Ok(PositionVersion::BottomEdge),
            other => Err(format!("Unknown position version '{}'", other)),
        }
    }
}

/// A page-relative point in PDF user-space units, tagged with its anchoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    #[serde(default, rename = "positionVersion")]
    pub version: PositionVersion,
}

impl Position {
    pub fn new(x: f32, y: f32, version: PositionVersion) -> Self {
        Self { x, y, version }
    }

    pub fn top_edge(x: f32, y: f32) -> Self {
        Self::new(x, y, PositionVersion::TopEdge)
    }

    /// A position from data that carried no version marker.
    pub fn legacy(x: f32, y: f32) -> Self {
        Self::new(x, y, PositionVersion::BottomEdge)
    }

    /// Re-anchors this position to `target`, given the height of the field box.
    pub fn to_version(self, target: PositionVersion, height: f32) -> Self {
        let y = match (self.version, target) {
            (PositionVersion::BottomEdge, PositionVersion::TopEdge) => self.y + height,
            (PositionVersion::TopEdge, PositionVersion::BottomEdge) => self.y - height,
            _ => self.y,
        };
        Self { x: self.x, y, version: target }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}
