use fieldstamp_types::PositionVersion;

/// Major version of the export format written by this crate.
pub const CURRENT_FORMAT_MAJOR: u32 = 2;
/// Minor version of the export format written by this crate.
pub const CURRENT_FORMAT_MINOR: u32 = 0;

/// Settings for turning fields and values into stamp actions.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Version every emitted position is converted to. `None` keeps each
    /// position in the version it already carries.
    pub target_version: Option<PositionVersion>,
    /// Font size for text content when neither field nor option sets one.
    pub default_font_size: f32,
    /// Joins the items of an array value stamped into a text field.
    pub array_separator: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            target_version: None,
            default_font_size: 10.0,
            array_separator: ", ".to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_target_version(mut self, version: PositionVersion) -> Self {
        self.target_version = Some(version);
        self
    }

    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    pub fn with_array_separator(mut self, separator: impl Into<String>) -> Self {
        self.array_separator = separator.into();
        self
    }
}

/// Settings for reading and writing export documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Newest major format version accepted on read.
    pub supported_major: u32,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            supported_major: CURRENT_FORMAT_MAJOR,
            pretty: false,
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_supported_major(mut self, major: u32) -> Self {
        self.supported_major = major;
        self
    }
}
