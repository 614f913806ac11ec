use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// Facts about the source PDF that a schema was designed against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfInfo {
    /// File name of the PDF as dropped into the designer.
    pub file_name: String,
    /// Number of pages in the document.
    pub page_count: u32,
    /// Page sizes in user-space units, indexed by `page - 1`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_sizes: Vec<Size>,
}

impl PdfInfo {
    pub fn new(file_name: impl Into<String>, page_count: u32) -> Self {
        Self {
            file_name: file_name.into(),
            page_count,
            page_sizes: Vec::new(),
        }
    }

    /// Size of a 1-based page, if known.
    pub fn page_size(&self, page: u32) -> Option<Size> {
        let index = (page as usize).checked_sub(1)?;
        self.page_sizes.get(index).copied()
    }

    pub fn contains_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.page_count
    }
}
