//! Reads page count and page sizes from a source PDF.
//!
//! Only the page tree is inspected; nothing is written back.

use crate::error::FieldstampError;
use fieldstamp_core::{PdfInfo, Size};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

/// US Letter, used when a page has no resolvable MediaBox.
const FALLBACK_PAGE_SIZE: Size = Size {
    width: 612.0,
    height: 792.0,
};

/// Probes a PDF file on disk.
pub fn probe(path: &Path) -> Result<PdfInfo, FieldstampError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    probe_bytes(&file_name, &bytes)
}

/// Probes an in-memory PDF.
pub fn probe_bytes(file_name: &str, bytes: &[u8]) -> Result<PdfInfo, FieldstampError> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    let page_sizes = pages
        .values()
        .map(|&page_id| page_size(&doc, page_id))
        .collect::<Vec<_>>();

    log::debug!("Probed '{}': {} page(s)", file_name, pages.len());
    Ok(PdfInfo {
        file_name: file_name.to_string(),
        page_count: pages.len() as u32,
        page_sizes,
    })
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, lopdf::Error> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// The page's MediaBox, following `Parent` links for inherited boxes.
fn media_box(doc: &Document, page: &Dictionary) -> Option<Size> {
    let mut current = page;
    // Page trees are shallow; the bound guards against Parent cycles.
    for _ in 0..32 {
        if let Ok(obj) = current.get(b"MediaBox") {
            let values = resolve(doc, obj).ok()?.as_array().ok()?;
            let coords = values
                .iter()
                .map(|v| resolve(doc, v).ok()?.as_float().ok())
                .collect::<Option<Vec<f32>>>()?;
            if let &[x0, y0, x1, y1] = coords.as_slice() {
                return Some(Size::new((x1 - x0).abs(), (y1 - y0).abs()));
            }
            return None;
        }
        let parent = current.get(b"Parent").ok()?;
        current = resolve(doc, parent).ok()?.as_dict().ok()?;
    }
    None
}

fn page_size(doc: &Document, page_id: ObjectId) -> Size {
    let size = doc
        .get_object(page_id)
        .ok()
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| media_box(doc, dict));
    size.unwrap_or_else(|| {
        log::warn!(
            "Page object {:?} has no usable MediaBox, assuming US Letter",
            page_id
        );
        FALLBACK_PAGE_SIZE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn media_box_array(coords: [i64; 4]) -> Vec<Object> {
        coords.into_iter().map(Object::Integer).collect()
    }

    fn build_pdf(page_boxes: &[Option<[i64; 4]>], inherited: Option<[i64; 4]>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::new();
        for page_box in page_boxes {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if let Some([a, b, c, d]) = page_box {
                page.set("MediaBox", media_box_array([*a, *b, *c, *d]));
            }
            kids.push(doc.add_object(page).into());
        }

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_boxes.len() as i64,
        };
        if let Some([a, b, c, d]) = inherited {
            pages.set("MediaBox", media_box_array([a, b, c, d]));
        }
        doc.objects.insert(pages_id, pages.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_probe_page_count_and_sizes() {
        let bytes = build_pdf(&[Some([0, 0, 612, 792]), Some([0, 0, 842, 595])], None);
        let info = probe_bytes("form.pdf", &bytes).unwrap();

        assert_eq!(info.file_name, "form.pdf");
        assert_eq!(info.page_count, 2);
        assert_eq!(info.page_size(1), Some(Size::new(612.0, 792.0)));
        assert_eq!(info.page_size(2), Some(Size::new(842.0, 595.0)));
    }

    #[test]
    fn test_inherited_media_box() {
        let bytes = build_pdf(&[None], Some([0, 0, 595, 842]));
        let info = probe_bytes("a4.pdf", &bytes).unwrap();
        assert_eq!(info.page_size(1), Some(Size::new(595.0, 842.0)));
    }

    #[test]
    fn test_missing_media_box_falls_back() {
        let bytes = build_pdf(&[None], None);
        let info = probe_bytes("bare.pdf", &bytes).unwrap();
        assert_eq!(info.page_size(1), Some(FALLBACK_PAGE_SIZE));
    }

    #[test]
    fn test_garbage_is_a_pdf_error() {
        let err = probe_bytes("junk.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, FieldstampError::Pdf(_)));
    }
}
