use crate::error::{Result, TableExportError};
use crate::font::winansi_char;
use crate::types::{Pt, Size};
use lopdf::content::Content;
use lopdf::{Dictionary, Document as LoDocument, Object, ObjectId};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct PdfInspectReport {
    pub pdf_version: String,
    pub page_count: usize,
    pub encrypted: bool,
    pub file_size_bytes: usize,
    pub page_sizes: Vec<Size>,
    /// Strings shown with `Tj`, per page, in content-stream order.
    pub page_texts: Vec<Vec<String>>,
}

impl PdfInspectReport {
    pub fn contains_text(&self, needle: &str) -> bool {
        self.page_texts.iter().flatten().any(|text| text == needle)
    }
}

/// Parses a PDF and reports page geometry and the text runs on each page.
pub fn inspect_pdf_bytes(bytes: &[u8]) -> Result<PdfInspectReport> {
    let pdf = LoDocument::load_mem(bytes)?;
    let pages = pdf.get_pages();
    let mut page_sizes = Vec::with_capacity(pages.len());
    let mut page_texts = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        let size = media_box(&pdf, page_id).ok_or_else(|| {
            TableExportError::Inspect(format!("page {number} has no usable MediaBox"))
        })?;
        page_sizes.push(size);
        let content = pdf.get_page_content(page_id)?;
        page_texts.push(shown_strings(&content)?);
    }

    Ok(PdfInspectReport {
        pdf_version: pdf.version.clone(),
        page_count: page_sizes.len(),
        encrypted: pdf.is_encrypted(),
        file_size_bytes: bytes.len(),
        page_sizes,
        page_texts,
    })
}

pub fn inspect_pdf_path(path: &Path) -> Result<PdfInspectReport> {
    let data = std::fs::read(path)?;
    inspect_pdf_bytes(&data)
}

// MediaBox is inheritable, so walk up the page tree until one is found.
fn media_box(pdf: &LoDocument, page_id: ObjectId) -> Option<Size> {
    let mut node: &Dictionary = pdf.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Ok(Object::Array(values)) = node.get(b"MediaBox") {
            let nums: Vec<f32> = values.iter().filter_map(number).collect();
            if nums.len() != 4 {
                return None;
            }
            return Some(Size {
                width: Pt::from_f32(nums[2] - nums[0]),
                height: Pt::from_f32(nums[3] - nums[1]),
            });
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = pdf.get_dictionary(parent).ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(v) => Some(*v as f32),
        Object::Real(v) => Some(*v as f32),
        _ => None,
    }
}

fn shown_strings(content: &[u8]) -> Result<Vec<String>> {
    let content = Content::decode(content)?;
    Ok(content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(decode_winansi(bytes)),
            _ => None,
        })
        .collect())
}

fn decode_winansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| winansi_char(*byte).unwrap_or('\u{FFFD}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, DocumentCanvas, TextStyle};
    use crate::font::FontVariant;
    use crate::types::Color;

    fn two_page_pdf() -> Vec<u8> {
        let mut canvas = Canvas::new(Size::a4());
        let font = canvas.embed_font(FontVariant::Regular).expect("font");
        let first = canvas.add_page(None).expect("page");
        let second = canvas.add_page(Some(Size::letter().landscape())).expect("page");
        for (page, text) in [(first, "Caf\u{00E9} (1)"), (second, "Seva\u{2026}")] {
            canvas
                .draw_text(
                    page,
                    text,
                    TextStyle {
                        x: Pt::from_i32(36),
                        y: Pt::from_i32(500),
                        size: Pt::from_i32(10),
                        font,
                        color: Color::BLACK,
                    },
                )
                .expect("draw");
        }
        canvas.serialize().expect("pdf")
    }

    #[test]
    fn reports_pages_sizes_and_texts() {
        let bytes = two_page_pdf();
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.page_count, 2);
        assert!(!report.encrypted);
        assert_eq!(report.file_size_bytes, bytes.len());
        assert_eq!(report.page_sizes, vec![Size::a4(), Size::new(792.0, 612.0)]);
        assert_eq!(report.page_texts[0], vec!["Caf\u{00E9} (1)".to_string()]);
        assert!(report.contains_text("Seva\u{2026}"));
    }

    #[test]
    fn rejects_malformed_data() {
        let err = inspect_pdf_bytes(b"not a pdf").unwrap_err();
        assert!(matches!(err, TableExportError::Inspect(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = inspect_pdf_path(&dir.path().join("absent.pdf")).unwrap_err();
        assert!(matches!(err, TableExportError::Io(_)));
    }

    #[test]
    fn path_and_bytes_agree() {
        let bytes = two_page_pdf();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("two.pdf");
        std::fs::write(&path, &bytes).expect("write");
        let from_path = inspect_pdf_path(&path).expect("path");
        let from_bytes = inspect_pdf_bytes(&bytes).expect("bytes");
        assert_eq!(from_path, from_bytes);
    }
}
