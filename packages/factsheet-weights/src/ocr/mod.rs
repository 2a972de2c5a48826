//! OCR over the allocation page of a factsheet.
//!
//! Only the first page whose text layer names an allocation section is
//! rendered; documents without such a page are never rasterized.

mod tesseract;

pub use tesseract::TesseractOcr;

use lopdf::Document;

use crate::error::OcrError;
use crate::text::page_texts;

/// Phrases marking the page that carries the allocation chart.
pub const ALLOCATION_MARKERS: &[&str] = &[
    "ASSET ALLOCATION",
    "Asset Allocation",
    "INDEX COMPOSITION",
    "Index Composition",
];

/// 1-based number of the first page whose text contains a marker.
pub fn find_allocation_page(bytes: &[u8]) -> Result<Option<u32>, OcrError> {
    let doc = Document::load_mem(bytes).map_err(|e| OcrError::Document(e.to_string()))?;
    Ok(allocation_page_in(&page_texts(&doc)))
}

/// [`find_allocation_page`] on the blocking pool.
///
/// lopdf can panic on malformed streams; a panic surfaces as
/// [`OcrError::Document`].
pub async fn locate_allocation_page(bytes: &[u8]) -> Result<Option<u32>, OcrError> {
    let data = bytes.to_vec();
    tokio::task::spawn_blocking(move || {
        std::panic::catch_unwind(|| find_allocation_page(&data))
            .unwrap_or_else(|_| Err(OcrError::Document("page scan panicked".to_string())))
    })
    .await
    .map_err(|e| OcrError::Task(e.to_string()))?
}

fn allocation_page_in(pages: &[String]) -> Option<u32> {
    pages
        .iter()
        .position(|text| ALLOCATION_MARKERS.iter().any(|m| text.contains(m)))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_marked_page_wins() {
        let pages = vec![
            "Key facts".to_string(),
            "Index Composition chart".to_string(),
            "ASSET ALLOCATION".to_string(),
        ];
        assert_eq!(allocation_page_in(&pages), Some(2));
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let pages = vec!["asset allocation in lower case".to_string()];
        assert_eq!(allocation_page_in(&pages), None);
    }

    #[test]
    fn test_unreadable_document() {
        assert!(matches!(
            find_allocation_page(b"not a pdf"),
            Err(OcrError::Document(_))
        ));
    }

    #[tokio::test]
    async fn test_locate_never_panics_on_malformed_bytes() {
        for bytes in [
            &b"not a pdf"[..],
            &b"%PDF-1.4\n1 0 obj << /Type /Pages /Kids [2 0 R] >> endobj\ntrailer << /Root 1 0 R >>"[..],
            &b"%PDF-1.7\nxref\n0 99999999\n"[..],
        ] {
            let result = locate_allocation_page(bytes).await;
            assert!(matches!(result, Err(_) | Ok(None)), "{:?}", result);
        }
        assert!(matches!(
            locate_allocation_page(b"not a pdf").await,
            Err(OcrError::Document(_))
        ));
    }
}
