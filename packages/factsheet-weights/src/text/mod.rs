//! PDF text-layer extraction.
//!
//! The primary method reads the whole text layer with `pdf-extract`. If
//! that fails (or panics on a malformed stream), the document is reparsed
//! page by page with `lopdf` and the page texts are joined with newlines.

use async_trait::async_trait;
use lopdf::Document;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::traits::extractor::TextExtractor;

/// Two-method PDF text extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read the embedded text layer in one pass.
    pub fn extract_primary(bytes: &[u8]) -> Result<String, String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
    }

    /// Reparse page by page, joining page texts with `\n`.
    pub fn extract_page_by_page(bytes: &[u8]) -> Result<String, String> {
        let doc = Document::load_mem(bytes).map_err(|e| e.to_string())?;
        Ok(page_texts(&doc).join("\n"))
    }
}

/// Text of every page in order; unreadable pages contribute an empty string.
pub(crate) fn page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .keys()
        .map(|page_num| {
            doc.extract_text(&[*page_num]).unwrap_or_else(|e| {
                debug!(page = page_num, error = %e, "Page text unreadable");
                String::new()
            })
        })
        .collect()
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let data = bytes.to_vec();
        let primary = tokio::task::spawn_blocking(move || {
            // pdf-extract may panic on broken streams; catch it here so the
            // fallback still gets the bytes.
            let result = std::panic::catch_unwind(|| PdfTextExtractor::extract_primary(&data))
                .unwrap_or_else(|_| Err("primary extractor panicked".to_string()));
            (result, data)
        })
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?;

        let (primary_error, data) = match primary {
            (Ok(text), _) => return Ok(text),
            (Err(e), data) => (e, data),
        };
        warn!(error = %primary_error, "Primary text extraction failed, trying page-by-page");

        let secondary = tokio::task::spawn_blocking(move || {
            std::panic::catch_unwind(|| PdfTextExtractor::extract_page_by_page(&data))
                .unwrap_or_else(|_| Err("page-by-page extractor panicked".to_string()))
        })
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?;

        secondary.map_err(|secondary| ExtractError::Unreadable {
            primary: primary_error,
            secondary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_fails_both_methods() {
        let err = PdfTextExtractor::new()
            .extract_text(b"definitely not a pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::Unreadable { .. }));
    }

    #[test]
    fn test_page_by_page_rejects_garbage() {
        assert!(PdfTextExtractor::extract_page_by_page(b"%PDF-broken").is_err());
    }
}
