//! Text-layer extraction and OCR capabilities.

use async_trait::async_trait;

use crate::error::{ExtractError, OcrError};
use crate::types::constituent::ConstituentWeight;

/// Converts document bytes to plain text.
///
/// An empty string is a valid result meaning "no text layer"; it is the
/// caller's job to escalate.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Text recovered by OCR plus the constituents parsed from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub constituents: Vec<ConstituentWeight>,
}

impl OcrOutput {
    /// Nothing found (no allocation page, or no text recognised).
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Last-resort recognition over the rendered allocation page.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_via_ocr(&self, bytes: &[u8]) -> Result<OcrOutput, OcrError>;
}
