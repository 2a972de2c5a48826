//! `pdftoppm` + `tesseract` backed OCR.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::locate_allocation_page;
use crate::error::OcrError;
use crate::parser::parse_factsheet_text;
use crate::traits::extractor::{OcrEngine, OcrOutput};
use crate::types::provider::Provider;

/// PDF user-space resolution; render scale multiplies it.
const BASE_DPI: u32 = 72;

/// Renders the allocation page and recognises it with tesseract.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    render_scale: u32,
    language: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            render_scale: 3,
            language: "eng".to_string(),
        }
    }
}

impl TesseractOcr {
    pub fn new(render_scale: u32) -> Self {
        Self {
            render_scale,
            ..Default::default()
        }
    }

    /// Set the tesseract language pack (e.g. `eng+deu`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Both tools are installed.
    pub fn is_available() -> bool {
        which::which("pdftoppm").is_ok() && which::which("tesseract").is_ok()
    }

    fn dpi(&self) -> u32 {
        BASE_DPI * self.render_scale.max(1)
    }

    async fn recognise_page(&self, bytes: &[u8], page: u32) -> Result<String, OcrError> {
        for tool in ["pdftoppm", "tesseract"] {
            which::which(tool).map_err(|_| OcrError::MissingTool(tool.to_string()))?;
        }

        let dir = tempfile::tempdir()?;
        let pdf_path = dir.path().join("document.pdf");
        let render_prefix = dir.path().join("page");
        let image_path = render_prefix.with_extension("png");
        tokio::fs::write(&pdf_path, bytes).await?;

        let page_arg = page.to_string();
        let render = Command::new("pdftoppm")
            .arg("-r")
            .arg(self.dpi().to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg("-png")
            .arg("-singlefile")
            .arg(&pdf_path)
            .arg(&render_prefix)
            .output()
            .await?;
        if !render.status.success() || !image_path.exists() {
            return Err(OcrError::Render(
                String::from_utf8_lossy(&render.stderr).trim().to_string(),
            ));
        }

        let recognised = Command::new("tesseract")
            .arg(&image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await?;
        if !recognised.status.success() {
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}",
                recognised.status.code().unwrap_or(-1)
            )));
        }

        Ok(String::from_utf8_lossy(&recognised.stdout).into_owned())
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn extract_via_ocr(&self, bytes: &[u8]) -> Result<OcrOutput, OcrError> {
        let page = match locate_allocation_page(bytes).await? {
            Some(page) => page,
            None => {
                debug!("No allocation page found, skipping OCR");
                return Ok(OcrOutput::empty());
            }
        };

        info!(page, dpi = self.dpi(), "Running OCR on allocation page");
        let text = self.recognise_page(bytes, page).await?;
        let parsed = parse_factsheet_text(&text, Provider::Unknown);
        info!(
            page,
            chars = text.len(),
            constituents = parsed.constituents.len(),
            "OCR complete"
        );

        Ok(OcrOutput {
            text,
            constituents: parsed.constituents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpi_follows_render_scale() {
        assert_eq!(TesseractOcr::default().dpi(), 216);
        assert_eq!(TesseractOcr::new(2).dpi(), 144);
        assert_eq!(TesseractOcr::new(0).dpi(), 72);
    }

    #[tokio::test]
    async fn test_unreadable_document_is_an_error() {
        let result = TesseractOcr::default().extract_via_ocr(b"garbage").await;
        assert!(matches!(result, Err(OcrError::Document(_))));
    }
}
