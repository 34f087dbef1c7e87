//! Optical character recognition backend
//!
//! Shells out to the `tesseract` command over a rendered page image
//! written to a temporary PNG. OCR is a fallback for documents without a
//! usable text layer; the character allow-list and page segmentation
//! mode keep its output bounded enough for pattern matching.

use std::process::Command;

use image::RgbImage;
use tracing::debug;

use crate::config::OcrConfig;
use crate::{ExtractionError, Result};

/// Tesseract-backed OCR engine.
pub struct OcrEngine {
    config: OcrConfig,
}

impl OcrEngine {
    /// Create an engine with the given settings
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Check whether the `tesseract` command can be spawned
    pub fn available() -> bool {
        command_available("tesseract")
    }

    /// Recognize text in a rendered page image.
    ///
    /// # Errors
    ///
    /// Returns `OcrError` if the command is unavailable, exits non-zero,
    /// or produces undecodable output.
    pub fn recognize(&self, image: &RgbImage) -> Result<String> {
        if !Self::available() {
            return Err(ExtractionError::OcrError {
                message: "tesseract command not available".to_string(),
            });
        }

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("page.png");
        image.save(&input).map_err(|e| {
            ExtractionError::decode(format!("failed to write OCR input {}", input.display()), e)
        })?;

        let mut command = Command::new("tesseract");
        command
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .args(["--oem", "3"])
            .arg("--psm")
            .arg(self.config.page_segmentation_mode.to_string());
        if let Some(allowlist) = &self.config.char_allowlist {
            command
                .arg("-c")
                .arg(format!("tessedit_char_whitelist={allowlist}"));
        }

        let output = command.output().map_err(|e| ExtractionError::OcrError {
            message: format!("failed to run tesseract: {e}"),
        })?;

        if !output.status.success() {
            return Err(ExtractionError::OcrError {
                message: format!(
                    "tesseract exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR produced text");
        Ok(text)
    }
}

/// Check whether an external command can be spawned at all
pub(crate) fn command_available(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .output()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_is_unavailable() {
        assert!(!command_available("definitely-not-a-real-command-xyz"));
    }

    #[test]
    fn test_recognize_without_tesseract_reports_ocr_error() {
        if OcrEngine::available() {
            return; // environment has tesseract; covered by ignored test below
        }
        let engine = OcrEngine::new(OcrConfig::default());
        let image = RgbImage::new(10, 10);
        let err = engine.recognize(&image).unwrap_err();
        assert!(matches!(err, ExtractionError::OcrError { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    #[ignore] // requires a tesseract install with fra+eng language data
    fn test_recognize_blank_image() {
        let engine = OcrEngine::new(OcrConfig::default());
        let image = RgbImage::from_pixel(200, 100, image::Rgb([255, 255, 255]));
        let text = engine.recognize(&image).unwrap();
        assert!(text.trim().is_empty());
    }
}
