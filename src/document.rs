//! Paginated source document access
//!
//! Read-only access to a PDF chart document by 1-based page index: the
//! page's text layer via lopdf, and a rendered pixel image at a chosen
//! resolution via the `pdftoppm` command. Rendering resolution is fixed
//! per use case (detection vs. OCR), not chosen adaptively.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbImage;
use lopdf::Document;
use tracing::{debug, warn};

use crate::ocr::command_available;
use crate::{ExtractionError, Result};

/// One page of a source document, rendered and with its raw text.
///
/// Immutable once rendered; discarded after its swatches and codes are
/// extracted.
pub struct SourcePage {
    /// 1-based page index
    pub index: usize,
    /// Rendered pixel buffer
    pub image: RgbImage,
    /// Raw extracted text layer (possibly empty)
    pub text: String,
}

/// A PDF chart document opened for extraction.
#[derive(Debug)]
pub struct PdfDocument {
    doc: Document,
    path: PathBuf,
    page_count: usize,
}

impl PdfDocument {
    /// Open a document and enumerate its pages.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the file is missing or cannot be decoded.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).map_err(|e| {
            ExtractionError::document_with(format!("cannot open {}", path.display()), e)
        })?;
        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(ExtractionError::document(format!(
                "{} contains no pages",
                path.display()
            )));
        }
        debug!(path = %path.display(), pages = page_count, "opened document");
        Ok(Self {
            doc,
            path: path.to_path_buf(),
            page_count,
        })
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Raw text layer of a 1-based page, empty if the page has none.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` only if the page index is out of range; a
    /// page without an extractable text layer yields an empty string.
    pub fn page_text(&self, page: usize) -> Result<String> {
        self.check_page(page)?;
        match self.doc.extract_text(&[page as u32]) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(page, error = %e, "no extractable text layer");
                Ok(String::new())
            }
        }
    }

    /// Render a 1-based page to a pixel buffer at the given resolution.
    ///
    /// Shells out to `pdftoppm`; higher resolution trades compute time
    /// for detection/OCR accuracy.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the page index is out of range or the
    /// renderer is unavailable, and `DecodeError` if the rendered output
    /// cannot be read back.
    pub fn rasterize(&self, page: usize, dpi: u32) -> Result<RgbImage> {
        self.check_page(page)?;
        if !command_available("pdftoppm") {
            return Err(ExtractionError::document(
                "pdftoppm command not available; install poppler-utils",
            ));
        }

        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");
        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-singlefile")
            .arg(&self.path)
            .arg(&prefix)
            .output()
            .map_err(|e| ExtractionError::document_with("failed to run pdftoppm", e))?;

        if !output.status.success() {
            return Err(ExtractionError::document(format!(
                "pdftoppm exited with {} on page {}: {}",
                output.status,
                page,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let rendered = prefix.with_extension("png");
        let image = image::open(&rendered)
            .map_err(|e| ExtractionError::decode(format!("rendered page {page} unreadable"), e))?
            .to_rgb8();
        debug!(page, dpi, width = image.width(), height = image.height(), "rasterized page");
        Ok(image)
    }

    /// Convenience: rasterize a page and pair it with its text layer
    pub fn load_page(&self, page: usize, dpi: u32) -> Result<SourcePage> {
        let image = self.rasterize(page, dpi)?;
        let text = self.page_text(page)?;
        Ok(SourcePage {
            index: page,
            image,
            text,
        })
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page == 0 || page > self.page_count {
            return Err(ExtractionError::document(format!(
                "page {} out of range (document has {} pages)",
                page, self.page_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_document() {
        let err = PdfDocument::open(Path::new("nonexistent-chart.pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::DocumentError { .. }));
        assert!(!err.is_recoverable());
    }
}
