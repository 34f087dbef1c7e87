//! # nuancier_extract
//!
//! A Rust crate for turning scanned or rendered paint colour charts
//! ("nuanciers") into discrete, labeled swatch image assets plus a
//! metadata manifest.
//!
//! Two extraction variants share the pipeline:
//! - [`GridSlicer`]: partitions a chart image of known dimensions into a
//!   uniform grid of cells
//! - [`ContourSwatchDetector`]: finds candidate swatch rectangles in a
//!   rendered page via edge detection and heuristic filtering
//!
//! Extracted swatches are paired with colour codes recovered from the
//! document text (or OCR) by the [`Reconciler`], which matches by
//! position in reading order, and the run's output is recorded in an
//! [`ExtractionManifest`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use nuancier_extract::{extract_chart, NamedColorTable, PdfDocument, PipelineConfig};
//! use std::path::Path;
//!
//! let doc = PdfDocument::open(Path::new("nuancier.pdf"))?;
//! let config = PipelineConfig::default();
//! let outcome = extract_chart(&doc, &config, NamedColorTable::default(), Path::new("out"))?;
//! println!("{}", outcome.summary);
//! # Ok::<(), nuancier_extract::ExtractionError>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{info, warn};

pub mod catalog;
pub mod codes;
pub mod config;
pub mod constants;
pub mod detection;
pub mod document;
pub mod error;
pub mod grid;
pub mod manifest;
pub mod ocr;
pub mod preview;
pub mod reconcile;

pub use codes::{CodeExtractor, ColorCode, Finish, NamedColorTable};
pub use config::{
    CodePatternConfig, DetectionConfig, GridConfig, OcrConfig, PageConfig, PipelineConfig,
    RasterConfig,
};
pub use detection::{CandidateRegion, ContourSwatchDetector};
pub use document::{PdfDocument, SourcePage};
pub use error::{ExtractionError, Result};
pub use grid::GridSlicer;
pub use manifest::{ExtractionManifest, FinishCounts, GridInfo};
pub use ocr::OcrEngine;
pub use reconcile::{ApplyReport, ReconciledEntry, Reconciler, RenamePlan};

/// A cropped sub-image representing one physical colour chip.
///
/// Tagged with its 1-based ordinal in reading order and, for grid runs,
/// its 1-based grid coordinates. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct SwatchImage {
    /// 1-based position in reading order
    pub ordinal: usize,
    /// 1-based grid row, for grid-sliced swatches
    pub row: Option<u32>,
    /// 1-based grid column, for grid-sliced swatches
    pub col: Option<u32>,
    /// Cropped pixel buffer
    pub image: RgbImage,
}

impl SwatchImage {
    /// Grid position as `(row, col)`, if known
    pub fn position(&self) -> Option<(u32, u32)> {
        Some((self.row?, self.col?))
    }

    /// Pre-reconciliation filename: `<category>_<ordinal>.png`
    pub fn file_name(&self, category: &str) -> String {
        format!("{}_{:03}.png", category, self.ordinal)
    }
}

/// Success/failure counts for a whole run, printed for the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub swatches_extracted: usize,
    pub codes_extracted: usize,
    pub renamed: usize,
    pub unmatched_swatches: usize,
    pub unmatched_codes: usize,
    pub missing_sources: usize,
    pub failed_renames: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "pages: {} processed, {} failed",
            self.pages_processed, self.pages_failed
        )?;
        writeln!(
            f,
            "swatches: {} extracted, codes: {} extracted",
            self.swatches_extracted, self.codes_extracted
        )?;
        write!(
            f,
            "reconciled: {} renamed, {} swatches unmatched, {} codes unmatched, {} sources missing, {} renames failed",
            self.renamed,
            self.unmatched_swatches,
            self.unmatched_codes,
            self.missing_sources,
            self.failed_renames
        )
    }
}

/// A finished run: its manifest, the operator-facing summary, and the
/// recoverable errors survived along the way.
#[derive(Debug)]
pub struct RunOutcome {
    pub manifest: ExtractionManifest,
    pub summary: RunSummary,
    /// Per-item conditions the run continued past: a page detecting
    /// fewer swatches than expected, a rename source already gone
    pub warnings: Vec<ExtractionError>,
}

/// Run the contour-detection pipeline over a chart document.
///
/// For each configured page: rasterize, detect swatches, write
/// `color_<NNN>.png` crops under `out_dir/page-<N>/`, extract codes from
/// the text layer (falling back to OCR when the layer is empty and
/// tesseract is available), reconcile by position, and record the
/// entries. The manifest is written atomically to
/// `out_dir/manifest.json` at the end.
///
/// Per-item failures (one page, one crop) are logged with the offending
/// item named and the run continues; structural failures (output
/// directory cannot be created, manifest cannot be written) abort.
pub fn extract_chart(
    doc: &PdfDocument,
    config: &PipelineConfig,
    known_names: NamedColorTable,
    out_dir: &Path,
) -> Result<RunOutcome> {
    std::fs::create_dir_all(out_dir)?;
    let detector = ContourSwatchDetector::with_config(config.detection.clone());
    let extractor = CodeExtractor::new(&config.pattern)?.with_known_names(known_names);
    let ocr = OcrEngine::new(config.ocr.clone());

    let mut manifest = ExtractionManifest::new(&config.source_label);
    let mut summary = RunSummary::default();
    let mut warnings = Vec::new();

    for page_config in &config.pages {
        match process_page(doc, config, page_config, &detector, &extractor, &ocr, out_dir) {
            Ok(page) => {
                summary.pages_processed += 1;
                summary.swatches_extracted += page.swatch_paths.len();
                summary.codes_extracted += page.codes.len();
                if let Some(mismatch) =
                    count_mismatch(page_config.page, page_config.expected_swatches, page.detected)
                {
                    // reported as a count, not auto-corrected
                    warn!(error = %mismatch, "swatch count shortfall");
                    warnings.push(mismatch);
                }

                let plan = Reconciler::plan(&page.swatch_paths, &page.codes);
                summary.unmatched_swatches += plan.unmatched_swatches();
                summary.unmatched_codes += plan.unmatched_codes.len();
                for code in &plan.unmatched_codes {
                    warn!(page = page_config.page, code = ?code, "code without a swatch");
                }

                let report = Reconciler::apply(&plan);
                summary.renamed += report.renamed;
                summary.missing_sources += report.missing.len();
                summary.failed_renames += report.failed.len();
                warnings.extend(report.missing);

                manifest.extend(plan.entries);
            }
            Err(e) => {
                warn!(page = page_config.page, error = %e, "page skipped");
                summary.pages_failed += 1;
            }
        }
    }

    manifest.write(&out_dir.join(constants::naming::MANIFEST_FILE))?;
    info!(%summary, "extraction run finished");
    Ok(RunOutcome {
        manifest,
        summary,
        warnings,
    })
}

/// Recoverable count check: a short (or over-full) page yields an error
/// value for the run's warning list, never an abort.
fn count_mismatch(page: usize, expected: usize, actual: usize) -> Option<ExtractionError> {
    if actual == expected {
        return None;
    }
    Some(ExtractionError::CountMismatch {
        context: format!("page {page}"),
        expected,
        actual,
    })
}

struct PageResult {
    swatch_paths: Vec<PathBuf>,
    codes: Vec<ColorCode>,
    /// Swatch regions found by the detector, before crops are written
    detected: usize,
}

fn process_page(
    doc: &PdfDocument,
    config: &PipelineConfig,
    page_config: &PageConfig,
    detector: &ContourSwatchDetector,
    extractor: &CodeExtractor,
    ocr: &OcrEngine,
    out_dir: &Path,
) -> Result<PageResult> {
    let page = page_config.page;
    let image = doc.rasterize(page, config.raster.detection_dpi)?;
    let swatches = detector.detect(&image, page_config.expected_swatches)?;

    let page_dir = out_dir.join(format!("page-{page}"));
    std::fs::create_dir_all(&page_dir)?;
    let mut swatch_paths = Vec::with_capacity(swatches.len());
    for swatch in &swatches {
        let path = page_dir.join(swatch.file_name(constants::naming::SWATCH_CATEGORY));
        match swatch.image.save(&path) {
            Ok(()) => swatch_paths.push(path),
            Err(e) => warn!(path = %path.display(), error = %e, "crop not written"),
        }
    }

    let text = doc.page_text(page)?;
    let mut codes = if !text.trim().is_empty() {
        extractor.extract_from_text(&text)
    } else if OcrEngine::available() {
        let render = doc.rasterize(page, config.raster.ocr_dpi)?;
        let mut found = extractor.extract_from_image(&render, ocr)?;
        if found.is_empty() {
            // second pass at high resolution for faint or small glyphs
            let render = doc.rasterize(page, config.raster.ocr_highres_dpi)?;
            found = extractor.extract_from_image(&render, ocr)?;
        }
        found
    } else {
        warn!(page, "no text layer and no OCR backend; page gets no codes");
        Vec::new()
    };
    codes.retain(|code| code.finish == page_config.finish);

    Ok(PageResult {
        swatch_paths,
        codes,
        detected: swatches.len(),
    })
}

/// Run the fixed-grid pipeline over a static chart image.
///
/// Writes one `color_<NNN>.png` per cell into `out_dir` and a manifest
/// recording the grid shape and cell size. Codes are not paired here;
/// reconciliation over the written files is a separate step.
pub fn slice_chart(
    image: &RgbImage,
    grid: &GridConfig,
    source_label: &str,
    out_dir: &Path,
) -> Result<RunOutcome> {
    std::fs::create_dir_all(out_dir)?;
    let slicer = GridSlicer::from_config(grid)?;
    let cells = slicer.slice(image)?;
    let (cell_width, cell_height) = slicer.cell_size(image.width(), image.height());

    let mut summary = RunSummary::default();
    let mut entries = Vec::with_capacity(cells.len());
    for cell in &cells {
        let path = out_dir.join(cell.file_name(constants::naming::SWATCH_CATEGORY));
        if let Err(e) = cell.image.save(&path) {
            warn!(path = %path.display(), error = %e, "cell not written");
            continue;
        }
        summary.swatches_extracted += 1;
        entries.push(ReconciledEntry {
            ordinal: cell.ordinal,
            code: None,
            finish: None,
            name: None,
            old_path: path,
            new_path: None,
        });
    }
    summary.pages_processed = 1;

    let mut manifest = ExtractionManifest::new(source_label);
    manifest.grid = Some(GridInfo {
        cols: grid.cols,
        rows: grid.rows,
        cell_width,
        cell_height,
    });
    manifest.extend(entries);
    manifest.write(&out_dir.join(constants::naming::MANIFEST_FILE))?;
    info!(%summary, "grid run finished");
    Ok(RunOutcome {
        manifest,
        summary,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swatch_file_name() {
        let swatch = SwatchImage {
            ordinal: 7,
            row: Some(1),
            col: Some(7),
            image: RgbImage::new(4, 4),
        };
        assert_eq!(swatch.file_name("color"), "color_007.png");
        assert_eq!(swatch.position(), Some((1, 7)));
    }

    #[test]
    fn test_count_mismatch_is_recoverable() {
        let mismatch = count_mismatch(3, 28, 26).unwrap();
        assert!(matches!(
            mismatch,
            ExtractionError::CountMismatch {
                expected: 28,
                actual: 26,
                ..
            }
        ));
        assert!(mismatch.is_recoverable());
        assert!(mismatch.to_string().contains("page 3"));

        assert!(count_mismatch(1, 26, 26).is_none());
    }

    #[test]
    fn test_summary_display_names_counts() {
        let summary = RunSummary {
            pages_processed: 3,
            renamed: 52,
            unmatched_swatches: 2,
            ..Default::default()
        };
        let text = summary.to_string();
        assert!(text.contains("3 processed"));
        assert!(text.contains("52 renamed"));
        assert!(text.contains("2 swatches unmatched"));
    }
}
