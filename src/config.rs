//! Configuration structures for the chart extraction pipeline.
//!
//! This module defines all tunable parameters for rasterization, swatch
//! detection, code extraction, and OCR, organized into logical groups.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use nuancier_extract::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use the defaults calibrated against the reference chart
//! let config = PipelineConfig::default();
//! # Ok::<(), nuancier_extract::ExtractionError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`RasterConfig`]: page rendering resolutions
//! - [`DetectionConfig`]: contour detection heuristics
//! - [`CodePatternConfig`]: structured code token shape
//! - [`OcrConfig`]: OCR language, segmentation mode, character allow-list
//! - [`GridConfig`]: fixed-grid slicing shape for static chart images

use serde::{Deserialize, Serialize};

use crate::codes::Finish;
use crate::constants;
use crate::{ExtractionError, Result};

/// Complete pipeline configuration for a chart extraction run.
///
/// Can be serialized to/from JSON for reproducible runs against a given
/// source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Human-readable label for the source document, recorded in the manifest
    pub source_label: String,

    /// Pages to process, with per-page expectations
    pub pages: Vec<PageConfig>,

    /// Rasterization settings
    pub raster: RasterConfig,

    /// Contour detection settings
    pub detection: DetectionConfig,

    /// Code token pattern settings
    pub pattern: CodePatternConfig,

    /// OCR fallback settings
    pub ocr: OcrConfig,

    /// Fixed-grid shape, for runs over a static chart image instead of
    /// contour detection
    #[serde(default)]
    pub grid: Option<GridConfig>,
}

/// Per-page expectations for a chart document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// 1-based page index in the source document
    pub page: usize,

    /// Number of swatches this page is known to contain
    pub expected_swatches: usize,

    /// Finish variant of every swatch on this page
    pub finish: Finish,
}

/// Page rasterization resolutions.
///
/// Higher resolution trades compute time for detection/OCR accuracy.
/// Resolutions are fixed per use case, not chosen adaptively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterConfig {
    /// DPI for swatch detection passes
    pub detection_dpi: u32,

    /// DPI for OCR passes
    pub ocr_dpi: u32,

    /// DPI for the second OCR pass taken when the first finds no codes
    pub ocr_highres_dpi: u32,
}

/// Contour-based swatch detection heuristics.
///
/// These thresholds were tuned against one specific chart document and
/// should be treated as a starting point requiring recalibration per
/// source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Absolute area floor in px²; smaller rectangles are noise
    pub min_area: u32,

    /// Absolute width/height floor in px
    pub min_side: u32,

    /// Minimum accepted width/height aspect ratio
    pub min_aspect_ratio: f32,

    /// Maximum accepted width/height aspect ratio
    pub max_aspect_ratio: f32,

    /// Lower bound of the area tolerance band, as a multiple of the
    /// per-page median candidate area; widen for noisier scans
    pub area_band_low: f32,

    /// Upper bound of the area tolerance band (multiple of median area)
    pub area_band_high: f32,

    /// Keep at most `candidate_factor × expected_count` candidates by area
    pub candidate_factor: usize,

    /// Inward crop padding in px, to avoid capturing border strokes
    pub crop_padding: u32,

    /// Gaussian blur sigma applied before edge detection
    pub blur_sigma: f32,

    /// Canny low threshold
    pub canny_low: f32,

    /// Canny high threshold
    pub canny_high: f32,
}

/// Shape of a structured code token.
///
/// A token is an alphanumeric prefix followed by a fixed-length numeric
/// code, optionally followed by a finish qualifier word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodePatternConfig {
    /// Alphanumeric prefix token, e.g. `RAL`
    pub prefix: String,

    /// Number of digits in the numeric code
    pub code_length: usize,
}

/// OCR backend settings.
///
/// OCR is markedly less reliable than a document text layer; the
/// restricted character allow-list and higher render resolution bound
/// false positives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language spec, e.g. `fra+eng`
    pub language: String,

    /// Tesseract page segmentation mode
    pub page_segmentation_mode: u32,

    /// Restrict recognition to these characters; `None` disables the
    /// allow-list
    pub char_allowlist: Option<String>,
}

/// Fixed-grid slicing shape for a static chart image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns
    pub cols: u32,

    /// Number of rows
    pub rows: u32,

    /// Stop after the first N cells, to discard trailing empty chart
    /// cells; the slicer itself cannot detect a blank cell
    #[serde(default)]
    pub cap: Option<usize>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            detection_dpi: constants::raster::DETECTION_DPI,
            ocr_dpi: constants::raster::OCR_DPI,
            ocr_highres_dpi: constants::raster::OCR_HIGHRES_DPI,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_area: constants::detection::MIN_AREA_PX,
            min_side: constants::detection::MIN_SIDE_PX,
            min_aspect_ratio: constants::detection::MIN_ASPECT_RATIO,
            max_aspect_ratio: constants::detection::MAX_ASPECT_RATIO,
            area_band_low: constants::detection::AREA_BAND_LOW,
            area_band_high: constants::detection::AREA_BAND_HIGH,
            candidate_factor: constants::detection::CANDIDATE_FACTOR,
            crop_padding: constants::detection::CROP_PADDING_PX,
            blur_sigma: constants::detection::BLUR_SIGMA,
            canny_low: constants::detection::CANNY_LOW,
            canny_high: constants::detection::CANNY_HIGH,
        }
    }
}

impl Default for CodePatternConfig {
    fn default() -> Self {
        Self {
            prefix: "RAL".to_string(),
            code_length: 4,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "fra+eng".to_string(),
            page_segmentation_mode: 6,
            char_allowlist: None,
        }
    }
}

impl Default for PipelineConfig {
    /// Defaults calibrated against the reference epoxy paint chart:
    /// two glossy pages of 26 swatches, one sanded page of 28.
    fn default() -> Self {
        Self {
            source_label: "nuancier".to_string(),
            pages: vec![
                PageConfig {
                    page: 1,
                    expected_swatches: 26,
                    finish: Finish::Glossy,
                },
                PageConfig {
                    page: 2,
                    expected_swatches: 26,
                    finish: Finish::Glossy,
                },
                PageConfig {
                    page: 3,
                    expected_swatches: 28,
                    finish: Finish::Sanded,
                },
            ],
            raster: RasterConfig::default(),
            detection: DetectionConfig::default(),
            pattern: CodePatternConfig::default(),
            ocr: OcrConfig::default(),
            grid: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ExtractionError::config(format!("invalid config file {}", path.display()), e)
        })
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ExtractionError::config("config serialization failed", e))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
