//! Default thresholds and limits for chart extraction
//!
//! These values were calibrated against one specific paint chart document
//! and are starting points, not guaranteed-correct constants. Every value
//! here is also exposed through the configuration structs so a new source
//! document can be recalibrated without touching code.

/// Contour-based swatch detection thresholds
pub mod detection {
    /// Minimum bounding-box area in px² for a candidate region.
    /// Removes text glyphs and speckle noise.
    pub const MIN_AREA_PX: u32 = 5_000;

    /// Minimum width/height in px for a candidate region
    pub const MIN_SIDE_PX: u32 = 50;

    /// Minimum width/height aspect ratio for a candidate.
    /// Swatches are approximately square; this removes long thin lines.
    pub const MIN_ASPECT_RATIO: f32 = 0.6;

    /// Maximum width/height aspect ratio for a candidate
    pub const MAX_ASPECT_RATIO: f32 = 1.8;

    /// Lower bound of the area tolerance band, as a multiple of the
    /// per-page median candidate area. Widen for noisier scans.
    pub const AREA_BAND_LOW: f32 = 0.5;

    /// Upper bound of the area tolerance band (multiple of median area)
    pub const AREA_BAND_HIGH: f32 = 2.0;

    /// Keep at most `factor × expected_count` candidates by area before
    /// the reading-order sort
    pub const CANDIDATE_FACTOR: usize = 2;

    /// Inward crop padding in px, to avoid capturing border strokes
    pub const CROP_PADDING_PX: u32 = 3;

    /// Gaussian blur sigma applied before edge detection
    pub const BLUR_SIGMA: f32 = 1.4;

    /// Canny edge detection low threshold
    pub const CANNY_LOW: f32 = 50.0;

    /// Canny edge detection high threshold
    pub const CANNY_HIGH: f32 = 150.0;
}

/// Page rasterization resolutions
pub mod raster {
    /// Resolution for general swatch detection passes
    pub const DETECTION_DPI: u32 = 300;

    /// Resolution for OCR passes (higher DPI bounds false positives)
    pub const OCR_DPI: u32 = 600;

    /// Resolution for OCR passes over pages with small print
    pub const OCR_HIGHRES_DPI: u32 = 1200;
}

/// Remote catalog limits
pub mod catalog {
    use std::time::Duration;

    /// Rows per insert call
    pub const DEFAULT_BATCH_SIZE: usize = 50;

    /// Fixed per-call timeout; a timed-out call is reported, not retried
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Asset naming conventions
pub mod naming {
    /// Pre-reconciliation filename prefix: `<category>_<ordinal>.png`
    pub const SWATCH_CATEGORY: &str = "color";

    /// Manifest filename written at the end of a run
    pub const MANIFEST_FILE: &str = "manifest.json";
}
