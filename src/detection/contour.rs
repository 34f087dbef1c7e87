//! Contour-based swatch detection
//!
//! Detects candidate swatch rectangles in a rendered chart page:
//! grayscale → Gaussian blur → Canny edges → connected-component
//! bounding boxes, then heuristic filtering against absolute floors, an
//! aspect-ratio band, and a tolerance band around the per-page median
//! area. Surviving candidates are sorted in reading order and cropped
//! with a small inward padding.
//!
//! The median-area filter assumes swatches are the dominant
//! roughly-uniform-size shape on the page; it fails if multiple size
//! classes of rectangle exist. A short result is returned as-is, never
//! auto-corrected; the caller compares against its expected count.

use std::collections::HashMap;

use image::{imageops, Luma, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

use crate::config::DetectionConfig;
use crate::{Result, SwatchImage};

/// An axis-aligned bounding box found by contour detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CandidateRegion {
    /// Bounding-box area in px²
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Swatch detector using edge contours and heuristic filtering.
pub struct ContourSwatchDetector {
    config: DetectionConfig,
}

impl Default for ContourSwatchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContourSwatchDetector {
    /// Create a detector with the default thresholds
    pub fn new() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }

    /// Create a detector with custom thresholds
    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Detect up to `expected_count` swatches in a rendered page, in
    /// reading order (top-to-bottom, then left-to-right).
    ///
    /// Returns fewer than `expected_count` crops when not enough
    /// candidates survive filtering; the shortfall is the caller's to
    /// detect and report.
    pub fn detect(&self, image: &RgbImage, expected_count: usize) -> Result<Vec<SwatchImage>> {
        let regions = self.detect_regions(image, expected_count)?;
        let swatches = regions
            .iter()
            .enumerate()
            .map(|(idx, region)| SwatchImage {
                ordinal: idx + 1,
                row: None,
                col: None,
                image: self.crop_padded(image, region),
            })
            .collect();
        Ok(swatches)
    }

    /// Detect candidate regions without cropping.
    ///
    /// Exposed separately so callers can inspect geometry before paying
    /// for the crops.
    pub fn detect_regions(
        &self,
        image: &RgbImage,
        expected_count: usize,
    ) -> Result<Vec<CandidateRegion>> {
        // Step 1: edge map and raw bounding boxes
        let boxes = self.find_bounding_boxes(image);

        // Step 2+3: absolute floors and aspect-ratio band
        let mut boxes: Vec<CandidateRegion> = boxes
            .into_iter()
            .filter(|b| self.passes_floors(b))
            .collect();

        // Step 4: tolerance band around the median area
        boxes.sort_by(|a, b| b.area().cmp(&a.area()));
        let boxes = self.filter_by_median_area(boxes);

        // Step 5: bound the candidate set, biased toward real swatches
        let limit = expected_count.saturating_mul(self.config.candidate_factor);
        let mut boxes: Vec<CandidateRegion> = boxes.into_iter().take(limit.max(1)).collect();

        // Step 6: reading order; vertical jitter within a row is not
        // merged, so jittery scans can scramble left-to-right order
        boxes.sort_by_key(|b| (b.y, b.x));

        // Step 7: truncate to the expected count if enough survive
        if boxes.len() > expected_count {
            boxes.truncate(expected_count);
        }

        debug!(
            candidates = boxes.len(),
            expected = expected_count,
            "contour detection finished"
        );
        Ok(boxes)
    }

    /// Grayscale, blur, Canny, then bounding boxes of the connected edge
    /// components
    fn find_bounding_boxes(&self, image: &RgbImage) -> Vec<CandidateRegion> {
        let gray = imageops::grayscale(image);
        let blurred = gaussian_blur_f32(&gray, self.config.blur_sigma);
        let edges = canny(&blurred, self.config.canny_low, self.config.canny_high);

        let labeled = connected_components(&edges, Connectivity::Eight, Luma([0u8]));

        let mut extents: HashMap<u32, (u32, u32, u32, u32)> = HashMap::new();
        for (x, y, label) in labeled.enumerate_pixels() {
            let label = label[0];
            if label == 0 {
                continue; // background
            }
            extents
                .entry(label)
                .and_modify(|(min_x, min_y, max_x, max_y)| {
                    *min_x = (*min_x).min(x);
                    *min_y = (*min_y).min(y);
                    *max_x = (*max_x).max(x);
                    *max_y = (*max_y).max(y);
                })
                .or_insert((x, y, x, y));
        }

        extents
            .into_values()
            .map(|(min_x, min_y, max_x, max_y)| CandidateRegion {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            })
            .collect()
    }

    /// Absolute area/side floors and the aspect-ratio band
    fn passes_floors(&self, region: &CandidateRegion) -> bool {
        if region.area() < self.config.min_area as u64 {
            return false;
        }
        if region.width < self.config.min_side || region.height < self.config.min_side {
            return false;
        }
        let ratio = region.aspect_ratio();
        ratio >= self.config.min_aspect_ratio && ratio <= self.config.max_aspect_ratio
    }

    /// Keep candidates within the tolerance band around the median area.
    /// Expects `boxes` sorted by area descending.
    fn filter_by_median_area(&self, boxes: Vec<CandidateRegion>) -> Vec<CandidateRegion> {
        if boxes.is_empty() {
            return boxes;
        }
        let areas: Vec<u64> = boxes.iter().map(|b| b.area()).collect();
        let median = median_of_sorted(&areas);
        let low = median * self.config.area_band_low as f64;
        let high = median * self.config.area_band_high as f64;
        boxes
            .into_iter()
            .filter(|b| {
                let area = b.area() as f64;
                area >= low && area <= high
            })
            .collect()
    }

    /// Crop a region with a small inward padding to avoid border strokes
    fn crop_padded(&self, image: &RgbImage, region: &CandidateRegion) -> RgbImage {
        let pad = self.config.crop_padding;
        let x1 = region.x + pad;
        let y1 = region.y + pad;
        let x2 = (region.x + region.width).saturating_sub(pad).min(image.width());
        let y2 = (region.y + region.height).saturating_sub(pad).min(image.height());
        if x2 <= x1 || y2 <= y1 {
            // padding would swallow the region; crop it unpadded instead
            return imageops::crop_imm(image, region.x, region.y, region.width, region.height)
                .to_image();
        }
        imageops::crop_imm(image, x1, y1, x2 - x1, y2 - y1).to_image()
    }
}

/// Median of a slice already sorted in either direction
fn median_of_sorted(values: &[u64]) -> f64 {
    let len = values.len();
    if len % 2 == 1 {
        values[len / 2] as f64
    } else {
        (values[len / 2 - 1] as f64 + values[len / 2] as f64) / 2.0
    }
}
