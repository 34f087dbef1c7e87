//! Fixed-grid chart slicing
//!
//! Partitions a chart image of known dimensions into a uniform
//! `columns × rows` grid and extracts each cell as a swatch image, in
//! row-major reading order. Cell dimensions come from integer division;
//! remainder pixels at the right and bottom edges are silently dropped,
//! never padded or distributed.

use image::{imageops, RgbImage};

use crate::config::GridConfig;
use crate::{ExtractionError, Result, SwatchImage};

/// Uniform grid slicer for static chart images.
pub struct GridSlicer {
    cols: u32,
    rows: u32,
    cap: Option<usize>,
}

impl GridSlicer {
    /// Create a slicer for the given grid shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if either dimension is zero.
    pub fn new(cols: u32, rows: u32) -> Result<Self> {
        if cols == 0 {
            return Err(ExtractionError::InvalidParameter {
                parameter: "cols".to_string(),
                value: cols.to_string(),
            });
        }
        if rows == 0 {
            return Err(ExtractionError::InvalidParameter {
                parameter: "rows".to_string(),
                value: rows.to_string(),
            });
        }
        Ok(Self {
            cols,
            rows,
            cap: None,
        })
    }

    /// Create a slicer from a grid configuration section
    pub fn from_config(config: &GridConfig) -> Result<Self> {
        let slicer = Self::new(config.cols, config.rows)?;
        Ok(match config.cap {
            Some(cap) => slicer.with_cap(cap),
            None => slicer,
        })
    }

    /// Stop after the first `cap` cells even if more remain.
    ///
    /// The slicer has no way to detect a blank cell, so discarding
    /// trailing empty chart cells is the caller's responsibility via
    /// this cap.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Cell dimensions for an image of the given size
    pub fn cell_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width / self.cols, height / self.rows)
    }

    /// Slice the image into swatch cells in row-major order.
    ///
    /// Each cell is exactly `(width / cols, height / rows)` pixels and
    /// carries its 1-based ordinal and `(row + 1, col + 1)` position.
    /// Re-slicing the same image with the same parameters is
    /// deterministic and produces byte-identical crops.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the grid is finer than the image.
    pub fn slice(&self, image: &RgbImage) -> Result<Vec<SwatchImage>> {
        let (cell_width, cell_height) = self.cell_size(image.width(), image.height());
        if cell_width == 0 || cell_height == 0 {
            return Err(ExtractionError::InvalidParameter {
                parameter: "grid".to_string(),
                value: format!(
                    "{}x{} grid over {}x{} image",
                    self.cols,
                    self.rows,
                    image.width(),
                    image.height()
                ),
            });
        }

        let limit = self.cap.unwrap_or(usize::MAX);
        let mut cells = Vec::new();
        'rows: for row in 0..self.rows {
            for col in 0..self.cols {
                if cells.len() >= limit {
                    break 'rows;
                }
                let x = col * cell_width;
                let y = row * cell_height;
                let crop = imageops::crop_imm(image, x, y, cell_width, cell_height).to_image();
                cells.push(SwatchImage {
                    ordinal: cells.len() + 1,
                    row: Some(row + 1),
                    col: Some(col + 1),
                    image: crop,
                });
            }
        }
        Ok(cells)
    }
}
