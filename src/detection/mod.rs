//! Swatch detection module
//!
//! Finds candidate swatch rectangles in a rendered chart page via edge
//! and contour analysis, filters them heuristically, and crops them in
//! reading order.

pub mod contour;

pub use contour::{CandidateRegion, ContourSwatchDetector};
