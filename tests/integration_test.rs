//! Integration tests for the full extraction pipeline
//!
//! These tests validate the end-to-end workflow over synthetic chart
//! images: grid slicing, contour detection, code extraction,
//! position-based reconciliation, and manifest output. PDF rendering and
//! OCR depend on external commands (pdftoppm, tesseract) and are
//! exercised through their error paths here; full-document runs are
//! marked #[ignore] until a sample chart asset is available.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use nuancier_extract::{
    extract_chart, slice_chart, CodeExtractor, CodePatternConfig, ColorCode,
    ContourSwatchDetector, ExtractionError, ExtractionManifest, Finish, GridConfig,
    NamedColorTable, PdfDocument, PipelineConfig, Reconciler,
};

// ============================================================================
// Fixed-grid end-to-end
// ============================================================================

#[test]
fn test_grid_run_writes_ninety_cells_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let chart = RgbImage::from_fn(1650, 1240, |x, y| {
        Rgb([(x / 165) as u8 * 25, (y / 137) as u8 * 27, 128])
    });
    let grid = GridConfig {
        cols: 10,
        rows: 9,
        cap: None,
    };

    let outcome = slice_chart(&chart, &grid, "reference chart", dir.path()).unwrap();

    assert_eq!(outcome.manifest.total_colors, 90);
    assert_eq!(outcome.summary.swatches_extracted, 90);
    let info = outcome.manifest.grid.unwrap();
    assert_eq!((info.cell_width, info.cell_height), (165, 137));

    for ordinal in 1..=90 {
        let path = dir.path().join(format!("color_{ordinal:03}.png"));
        assert!(path.exists(), "missing {}", path.display());
        let cell = image::open(&path).unwrap().to_rgb8();
        // remainder pixels dropped, not distributed
        assert_eq!(cell.dimensions(), (165, 137));
    }

    let loaded = ExtractionManifest::load(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(loaded.total_colors, 90);
    assert_eq!(loaded.entries.len(), 90);
    assert!(loaded.entries.iter().all(|e| e.code.is_none()));
}

#[test]
fn test_grid_rerun_is_deterministic() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    let chart = RgbImage::from_fn(400, 300, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
    let grid = GridConfig {
        cols: 4,
        rows: 3,
        cap: None,
    };

    slice_chart(&chart, &grid, "chart", first_dir.path()).unwrap();
    slice_chart(&chart, &grid, "chart", second_dir.path()).unwrap();

    for ordinal in 1..=12 {
        let name = format!("color_{ordinal:03}.png");
        let a = std::fs::read(first_dir.path().join(&name)).unwrap();
        let b = std::fs::read(second_dir.path().join(&name)).unwrap();
        assert_eq!(a, b, "crop {name} differs between runs");
    }
}

// ============================================================================
// Contour detection + reconciliation end-to-end
// ============================================================================

fn synthetic_page(count: usize) -> RgbImage {
    let mut page = RgbImage::from_pixel(1000, 800, Rgb([255, 255, 255]));
    for idx in 0..count {
        let col = (idx % 3) as i32;
        let row = (idx / 3) as i32;
        draw_filled_rect_mut(
            &mut page,
            Rect::at(80 + col * 300, 80 + row * 300).of_size(160, 160),
            Rgb([30 * (idx as u8 + 1), 90, 150]),
        );
    }
    page
}

#[test]
fn test_detect_extract_reconcile_round() {
    let dir = tempfile::tempdir().unwrap();
    let page = synthetic_page(4);

    let swatches = ContourSwatchDetector::new().detect(&page, 4).unwrap();
    assert_eq!(swatches.len(), 4);

    let mut swatch_paths = Vec::new();
    for swatch in &swatches {
        let path = dir.path().join(swatch.file_name("color"));
        swatch.image.save(&path).unwrap();
        swatch_paths.push(path);
    }

    let extractor = CodeExtractor::new(&CodePatternConfig::default()).unwrap();
    let codes =
        extractor.extract_from_text("RAL 1013 RAL 3004 RAL 5010 RAL 7016 RAL 7016");
    assert_eq!(codes.len(), 4, "duplicates collapse before pairing");

    let plan = Reconciler::plan(&swatch_paths, &codes);
    let report = Reconciler::apply(&plan);
    assert_eq!(report.renamed, 4);
    assert!(report.missing.is_empty());
    for code in ["1013", "3004", "5010", "7016"] {
        assert!(dir.path().join(format!("{code}-glossy.png")).exists());
    }
}

#[test]
fn test_count_mismatch_pairs_prefix_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut swatch_paths = Vec::new();
    for ordinal in 1..=3 {
        let path = dir.path().join(format!("color_{ordinal:03}.png"));
        RgbImage::new(8, 8).save(&path).unwrap();
        swatch_paths.push(path);
    }
    let codes = vec![
        ColorCode::coded("2100", Finish::Sanded),
        ColorCode::coded("2200", Finish::Sanded),
    ];

    let plan = Reconciler::plan(&swatch_paths, &codes);
    assert_eq!(plan.paired().count(), 2);
    assert_eq!(plan.unmatched_swatches(), 1);

    let report = Reconciler::apply(&plan);
    assert_eq!(report.renamed, 2);
    // the unmatched swatch keeps its pre-reconciliation name
    assert!(dir.path().join("color_003.png").exists());
}

#[test]
fn test_second_apply_reports_all_sources_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut swatch_paths = Vec::new();
    for ordinal in 1..=3 {
        let path = dir.path().join(format!("color_{ordinal:03}.png"));
        RgbImage::new(8, 8).save(&path).unwrap();
        swatch_paths.push(path);
    }
    let codes = vec![
        ColorCode::coded("9016", Finish::Glossy),
        ColorCode::coded("9005", Finish::Glossy),
        ColorCode::coded("7035", Finish::Glossy),
    ];

    let plan = Reconciler::plan(&swatch_paths, &codes);
    assert_eq!(Reconciler::apply(&plan).renamed, 3);

    let entries_before: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();

    let second = Reconciler::apply(&plan);
    assert_eq!(second.renamed, 0);
    assert_eq!(second.missing.len(), 3);
    assert!(second
        .missing
        .iter()
        .all(|e| matches!(e, ExtractionError::FileNotFound { .. }) && e.is_recoverable()));

    // no duplicate files appeared
    let entries_after: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries_before.len(), entries_after.len());
}

// ============================================================================
// Named-color fallback
// ============================================================================

#[test]
fn test_named_fallback_fills_uncoded_swatches() {
    let table = NamedColorTable {
        entries: vec![nuancier_extract::codes::NamedColor {
            name: "Brisbane".to_string(),
            code: None,
            finish: Finish::Sanded,
        }],
    };
    let extractor = CodeExtractor::new(&CodePatternConfig::default())
        .unwrap()
        .with_known_names(table);
    let codes = extractor.extract_from_text("RAL 2525 SABLÉ");
    assert_eq!(codes.len(), 2);
    assert_eq!(codes[1].asset_stem(), "brisbane-sanded");
}

// ============================================================================
// Document error handling
// ============================================================================

#[test]
fn test_extract_chart_missing_document() {
    let result = PdfDocument::open(Path::new("missing-chart.pdf"));
    assert!(matches!(
        result,
        Err(ExtractionError::DocumentError { .. })
    ));
}

#[test]
#[ignore] // requires poppler-utils and a sample chart PDF at tests/assets/nuancier.pdf
fn test_full_document_run() {
    let dir = tempfile::tempdir().unwrap();
    let doc = PdfDocument::open(Path::new("tests/assets/nuancier.pdf")).unwrap();
    let outcome = extract_chart(
        &doc,
        &PipelineConfig::default(),
        NamedColorTable::default(),
        dir.path(),
    )
    .unwrap();
    assert!(outcome.summary.pages_processed > 0);
    assert!(dir.path().join("manifest.json").exists());
}
