use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use nuancier_extract::{ContourSwatchDetector, GridSlicer};

fn chart_image() -> RgbImage {
    RgbImage::from_fn(1650, 1240, |x, y| {
        Rgb([(x / 165) as u8 * 25, (y / 137) as u8 * 27, 128])
    })
}

fn rendered_page() -> RgbImage {
    let mut page = RgbImage::from_pixel(1200, 900, Rgb([255, 255, 255]));
    for idx in 0..12 {
        let col = (idx % 4) as i32;
        let row = (idx / 4) as i32;
        draw_filled_rect_mut(
            &mut page,
            Rect::at(60 + col * 280, 60 + row * 280).of_size(180, 180),
            Rgb([20 * (idx as u8 + 1), 80, 140]),
        );
    }
    page
}

fn benchmark_grid_slicing(c: &mut Criterion) {
    let chart = chart_image();
    let slicer = GridSlicer::new(10, 9).unwrap();
    c.bench_function("grid_slice_10x9", |b| {
        b.iter(|| {
            let cells = slicer.slice(black_box(&chart)).unwrap();
            black_box(cells)
        })
    });
}

fn benchmark_contour_detection(c: &mut Criterion) {
    let page = rendered_page();
    let detector = ContourSwatchDetector::new();
    c.bench_function("contour_detect_12", |b| {
        b.iter(|| {
            let regions = detector.detect_regions(black_box(&page), 12).unwrap();
            black_box(regions)
        })
    });
}

criterion_group!(benches, benchmark_grid_slicing, benchmark_contour_detection);
criterion_main!(benches);
