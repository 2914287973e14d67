use common::test_utils::test_output_path;
use rand::SeedableRng;
use rand::rngs::StdRng;
use strum::IntoEnumIterator;

use super::test_image::{self, HEIGHT, Pattern, REGION_HEIGHT, REGION_WIDTH, WIDTH};
use super::*;

fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

// =============================================================================
// RasterImage
// =============================================================================

#[test]
fn rejects_zero_dimensions() {
    assert!(matches!(
        RasterImage::new(0, 10, Vec::new()),
        Err(Error::InvalidImage(_))
    ));
}

#[test]
fn rejects_mismatched_buffer_length() {
    let result = RasterImage::new(2, 2, vec![0; 15]);
    assert!(matches!(result, Err(Error::InvalidImage(_))));
}

#[test]
fn stride_and_aspect_ratio() {
    let img = RasterImage::new(4, 2, vec![0; 32]).unwrap();
    assert_eq!(img.stride(), 16);
    assert!((img.aspect_ratio() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn read_missing_file_returns_codec_error() {
    let result = RasterImage::read_file("/nonexistent/does_not_exist.png");
    assert!(matches!(result, Err(Error::Codec { .. })));
}

#[test]
fn png_round_trip_preserves_pixels() {
    let img = test_image::generate(&mut seeded(7));
    let path = test_output_path("raster/round_trip.png");

    img.save_file(&path).unwrap();
    let loaded = RasterImage::read_file(&path).unwrap();

    assert_eq!(loaded, img);
}

// =============================================================================
// Region layout
// =============================================================================

#[test]
fn region_layout_is_four_by_four() {
    assert_eq!(Pattern::at(0, 0), Pattern::RedGradient);
    assert_eq!(Pattern::at(639, 0), Pattern::GrayGradient);
    assert_eq!(Pattern::at(0, 120), Pattern::Checkerboard);
    assert_eq!(Pattern::at(2 * REGION_WIDTH, REGION_HEIGHT), Pattern::Noise);
    assert_eq!(Pattern::at(0, 479), Pattern::FineDither);
    assert_eq!(Pattern::at(639, 479), Pattern::PaletteMosaic);
}

#[test]
fn region_index_wraps_modulo_sixteen() {
    assert_eq!(Pattern::from_index(16), Pattern::RedGradient);
    assert_eq!(Pattern::from_index(22), Pattern::Noise);
    assert_eq!(Pattern::iter().count(), 16);
}

// =============================================================================
// Pattern values
// =============================================================================

#[test]
fn known_pattern_values() {
    let mut rng = seeded(0);

    assert_eq!(Pattern::RedGradient.rgb(80, 10, &mut rng), [127, 0, 0]);
    assert_eq!(Pattern::GreenGradient.rgb(160 + 80, 10, &mut rng), [0, 127, 0]);
    assert_eq!(Pattern::Checkerboard.rgb(8, 0, &mut rng), [255, 255, 255]);
    assert_eq!(Pattern::Checkerboard.rgb(8, 8, &mut rng), [0, 0, 0]);
    assert_eq!(Pattern::HueSweep.rgb(160, 0, &mut rng), [255, 0, 0]);
    assert_eq!(Pattern::VerticalStripes.rgb(10, 0, &mut rng), [0, 255, 0]);
    assert_eq!(Pattern::DiagonalGradient.rgb(0, 0, &mut rng), [0, 255, 128]);
    assert_eq!(Pattern::Rings.rgb(80, 60, &mut rng), [100, 50, 200]);
    assert_eq!(Pattern::Rings.rgb(100, 60, &mut rng), [255, 200, 100]);
    assert_eq!(Pattern::ColorBlocks.rgb(40, 30, &mut rng), [85, 85, 120]);
    assert_eq!(Pattern::FineDither.rgb(1, 0, &mut rng), [200, 150, 100]);
    assert_eq!(Pattern::SkinTones.rgb(0, 0, &mut rng), [180, 120, 80]);
    assert_eq!(Pattern::EdgeGrid.rgb(1, 5, &mut rng), [255, 255, 255]);
    assert_eq!(Pattern::EdgeGrid.rgb(5, 5, &mut rng), [20, 20, 20]);
    assert_eq!(Pattern::PaletteMosaic.rgb(13, 0, &mut rng), [255, 0, 0]);
}

#[test]
fn plasma_blue_complements_red() {
    let mut rng = seeded(0);
    for (x, y) in [(0, 0), (37, 91), (400, 300)] {
        let [r, _, b] = Pattern::Plasma.rgb(x, y, &mut rng);
        assert_eq!(r as u16 + b as u16, 255);
    }
}

#[test]
fn deterministic_regions_ignore_the_rng() {
    for pattern in Pattern::iter().filter(|p| p.is_deterministic()) {
        for (x, y) in [(0, 0), (13, 7), (159, 119), (321, 250), (639, 479)] {
            let a = pattern.rgb(x, y, &mut seeded(1));
            let b = pattern.rgb(x, y, &mut seeded(99));
            assert_eq!(a, b, "{pattern} at ({x}, {y})");
        }
    }
}

#[test]
fn regenerated_images_match_outside_noise_region() {
    let a = test_image::generate(&mut seeded(1));
    let b = test_image::generate(&mut seeded(2));

    assert_eq!((a.width(), a.height()), (WIDTH, HEIGHT));

    let mut noise_differs = false;
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            if Pattern::at(x, y).is_deterministic() {
                assert_eq!(a.pixel(x, y), b.pixel(x, y), "pixel ({x}, {y})");
            } else if a.pixel(x, y) != b.pixel(x, y) {
                noise_differs = true;
            }
        }
    }
    assert!(noise_differs, "noise region should depend on the seed");
}

#[test]
fn alpha_is_always_opaque() {
    let img = test_image::generate(&mut seeded(3));
    assert!(img.pixels().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn load_or_generate_creates_missing_file() {
    let path = test_output_path("raster/generated/test-image-640x480.png");
    let _ = std::fs::remove_file(&path);

    let img = test_image::load_or_generate(&path).unwrap();

    assert!(path.exists());
    assert_eq!((img.width(), img.height()), (WIDTH, HEIGHT));
}
