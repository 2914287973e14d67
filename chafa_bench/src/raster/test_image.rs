//! Synthetic benchmark input.
//!
//! The 640x480 test image is tiled 4x4 into 160x120 regions, each exercising a different
//! class of content: gradients, hard edges, hue sweeps, noise, fine dither, palettes.
//! Every region except [`Pattern::Noise`] is a pure function of `(x, y)`.

use std::path::Path;

use rand::Rng;
use strum_macros::{Display, EnumIter, FromRepr};
use tracing::info;

use super::{BYTES_PER_PIXEL, RasterImage, hsl_to_rgb};
use crate::error::Result;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

pub const REGION_WIDTH: u32 = 160;
pub const REGION_HEIGHT: u32 = 120;
pub const REGIONS_PER_ROW: u32 = 4;
pub const PATTERN_COUNT: usize = 16;

/// File name the generated image is stored under.
pub const FILE_NAME: &str = "test-image-640x480.png";

const NES_PALETTE: [[u8; 3]; 12] = [
    [0, 0, 0],
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 255, 255],
    [128, 0, 0],
    [0, 128, 0],
    [0, 0, 128],
    [128, 128, 0],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[strum(serialize_all = "kebab-case")]
#[repr(usize)]
pub enum Pattern {
    RedGradient = 0,
    GreenGradient = 1,
    BlueGradient = 2,
    GrayGradient = 3,
    Checkerboard = 4,
    HueSweep = 5,
    Noise = 6,
    VerticalStripes = 7,
    DiagonalGradient = 8,
    Rings = 9,
    Plasma = 10,
    ColorBlocks = 11,
    FineDither = 12,
    SkinTones = 13,
    EdgeGrid = 14,
    PaletteMosaic = 15,
}

impl Pattern {
    /// Pattern drawn at pixel `(x, y)`.
    pub fn at(x: u32, y: u32) -> Pattern {
        let region = x / REGION_WIDTH + (y / REGION_HEIGHT) * REGIONS_PER_ROW;
        Pattern::from_index(region as usize)
    }

    /// Maps a region index onto a pattern, wrapping modulo [`PATTERN_COUNT`].
    pub fn from_index(region: usize) -> Pattern {
        Pattern::from_repr(region % PATTERN_COUNT).expect("every residue has a pattern")
    }

    pub fn is_deterministic(self) -> bool {
        self != Pattern::Noise
    }

    /// RGB value of this pattern at `(x, y)`. Only [`Pattern::Noise`] draws from `rng`.
    pub fn rgb<R: Rng>(self, x: u32, y: u32, rng: &mut R) -> [u8; 3] {
        let (xf, yf) = (x as f64, y as f64);
        // position inside the current region
        let (lx, ly) = (x % REGION_WIDTH, y % REGION_HEIGHT);
        let fx = lx as f64 / REGION_WIDTH as f64;

        match self {
            Pattern::RedGradient => [floor_u8(xf / REGION_WIDTH as f64 * 255.0), 0, 0],
            Pattern::GreenGradient => [0, floor_u8(fx * 255.0), 0],
            Pattern::BlueGradient => [0, 0, floor_u8(fx * 255.0)],
            Pattern::GrayGradient => {
                let v = floor_u8(fx * 255.0);
                [v, v, v]
            }
            Pattern::Checkerboard => {
                let v = if (x / 8 + y / 8) % 2 == 1 { 255 } else { 0 };
                [v, v, v]
            }
            Pattern::HueSweep => hsl_to_rgb(fx, 1.0, 0.5),
            Pattern::Noise => [rng.random(), rng.random(), rng.random()],
            Pattern::VerticalStripes => match (x / 10) % 3 {
                0 => [255, 0, 0],
                1 => [0, 255, 0],
                _ => [0, 0, 255],
            },
            Pattern::DiagonalGradient => {
                let diag = (lx + ly) as f64 / 280.0;
                [floor_u8(diag * 255.0), floor_u8((1.0 - diag) * 255.0), 128]
            }
            Pattern::Rings => {
                let cx = lx as f64 - 80.0;
                let cy = ly as f64 - 60.0;
                let dist = (cx * cx + cy * cy).sqrt();
                if (dist / 15.0).floor() as u32 % 2 == 1 {
                    [255, 200, 100]
                } else {
                    [100, 50, 200]
                }
            }
            Pattern::Plasma => {
                let px = (xf / 20.0).sin() * 127.0 + 128.0;
                let py = (yf / 15.0).sin() * 127.0 + 128.0;
                let r = floor_u8((px + py) / 2.0);
                [r, floor_u8((px - py).abs()), 255 - r]
            }
            Pattern::ColorBlocks => {
                let bx = lx / 40;
                let by = ly / 30;
                [
                    ((bx * 85) % 256) as u8,
                    ((by * 85) % 256) as u8,
                    (((bx + by) * 60) % 256) as u8,
                ]
            }
            Pattern::FineDither => {
                if (x + y) % 2 == 1 {
                    [200, 150, 100]
                } else {
                    [100, 180, 150]
                }
            }
            Pattern::SkinTones => [
                floor_u8(180.0 + fx * 60.0),
                floor_u8(120.0 + fx * 80.0),
                floor_u8(80.0 + fx * 60.0),
            ],
            Pattern::EdgeGrid => {
                let v = if x % 20 < 2 || y % 20 < 2 { 255 } else { 20 };
                [v, v, v]
            }
            Pattern::PaletteMosaic => {
                NES_PALETTE[(x as usize / 13 + y as usize / 10) % NES_PALETTE.len()]
            }
        }
    }
}

fn floor_u8(v: f64) -> u8 {
    v.floor().clamp(0.0, 255.0) as u8
}

/// Renders the full 640x480 test image. Alpha is always 255.
pub fn generate<R: Rng>(rng: &mut R) -> RasterImage {
    let mut pixels = vec![0u8; WIDTH as usize * HEIGHT as usize * BYTES_PER_PIXEL];

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let i = (y as usize * WIDTH as usize + x as usize) * BYTES_PER_PIXEL;
            let [r, g, b] = Pattern::at(x, y).rgb(x, y, rng);
            pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&[r, g, b, 255]);
        }
    }

    RasterImage::new(WIDTH, HEIGHT, pixels).expect("test image dimensions are constant")
}

/// Generates the test image with the thread-local RNG and writes it to `path`.
pub fn write_test_image(path: &Path) -> Result<RasterImage> {
    let image = generate(&mut rand::rng());
    image.save_file(path)?;
    info!(path = %path.display(), "Generated test image");
    Ok(image)
}

/// Loads the test image from `path`, generating it first when the file is missing.
pub fn load_or_generate(path: &Path) -> Result<RasterImage> {
    if !path.exists() {
        info!(path = %path.display(), "Test image not found, generating");
        write_test_image(path)?;
    }
    RasterImage::read_file(path)
}
