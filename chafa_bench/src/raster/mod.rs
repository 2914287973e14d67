mod color;
mod io;
pub mod test_image;

#[cfg(test)]
mod tests;

use std::path::Path;

use crate::error::{Error, Result};

pub use color::hsl_to_rgb;

/// Bytes per pixel of every raster handled by the harness (RGBA8).
pub const BYTES_PER_PIXEL: usize = 4;

/// Row-major RGBA8 raster with tightly packed rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wraps an RGBA8 buffer. Fails if a dimension is zero or the buffer length is not
    /// `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<RasterImage> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }

        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(Error::InvalidImage(format!(
                "buffer length {} does not match expected size {expected} for {width}x{height}",
                pixels.len()
            )));
        }

        Ok(RasterImage {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Returns the RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Decodes an image file, adding an opaque alpha channel if the source has none.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<RasterImage> {
        io::load_rgba(path.as_ref())
    }

    /// Encodes the raster; the format follows the file extension.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::save_rgba(self, path.as_ref())
    }
}

impl std::fmt::Display for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} RGBA8", self.width, self.height)
    }
}
