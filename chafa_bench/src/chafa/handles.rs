//! Scoped ownership of renderer objects.
//!
//! Each guard releases its handle on drop. Borrows encode the library's lifetime rules:
//! a [`CanvasConfig`] borrows the [`SymbolMap`] it references, and a [`Canvas`] borrows
//! both its config and the [`StagedPixels`] it reads, so neither can be released while
//! the canvas is alive.

use std::marker::PhantomData;

use super::backend::{ChafaBackend, RawHandle};
use super::types::{CanvasMode, DitherMode, SymbolTags};
use crate::error::Result;
use crate::raster::RasterImage;

pub struct SymbolMap<'a, B: ChafaBackend + ?Sized> {
    backend: &'a B,
    raw: RawHandle,
}

impl<'a, B: ChafaBackend + ?Sized> SymbolMap<'a, B> {
    pub fn new(backend: &'a B, tags: SymbolTags) -> Result<Self> {
        let map = SymbolMap {
            backend,
            raw: backend.symbol_map_new()?,
        };
        // SAFETY: `map.raw` is live until `map` drops.
        unsafe { backend.symbol_map_add_by_tags(map.raw, tags) };
        Ok(map)
    }
}

impl<B: ChafaBackend + ?Sized> Drop for SymbolMap<'_, B> {
    fn drop(&mut self) {
        // SAFETY: the handle is released exactly once, here.
        unsafe { self.backend.symbol_map_unref(self.raw) };
    }
}

/// Geometry, color mode and glyph set of a canvas.
pub struct CanvasConfig<'a, B: ChafaBackend + ?Sized> {
    backend: &'a B,
    raw: RawHandle,
    _symbols: PhantomData<&'a SymbolMap<'a, B>>,
}

impl<'a, B: ChafaBackend + ?Sized> CanvasConfig<'a, B> {
    /// Dithering is only configured when it differs from [`DitherMode::None`].
    pub fn new(
        symbols: &'a SymbolMap<'a, B>,
        width: u32,
        height: u32,
        canvas_mode: CanvasMode,
        dither_mode: DitherMode,
    ) -> Result<Self> {
        let backend = symbols.backend;
        let config = CanvasConfig {
            backend,
            raw: backend.canvas_config_new()?,
            _symbols: PhantomData,
        };

        // SAFETY: both handles are live for the duration of these calls. On error the
        // guard is dropped and the config released.
        unsafe {
            backend.canvas_config_set_geometry(config.raw, width, height)?;
            backend.canvas_config_set_canvas_mode(config.raw, canvas_mode);
            backend.canvas_config_set_symbol_map(config.raw, symbols.raw);
            if dither_mode != DitherMode::None {
                backend.canvas_config_set_dither_mode(config.raw, dither_mode);
            }
        }

        Ok(config)
    }
}

impl<B: ChafaBackend + ?Sized> Drop for CanvasConfig<'_, B> {
    fn drop(&mut self) {
        // SAFETY: the handle is released exactly once, here.
        unsafe { self.backend.canvas_config_unref(self.raw) };
    }
}

/// Copy of an image's pixels living in library-owned memory.
pub struct StagedPixels<'a, B: ChafaBackend + ?Sized> {
    backend: &'a B,
    raw: RawHandle,
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a, B: ChafaBackend + ?Sized> StagedPixels<'a, B> {
    pub fn new(backend: &'a B, image: &RasterImage) -> Result<Self> {
        Ok(StagedPixels {
            backend,
            raw: backend.stage_pixels(image.pixels())?,
            width: image.width(),
            height: image.height(),
            stride: image.stride(),
        })
    }
}

impl<B: ChafaBackend + ?Sized> Drop for StagedPixels<'_, B> {
    fn drop(&mut self) {
        // SAFETY: the buffer is freed exactly once, here.
        unsafe { self.backend.free_pixels(self.raw) };
    }
}

pub struct Canvas<'a, B: ChafaBackend + ?Sized> {
    backend: &'a B,
    raw: RawHandle,
    _config: PhantomData<&'a CanvasConfig<'a, B>>,
    _pixels: PhantomData<&'a StagedPixels<'a, B>>,
}

impl<'a, B: ChafaBackend + ?Sized> Canvas<'a, B> {
    /// Creates a canvas from `config` and submits `pixels` to it.
    pub fn new(config: &'a CanvasConfig<'a, B>, pixels: &'a StagedPixels<'a, B>) -> Result<Self> {
        let backend = config.backend;
        // SAFETY: `config.raw` is live while `config` is borrowed.
        let raw = unsafe { backend.canvas_new(config.raw)? };
        let canvas = Canvas {
            backend,
            raw,
            _config: PhantomData,
            _pixels: PhantomData,
        };

        // SAFETY: the canvas and the staged buffer are both live; the buffer outlives
        // the canvas through the borrow above.
        unsafe {
            backend.canvas_set_contents_rgba8(
                canvas.raw,
                pixels.raw,
                pixels.width,
                pixels.height,
                pixels.stride,
            )?
        };

        Ok(canvas)
    }

    pub fn build_ansi(&self) -> Result<String> {
        // SAFETY: `self.raw` is live until `self` drops.
        unsafe { self.backend.canvas_build_ansi(self.raw) }
    }
}

impl<B: ChafaBackend + ?Sized> Drop for Canvas<'_, B> {
    fn drop(&mut self) {
        // SAFETY: the handle is released exactly once, here.
        unsafe { self.backend.canvas_unref(self.raw) };
    }
}
