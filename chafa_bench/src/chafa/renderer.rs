use tracing::trace;

use super::backend::ChafaBackend;
use super::handles::{Canvas, CanvasConfig, StagedPixels, SymbolMap};
use crate::error::Result;
use crate::modes::RenderMode;
use crate::raster::RasterImage;

/// Renders images to terminal text through a [`ChafaBackend`].
pub struct Renderer<B: ChafaBackend> {
    backend: B,
}

impl<B: ChafaBackend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// One full construct/render/release cycle.
    ///
    /// Everything acquired here is released before returning, on success and on error,
    /// in the order canvas, staged pixels, canvas config, symbol map.
    pub fn render(
        &self,
        image: &RasterImage,
        mode: &RenderMode,
        width: u32,
        height: u32,
    ) -> Result<String> {
        trace!(mode = mode.name, width, height, "render");

        let symbols = SymbolMap::new(&self.backend, mode.symbols)?;
        let config = CanvasConfig::new(
            &symbols,
            width,
            height,
            mode.canvas_mode,
            mode.dither_mode,
        )?;
        let pixels = StagedPixels::new(&self.backend, image)?;
        let canvas = Canvas::new(&config, &pixels)?;

        canvas.build_ansi()
    }
}
