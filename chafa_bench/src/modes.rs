//! Named render configurations exercised by the benchmarks.

use crate::chafa::{CanvasMode, DitherMode, SymbolTags};

/// A named combination of glyph set, color mode and dithering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderMode {
    pub name: &'static str,
    pub symbols: SymbolTags,
    pub canvas_mode: CanvasMode,
    pub dither_mode: DitherMode,
}

impl RenderMode {
    pub const fn new(
        name: &'static str,
        symbols: SymbolTags,
        canvas_mode: CanvasMode,
    ) -> RenderMode {
        RenderMode {
            name,
            symbols,
            canvas_mode,
            dither_mode: DitherMode::None,
        }
    }

    #[must_use]
    pub const fn with_dither(mut self, dither_mode: DitherMode) -> RenderMode {
        self.dither_mode = dither_mode;
        self
    }
}

const BLOCK_SYMBOLS: SymbolTags = SymbolTags::SPACE
    .union(SymbolTags::BLOCK)
    .union(SymbolTags::BORDER);
const HALF_BLOCK_SYMBOLS: SymbolTags = SymbolTags::SPACE.union(SymbolTags::HALF);
const ASCII_SYMBOLS: SymbolTags = SymbolTags::SPACE.union(SymbolTags::ASCII);

pub const BLOCK: RenderMode = RenderMode::new("block", BLOCK_SYMBOLS, CanvasMode::Truecolor);
pub const BLOCK_256: RenderMode =
    RenderMode::new("block-256", BLOCK_SYMBOLS, CanvasMode::Indexed256);
pub const HALF_BLOCK: RenderMode =
    RenderMode::new("half-block", HALF_BLOCK_SYMBOLS, CanvasMode::Truecolor);
pub const HALF_BLOCK_256: RenderMode =
    RenderMode::new("half-block-256", HALF_BLOCK_SYMBOLS, CanvasMode::Indexed256);
pub const ASCII: RenderMode = RenderMode::new("ascii", ASCII_SYMBOLS, CanvasMode::Truecolor);
pub const ASCII_256: RenderMode =
    RenderMode::new("ascii-256", ASCII_SYMBOLS, CanvasMode::Indexed256);
pub const BRAILLE: RenderMode = RenderMode::new("braille", SymbolTags::BRAILLE, CanvasMode::Fgbg);
pub const BRAILLE_DITHER: RenderMode =
    RenderMode::new("braille-dither", SymbolTags::BRAILLE, CanvasMode::Fgbg)
        .with_dither(DitherMode::Diffusion);

/// Benchmark matrix modes, in report order.
pub const RENDER_MODES: [RenderMode; 8] = [
    BLOCK,
    BLOCK_256,
    HALF_BLOCK,
    HALF_BLOCK_256,
    ASCII,
    ASCII_256,
    BRAILLE,
    BRAILLE_DITHER,
];

/// Modes compared between baseline and candidate builds.
pub const VERIFY_MODES: [RenderMode; 3] = [BLOCK, BLOCK_256, BRAILLE];

/// Modes given a dedicated baseline-vs-candidate chart in the report.
pub const HEADLINE_MODES: [&str; 4] = ["block", "ascii", "braille", "braille-dither"];

/// Looks up a benchmark mode by name.
pub fn find(name: &str) -> Option<RenderMode> {
    RENDER_MODES.iter().copied().find(|mode| mode.name == name)
}
