//! Adapter over the external image-to-text renderer.

mod backend;
mod handles;
mod library;
mod renderer;
mod types;


pub use backend::{ChafaBackend, RawHandle};
pub use handles::{Canvas, CanvasConfig, StagedPixels, SymbolMap};
pub use library::ChafaLibrary;
pub use renderer::Renderer;
pub use types::{CanvasMode, DitherMode, SymbolTags};
