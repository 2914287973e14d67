use std::ffi::c_void;

use super::types::{CanvasMode, DitherMode, SymbolTags};
use crate::error::Result;

/// Opaque handle to an object owned by the renderer library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawHandle(usize);

impl RawHandle {
    /// Wraps a pointer returned by the library. `None` for null.
    pub fn from_ptr(ptr: *mut c_void) -> Option<RawHandle> {
        if ptr.is_null() {
            None
        } else {
            Some(RawHandle(ptr as usize))
        }
    }

    /// Handle for backends that do not hand out real pointers. Must be non-zero.
    pub fn from_id(id: usize) -> RawHandle {
        assert_ne!(id, 0, "handle ids must be non-zero");
        RawHandle(id)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn id(self) -> usize {
        self.0
    }
}

/// Entry points of the renderer library.
///
/// Constructors return fresh handles owned by the caller; every handle must be passed to
/// the matching release function exactly once. Methods taking handles are `unsafe`: the
/// caller guarantees the handle came from this backend and has not been released.
/// [`super::handles`] wraps these pairs in guards so callers never touch them directly.
pub trait ChafaBackend {
    fn symbol_map_new(&self) -> Result<RawHandle>;
    unsafe fn symbol_map_add_by_tags(&self, map: RawHandle, tags: SymbolTags);
    unsafe fn symbol_map_unref(&self, map: RawHandle);

    fn canvas_config_new(&self) -> Result<RawHandle>;
    /// Fails when a dimension does not fit the library's integer type.
    unsafe fn canvas_config_set_geometry(
        &self,
        config: RawHandle,
        width: u32,
        height: u32,
    ) -> Result<()>;
    unsafe fn canvas_config_set_canvas_mode(&self, config: RawHandle, mode: CanvasMode);
    unsafe fn canvas_config_set_symbol_map(&self, config: RawHandle, map: RawHandle);
    unsafe fn canvas_config_set_dither_mode(&self, config: RawHandle, mode: DitherMode);
    unsafe fn canvas_config_unref(&self, config: RawHandle);

    /// Copies `pixels` into a buffer allocated by the library.
    fn stage_pixels(&self, pixels: &[u8]) -> Result<RawHandle>;
    unsafe fn free_pixels(&self, buffer: RawHandle);

    unsafe fn canvas_new(&self, config: RawHandle) -> Result<RawHandle>;
    unsafe fn canvas_set_contents_rgba8(
        &self,
        canvas: RawHandle,
        pixels: RawHandle,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<()>;
    /// Renders the canvas to text with terminal escape sequences.
    unsafe fn canvas_build_ansi(&self, canvas: RawHandle) -> Result<String>;
    unsafe fn canvas_unref(&self, canvas: RawHandle);
}
