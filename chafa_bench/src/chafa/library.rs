//! Runtime-loaded renderer library.
//!
//! Every entry point is resolved once at load time. Loading two builds from two paths
//! yields two independent instances, which is what output verification compares.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::info;

use super::backend::{ChafaBackend, RawHandle};
use super::types::{CanvasMode, DitherMode, SymbolTags};
use crate::error::{Error, Result};

type NewFn = unsafe extern "C" fn() -> *mut c_void;
type UnrefFn = unsafe extern "C" fn(*mut c_void);
type SetIntFn = unsafe extern "C" fn(*mut c_void, c_int);
type SetGeometryFn = unsafe extern "C" fn(*mut c_void, c_int, c_int);
type SetSymbolMapFn = unsafe extern "C" fn(*mut c_void, *const c_void);
type CanvasNewFn = unsafe extern "C" fn(*const c_void) -> *mut c_void;
type SetContentsFn = unsafe extern "C" fn(*mut c_void, *const u8, c_int, c_int, c_int);
type BuildAnsiFn = unsafe extern "C" fn(*mut c_void) -> *mut c_void;
type MallocFn = unsafe extern "C" fn(usize) -> *mut c_void;
type FreeFn = unsafe extern "C" fn(*mut c_void);
type StringFreeFn = unsafe extern "C" fn(*mut c_void, c_int) -> *mut c_char;

struct Symbols {
    symbol_map_new: NewFn,
    symbol_map_add_by_tags: SetIntFn,
    symbol_map_unref: UnrefFn,
    canvas_config_new: NewFn,
    canvas_config_set_geometry: SetGeometryFn,
    canvas_config_set_canvas_mode: SetIntFn,
    canvas_config_set_symbol_map: SetSymbolMapFn,
    canvas_config_set_dither_mode: SetIntFn,
    canvas_config_unref: UnrefFn,
    canvas_new: CanvasNewFn,
    canvas_set_contents_rgba8: SetContentsFn,
    canvas_build_ansi: BuildAnsiFn,
    canvas_unref: UnrefFn,
    malloc: MallocFn,
    free: FreeFn,
    string_free: StringFreeFn,
}

/// A renderer library loaded from a shared object.
pub struct ChafaLibrary {
    path: PathBuf,
    symbols: Symbols,
    // Keeps the code behind `symbols` mapped.
    _library: Library,
}

impl ChafaLibrary {
    /// Loads the library at `path` and resolves every entry point the harness uses.
    /// A missing symbol fails the whole load.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ChafaLibrary> {
        let path = path.as_ref().to_path_buf();

        // SAFETY: loading runs the library's initializers, which only set up its own
        // global state.
        let library = unsafe { Library::new(&path) }.map_err(|source| Error::LibraryLoad {
            path: path.clone(),
            source,
        })?;

        let resolve = Resolver {
            library: &library,
            path: &path,
        };
        let symbols = Symbols {
            symbol_map_new: resolve.get("chafa_symbol_map_new")?,
            symbol_map_add_by_tags: resolve.get("chafa_symbol_map_add_by_tags")?,
            symbol_map_unref: resolve.get("chafa_symbol_map_unref")?,
            canvas_config_new: resolve.get("chafa_canvas_config_new")?,
            canvas_config_set_geometry: resolve.get("chafa_canvas_config_set_geometry")?,
            canvas_config_set_canvas_mode: resolve.get("chafa_canvas_config_set_canvas_mode")?,
            canvas_config_set_symbol_map: resolve.get("chafa_canvas_config_set_symbol_map")?,
            canvas_config_set_dither_mode: resolve.get("chafa_canvas_config_set_dither_mode")?,
            canvas_config_unref: resolve.get("chafa_canvas_config_unref")?,
            canvas_new: resolve.get("chafa_canvas_new")?,
            canvas_set_contents_rgba8: resolve.get("chafa_canvas_set_contents_rgba8")?,
            canvas_build_ansi: resolve.get("chafa_canvas_build_ansi")?,
            canvas_unref: resolve.get("chafa_canvas_unref")?,
            malloc: resolve.get("g_malloc")?,
            free: resolve.get("g_free")?,
            string_free: resolve.get("g_string_free")?,
        };

        info!(path = %path.display(), "Loaded renderer library");

        Ok(ChafaLibrary {
            path,
            symbols,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct Resolver<'a> {
    library: &'a Library,
    path: &'a Path,
}

impl Resolver<'_> {
    fn get<T: Copy>(&self, name: &str) -> Result<T> {
        // SAFETY: each call site pairs the symbol name with the C signature declared by
        // the library's public headers.
        let symbol = unsafe { self.library.get::<T>(name.as_bytes()) }.map_err(|source| {
            Error::MissingSymbol {
                path: self.path.to_path_buf(),
                symbol: name.to_string(),
                source,
            }
        })?;
        Ok(*symbol)
    }
}

fn to_c_int(value: impl TryInto<c_int>, call: &'static str) -> Result<c_int> {
    value.try_into().map_err(|_| Error::ExternalCall(call))
}

fn handle(ptr: *mut c_void, call: &'static str) -> Result<RawHandle> {
    RawHandle::from_ptr(ptr).ok_or(Error::ExternalCall(call))
}

impl ChafaBackend for ChafaLibrary {
    fn symbol_map_new(&self) -> Result<RawHandle> {
        // SAFETY: takes no arguments; returns an owned map or null.
        handle(
            unsafe { (self.symbols.symbol_map_new)() },
            "chafa_symbol_map_new",
        )
    }

    unsafe fn symbol_map_add_by_tags(&self, map: RawHandle, tags: SymbolTags) {
        unsafe { (self.symbols.symbol_map_add_by_tags)(map.as_ptr(), tags.bits() as c_int) }
    }

    unsafe fn symbol_map_unref(&self, map: RawHandle) {
        unsafe { (self.symbols.symbol_map_unref)(map.as_ptr()) }
    }

    fn canvas_config_new(&self) -> Result<RawHandle> {
        // SAFETY: takes no arguments; returns an owned config or null.
        handle(
            unsafe { (self.symbols.canvas_config_new)() },
            "chafa_canvas_config_new",
        )
    }

    unsafe fn canvas_config_set_geometry(
        &self,
        config: RawHandle,
        width: u32,
        height: u32,
    ) -> Result<()> {
        const CALL: &str = "chafa_canvas_config_set_geometry";
        let width = to_c_int(width, CALL)?;
        let height = to_c_int(height, CALL)?;
        unsafe { (self.symbols.canvas_config_set_geometry)(config.as_ptr(), width, height) };
        Ok(())
    }

    unsafe fn canvas_config_set_canvas_mode(&self, config: RawHandle, mode: CanvasMode) {
        unsafe { (self.symbols.canvas_config_set_canvas_mode)(config.as_ptr(), mode.as_raw()) }
    }

    unsafe fn canvas_config_set_symbol_map(&self, config: RawHandle, map: RawHandle) {
        unsafe { (self.symbols.canvas_config_set_symbol_map)(config.as_ptr(), map.as_ptr()) }
    }

    unsafe fn canvas_config_set_dither_mode(&self, config: RawHandle, mode: DitherMode) {
        unsafe { (self.symbols.canvas_config_set_dither_mode)(config.as_ptr(), mode.as_raw()) }
    }

    unsafe fn canvas_config_unref(&self, config: RawHandle) {
        unsafe { (self.symbols.canvas_config_unref)(config.as_ptr()) }
    }

    fn stage_pixels(&self, pixels: &[u8]) -> Result<RawHandle> {
        // SAFETY: g_malloc returns a buffer of at least `len` bytes (or null for 0),
        // which cannot overlap the borrowed slice.
        unsafe {
            let buffer = handle((self.symbols.malloc)(pixels.len()), "g_malloc")?;
            std::ptr::copy_nonoverlapping(pixels.as_ptr(), buffer.as_ptr() as *mut u8, pixels.len());
            Ok(buffer)
        }
    }

    unsafe fn free_pixels(&self, buffer: RawHandle) {
        unsafe { (self.symbols.free)(buffer.as_ptr()) }
    }

    unsafe fn canvas_new(&self, config: RawHandle) -> Result<RawHandle> {
        handle(
            unsafe { (self.symbols.canvas_new)(config.as_ptr()) },
            "chafa_canvas_new",
        )
    }

    unsafe fn canvas_set_contents_rgba8(
        &self,
        canvas: RawHandle,
        pixels: RawHandle,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<()> {
        let call = "chafa_canvas_set_contents_rgba8";
        let width = to_c_int(width, call)?;
        let height = to_c_int(height, call)?;
        let stride = to_c_int(stride, call)?;

        unsafe {
            (self.symbols.canvas_set_contents_rgba8)(
                canvas.as_ptr(),
                pixels.as_ptr() as *const u8,
                width,
                height,
                stride,
            )
        };
        Ok(())
    }

    unsafe fn canvas_build_ansi(&self, canvas: RawHandle) -> Result<String> {
        unsafe {
            let gstring = (self.symbols.canvas_build_ansi)(canvas.as_ptr());
            if gstring.is_null() {
                return Err(Error::ExternalCall("chafa_canvas_build_ansi"));
            }

            // Frees the GString wrapper and hands us ownership of the character data.
            let chars = (self.symbols.string_free)(gstring, 0);
            if chars.is_null() {
                return Err(Error::ExternalCall("g_string_free"));
            }

            let bytes = CStr::from_ptr(chars).to_bytes().to_vec();
            (self.symbols.free)(chars as *mut c_void);

            Ok(String::from_utf8(bytes)?)
        }
    }

    unsafe fn canvas_unref(&self, canvas: RawHandle) {
        unsafe { (self.symbols.canvas_unref)(canvas.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_dimensions_are_rejected_not_clamped() {
        let call = "chafa_canvas_config_set_geometry";
        assert_eq!(to_c_int(640u32, call).unwrap(), 640);
        assert_eq!(to_c_int(c_int::MAX as u32, call).unwrap(), c_int::MAX);
        assert!(matches!(
            to_c_int(u32::MAX, call),
            Err(Error::ExternalCall("chafa_canvas_config_set_geometry"))
        ));
    }
}
