//! In-process renderer double for tests and dry runs.
//!
//! [`CountingBackend`] implements [`ChafaBackend`] without any foreign code. It tracks every
//! handle it hands out, so tests can assert that acquires and releases balance and that
//! releases happen in the required order. Failures can be injected at individual calls.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::chafa::{CanvasMode, ChafaBackend, DitherMode, RawHandle, SymbolTags};
use crate::error::{Error, Result};

/// Kind of object behind a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    SymbolMap,
    CanvasConfig,
    Pixels,
    Canvas,
}

/// Call at which an injected failure fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePoint {
    SymbolMapNew,
    CanvasConfigNew,
    SetGeometry,
    StagePixels,
    CanvasNew,
    SetContents,
    BuildAnsi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Acquire(HandleKind),
    Release(HandleKind),
}

#[derive(Clone, Debug, Default)]
struct ConfigState {
    width: u32,
    height: u32,
    canvas_mode: Option<CanvasMode>,
    dither_mode: Option<DitherMode>,
    symbols: Option<RawHandle>,
}

#[derive(Clone, Debug)]
enum Object {
    SymbolMap(SymbolTags),
    Config(ConfigState),
    Pixels { checksum: u64, len: usize },
    Canvas { config: ConfigState, pixels: Option<u64> },
}

impl Object {
    fn kind(&self) -> HandleKind {
        match self {
            Object::SymbolMap(_) => HandleKind::SymbolMap,
            Object::Config(_) => HandleKind::CanvasConfig,
            Object::Pixels { .. } => HandleKind::Pixels,
            Object::Canvas { .. } => HandleKind::Canvas,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: usize,
    live: HashMap<usize, Object>,
    events: Vec<Event>,
    failure: Option<FailurePoint>,
    dither_calls: usize,
    renders: usize,
}

impl State {
    fn acquire(&mut self, object: Object) -> RawHandle {
        self.next_id += 1;
        self.events.push(Event::Acquire(object.kind()));
        self.live.insert(self.next_id, object);
        RawHandle::from_id(self.next_id)
    }

    fn release(&mut self, handle: RawHandle, kind: HandleKind) {
        let object = self
            .live
            .remove(&handle.id())
            .unwrap_or_else(|| panic!("release of unknown or already released {kind:?} handle"));
        assert_eq!(object.kind(), kind, "handle released through the wrong call");
        self.events.push(Event::Release(kind));
    }

    fn object_mut(&mut self, handle: RawHandle) -> &mut Object {
        self.live
            .get_mut(&handle.id())
            .unwrap_or_else(|| panic!("use of unknown handle {}", handle.id()))
    }

    fn config(&self, handle: RawHandle) -> ConfigState {
        match self.live.get(&handle.id()) {
            Some(Object::Config(config)) => config.clone(),
            other => panic!("expected a canvas config handle, found {other:?}"),
        }
    }

    fn check(&self, point: FailurePoint, call: &'static str) -> Result<()> {
        if self.failure == Some(point) {
            Err(Error::ExternalCall(call))
        } else {
            Ok(())
        }
    }
}

/// Deterministic renderer double that counts handle traffic.
///
/// Output depends on the configuration, the pixel content and the backend's `salt`; two
/// backends with the same salt behave like two output-compatible builds.
#[derive(Debug, Default)]
pub struct CountingBackend {
    salt: u64,
    state: RefCell<State>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose output differs from backends with another salt.
    pub fn with_salt(salt: u64) -> Self {
        Self {
            salt,
            ..Self::default()
        }
    }

    /// Makes every subsequent call at `point` fail until cleared.
    pub fn fail_at(&self, point: FailurePoint) {
        self.state.borrow_mut().failure = Some(point);
    }

    pub fn clear_failure(&self) {
        self.state.borrow_mut().failure = None;
    }

    pub fn acquired(&self) -> usize {
        self.count(|e| matches!(e, Event::Acquire(_)))
    }

    pub fn released(&self) -> usize {
        self.count(|e| matches!(e, Event::Release(_)))
    }

    pub fn live_handles(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.borrow().events.clone()
    }

    /// Release events in the order they happened.
    pub fn release_order(&self) -> Vec<HandleKind> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Release(kind) => Some(*kind),
                Event::Acquire(_) => None,
            })
            .collect()
    }

    pub fn dither_calls(&self) -> usize {
        self.state.borrow().dither_calls
    }

    /// Number of successful `canvas_build_ansi` calls.
    pub fn renders(&self) -> usize {
        self.state.borrow().renders
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.state.borrow().events.iter().filter(|e| pred(e)).count()
    }

    fn with_config(&self, config: RawHandle, f: impl FnOnce(&mut ConfigState)) {
        let mut state = self.state.borrow_mut();
        match state.object_mut(config) {
            Object::Config(cfg) => f(cfg),
            other => panic!("expected a canvas config handle, found {other:?}"),
        }
    }
}

const GLYPHS: [char; 8] = [' ', '░', '▒', '▓', '█', '▀', '▄', '#'];

fn render_text(config: &ConfigState, tags: SymbolTags, checksum: u64, salt: u64) -> String {
    let mode = config.canvas_mode.map_or(-1, |m| m.as_raw() as i64);
    let dither = config.dither_mode.map_or(0, |d| d.as_raw() as i64);
    let mut seed = checksum ^ salt.rotate_left(17) ^ u64::from(tags.bits()) << 32;
    seed ^= (mode as u64) << 8 ^ (dither as u64) << 12;

    let mut text = String::new();
    for y in 0..config.height {
        let _ = write!(text, "\x1b[38;5;{}m", (seed >> 3) % 256);
        for x in 0..config.width {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(u64::from(x ^ y) | 1);
            text.push(GLYPHS[(seed >> 61) as usize]);
        }
        text.push_str("\x1b[0m\n");
    }
    text
}

/// FNV-1a over the staged bytes.
fn checksum(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf29ce484222325u64, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(0x100000001b3)
    })
}

impl ChafaBackend for CountingBackend {
    fn symbol_map_new(&self) -> Result<RawHandle> {
        let mut state = self.state.borrow_mut();
        state.check(FailurePoint::SymbolMapNew, "chafa_symbol_map_new")?;
        Ok(state.acquire(Object::SymbolMap(SymbolTags::NONE)))
    }

    unsafe fn symbol_map_add_by_tags(&self, map: RawHandle, tags: SymbolTags) {
        let mut state = self.state.borrow_mut();
        match state.object_mut(map) {
            Object::SymbolMap(existing) => *existing = *existing | tags,
            other => panic!("expected a symbol map handle, found {other:?}"),
        }
    }

    unsafe fn symbol_map_unref(&self, map: RawHandle) {
        self.state.borrow_mut().release(map, HandleKind::SymbolMap);
    }

    fn canvas_config_new(&self) -> Result<RawHandle> {
        let mut state = self.state.borrow_mut();
        state.check(FailurePoint::CanvasConfigNew, "chafa_canvas_config_new")?;
        Ok(state.acquire(Object::Config(ConfigState::default())))
    }

    unsafe fn canvas_config_set_geometry(
        &self,
        config: RawHandle,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.state
            .borrow()
            .check(FailurePoint::SetGeometry, "chafa_canvas_config_set_geometry")?;
        self.with_config(config, |cfg| {
            cfg.width = width;
            cfg.height = height;
        });
        Ok(())
    }

    unsafe fn canvas_config_set_canvas_mode(&self, config: RawHandle, mode: CanvasMode) {
        self.with_config(config, |cfg| cfg.canvas_mode = Some(mode));
    }

    unsafe fn canvas_config_set_symbol_map(&self, config: RawHandle, map: RawHandle) {
        self.with_config(config, |cfg| cfg.symbols = Some(map));
    }

    unsafe fn canvas_config_set_dither_mode(&self, config: RawHandle, mode: DitherMode) {
        self.state.borrow_mut().dither_calls += 1;
        self.with_config(config, |cfg| cfg.dither_mode = Some(mode));
    }

    unsafe fn canvas_config_unref(&self, config: RawHandle) {
        self.state
            .borrow_mut()
            .release(config, HandleKind::CanvasConfig);
    }

    fn stage_pixels(&self, pixels: &[u8]) -> Result<RawHandle> {
        let mut state = self.state.borrow_mut();
        state.check(FailurePoint::StagePixels, "g_malloc")?;
        Ok(state.acquire(Object::Pixels {
            checksum: checksum(pixels),
            len: pixels.len(),
        }))
    }

    unsafe fn free_pixels(&self, buffer: RawHandle) {
        self.state.borrow_mut().release(buffer, HandleKind::Pixels);
    }

    unsafe fn canvas_new(&self, config: RawHandle) -> Result<RawHandle> {
        let mut state = self.state.borrow_mut();
        state.check(FailurePoint::CanvasNew, "chafa_canvas_new")?;
        let config = state.config(config);
        Ok(state.acquire(Object::Canvas {
            config,
            pixels: None,
        }))
    }

    unsafe fn canvas_set_contents_rgba8(
        &self,
        canvas: RawHandle,
        pixels: RawHandle,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailurePoint::SetContents, "chafa_canvas_set_contents_rgba8")?;

        let staged = match state.live.get(&pixels.id()) {
            Some(Object::Pixels { checksum, len }) => {
                assert_eq!(*len, stride * height as usize, "stride does not cover the buffer");
                assert_eq!(stride, width as usize * 4, "rows must be tightly packed");
                *checksum
            }
            other => panic!("expected a staged pixel buffer, found {other:?}"),
        };

        match state.object_mut(canvas) {
            Object::Canvas { pixels, .. } => *pixels = Some(staged),
            other => panic!("expected a canvas handle, found {other:?}"),
        }
        Ok(())
    }

    unsafe fn canvas_build_ansi(&self, canvas: RawHandle) -> Result<String> {
        let mut state = self.state.borrow_mut();
        state.check(FailurePoint::BuildAnsi, "chafa_canvas_build_ansi")?;

        let (config, pixels) = match state.live.get(&canvas.id()) {
            Some(Object::Canvas { config, pixels }) => (config.clone(), *pixels),
            other => panic!("expected a canvas handle, found {other:?}"),
        };
        let tags = match config.symbols.and_then(|map| state.live.get(&map.id())) {
            Some(Object::SymbolMap(tags)) => *tags,
            _ => panic!("canvas rendered after its symbol map was released"),
        };
        let checksum = pixels.unwrap_or_else(|| panic!("canvas rendered without contents"));

        state.renders += 1;
        Ok(render_text(&config, tags, checksum, self.salt))
    }

    unsafe fn canvas_unref(&self, canvas: RawHandle) {
        self.state.borrow_mut().release(canvas, HandleKind::Canvas);
    }
}
