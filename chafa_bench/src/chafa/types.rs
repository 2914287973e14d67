use std::ffi::c_int;
use std::ops::BitOr;

use strum_macros::Display;

/// Bitmask of glyph categories the renderer may pick from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SymbolTags(u32);

impl SymbolTags {
    pub const NONE: SymbolTags = SymbolTags(0);
    pub const SPACE: SymbolTags = SymbolTags(0x1);
    pub const HALF: SymbolTags = SymbolTags(0x4);
    pub const BLOCK: SymbolTags = SymbolTags(0x8);
    pub const BORDER: SymbolTags = SymbolTags(0x10);
    pub const BRAILLE: SymbolTags = SymbolTags(0x800);
    pub const ASCII: SymbolTags = SymbolTags(0x4000);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: SymbolTags) -> SymbolTags {
        SymbolTags(self.0 | other.0)
    }

    pub const fn contains(self, other: SymbolTags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SymbolTags {
    type Output = SymbolTags;

    fn bitor(self, rhs: SymbolTags) -> SymbolTags {
        self.union(rhs)
    }
}

/// Output color fidelity of a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
#[repr(i32)]
pub enum CanvasMode {
    Truecolor = 0,
    #[strum(serialize = "256")]
    Indexed256 = 1,
    #[strum(serialize = "240")]
    Indexed240 = 2,
    #[strum(serialize = "16")]
    Indexed16 = 3,
    FgbgBgfg = 4,
    Fgbg = 5,
}

impl CanvasMode {
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }
}

/// Error dithering applied while reducing color fidelity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
#[repr(i32)]
pub enum DitherMode {
    None = 0,
    Ordered = 1,
    Diffusion = 2,
}

impl DitherMode {
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_combine_as_bitmask() {
        let tags = SymbolTags::SPACE | SymbolTags::BLOCK | SymbolTags::BORDER;
        assert_eq!(tags.bits(), 0x19);
        assert!(tags.contains(SymbolTags::BLOCK));
        assert!(!tags.contains(SymbolTags::ASCII));
    }

    #[test]
    fn raw_values_match_library_enums() {
        assert_eq!(CanvasMode::Truecolor.as_raw(), 0);
        assert_eq!(CanvasMode::Indexed256.as_raw(), 1);
        assert_eq!(CanvasMode::Indexed16.as_raw(), 3);
        assert_eq!(CanvasMode::Fgbg.as_raw(), 5);
        assert_eq!(DitherMode::Diffusion.as_raw(), 2);
    }

    #[test]
    fn modes_display_in_kebab_case() {
        assert_eq!(CanvasMode::Truecolor.to_string(), "truecolor");
        assert_eq!(CanvasMode::Indexed256.to_string(), "256");
        assert_eq!(DitherMode::Diffusion.to_string(), "diffusion");
    }
}
