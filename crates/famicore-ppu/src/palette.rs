//! Palette RAM and the embedded master palette.
//!
//! 32 bytes of palette RAM with the $3F10/$14/$18/$1C mirrors aliased onto
//! $3F00/$04/$08/$0C for both reads and writes, plus the 64-entry RGB
//! lookup used to produce frame-buffer pixels. Greyscale masks the palette
//! index with $30 before lookup; emphasis bits attenuate the channels that
//! are not emphasized.

use crate::registers::PpuMask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 32-byte palette RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PaletteRam {
    data: [u8; 32],
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteRam {
    /// Fresh palette RAM (all zero; hardware is uninitialized).
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0; 32] }
    }

    /// Fold a PPU address (or raw index) down to the backing slot,
    /// applying the $3F1x alias.
    fn slot(addr: u16) -> usize {
        let index = (addr & 0x1F) as usize;
        match index {
            0x10 | 0x14 | 0x18 | 0x1C => index - 0x10,
            _ => index,
        }
    }

    /// Read a palette entry (6 bits).
    #[inline]
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        self.data[Self::slot(addr)]
    }

    /// Write a palette entry. Only 6 bits are stored.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.data[Self::slot(addr)] = value & 0x3F;
    }
}

/// Embedded 64-entry master palette (RP2C02 output digitized to RGB).
pub const SYSTEM_PALETTE: [[u8; 3]; 64] = [
    [0x54, 0x54, 0x54], [0x00, 0x1E, 0x74], [0x08, 0x10, 0x90], [0x30, 0x00, 0x88],
    [0x44, 0x00, 0x64], [0x5C, 0x00, 0x30], [0x54, 0x04, 0x00], [0x3C, 0x18, 0x00],
    [0x20, 0x2A, 0x00], [0x08, 0x3A, 0x00], [0x00, 0x40, 0x00], [0x00, 0x3C, 0x00],
    [0x00, 0x32, 0x3C], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0x98, 0x96, 0x98], [0x08, 0x4C, 0xC4], [0x30, 0x32, 0xEC], [0x5C, 0x1E, 0xE4],
    [0x88, 0x14, 0xB0], [0xA0, 0x14, 0x64], [0x98, 0x22, 0x20], [0x78, 0x3C, 0x00],
    [0x54, 0x5A, 0x00], [0x28, 0x72, 0x00], [0x08, 0x7C, 0x00], [0x00, 0x76, 0x28],
    [0x00, 0x66, 0x78], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0xEC, 0xEE, 0xEC], [0x4C, 0x9A, 0xEC], [0x78, 0x7C, 0xEC], [0xB0, 0x62, 0xEC],
    [0xE4, 0x54, 0xEC], [0xEC, 0x58, 0xB4], [0xEC, 0x6A, 0x64], [0xD4, 0x88, 0x20],
    [0xA0, 0xAA, 0x00], [0x74, 0xC4, 0x00], [0x4C, 0xD0, 0x20], [0x38, 0xCC, 0x6C],
    [0x38, 0xB4, 0xCC], [0x3C, 0x3C, 0x3C], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0xEC, 0xEE, 0xEC], [0xA8, 0xCC, 0xEC], [0xBC, 0xBC, 0xEC], [0xD4, 0xB2, 0xEC],
    [0xEC, 0xAE, 0xEC], [0xEC, 0xAE, 0xD4], [0xEC, 0xB4, 0xB0], [0xE4, 0xC4, 0x90],
    [0xCC, 0xD2, 0x78], [0xB4, 0xDE, 0x78], [0xA8, 0xE2, 0x90], [0x98, 0xE2, 0xB4],
    [0xA0, 0xD6, 0xE4], [0xA0, 0xA2, 0xA0], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
];

/// Convert a palette-RAM value to an RGBA pixel under the effective mask.
#[must_use]
pub fn color_rgba(palette_value: u8, mask: PpuMask) -> [u8; 4] {
    let mut index = palette_value & 0x3F;
    if mask.contains(PpuMask::GREYSCALE) {
        index &= 0x30;
    }
    let [mut r, mut g, mut b] = SYSTEM_PALETTE[usize::from(index)];

    // Emphasis dims the channels that are not emphasized.
    let any = mask.intersects(
        PpuMask::EMPHASIS_RED | PpuMask::EMPHASIS_GREEN | PpuMask::EMPHASIS_BLUE,
    );
    if any {
        if !mask.contains(PpuMask::EMPHASIS_RED) {
            r = attenuate(r);
        }
        if !mask.contains(PpuMask::EMPHASIS_GREEN) {
            g = attenuate(g);
        }
        if !mask.contains(PpuMask::EMPHASIS_BLUE) {
            b = attenuate(b);
        }
    }
    [r, g, b, 0xFF]
}

#[inline]
fn attenuate(channel: u8) -> u8 {
    (u16::from(channel) * 3 / 4) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn backdrop_mirrors_alias_both_ways() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F10, 0x2A);
        assert_eq!(palette.read(0x3F00), 0x2A);
        palette.write(0x3F04, 0x11);
        assert_eq!(palette.read(0x3F14), 0x11);
        palette.write(0x3F18, 0x05);
        assert_eq!(palette.read(0x3F08), 0x05);
        palette.write(0x3F0C, 0x3F);
        assert_eq!(palette.read(0x3F1C), 0x3F);
    }

    #[test]
    fn non_mirror_slots_are_distinct() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F01, 0x01);
        palette.write(0x3F11, 0x02);
        assert_eq!(palette.read(0x3F01), 0x01);
        assert_eq!(palette.read(0x3F11), 0x02);
    }

    #[test]
    fn writes_keep_six_bits() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F00, 0xFF);
        assert_eq!(palette.read(0x3F00), 0x3F);
    }

    #[test]
    fn greyscale_masks_index() {
        let grey = color_rgba(0x21, PpuMask::GREYSCALE);
        let base = color_rgba(0x20, PpuMask::empty());
        assert_eq!(grey, base);
    }

    #[test]
    fn emphasis_dims_other_channels() {
        let plain = color_rgba(0x20, PpuMask::empty());
        let red = color_rgba(0x20, PpuMask::EMPHASIS_RED);
        assert_eq!(red[0], plain[0]);
        assert!(red[1] < plain[1]);
        assert!(red[2] < plain[2]);
    }

    proptest! {
        // Mirror law over the whole address space: $3F1x and $3F0x alias
        // for x in {0,4,8,C}, modulo the 32-byte wrap.
        #[test]
        fn mirror_law(offset in prop::sample::select(vec![0x00u16, 0x04, 0x08, 0x0C]),
                      value in 0u8..=0x3F,
                      page in 0u16..8) {
            let mut palette = PaletteRam::new();
            let base = 0x3F00 + page * 0x20;
            palette.write(base + 0x10 + offset, value);
            prop_assert_eq!(palette.read(0x3F00 + offset), value);
        }
    }
}
