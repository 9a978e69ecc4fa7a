//! CPU-visible PPU register byte-structs (PPUCTRL, PPUMASK, PPUSTATUS).

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// PPUCTRL ($2000, write-only).
    ///
    /// ```text
    /// 7  bit  0
    /// VPHB SINN
    /// |||| ||++- Base nametable select (also latched into t bits 10-11)
    /// |||| |+--- VRAM increment: 0 = +1, 1 = +32
    /// |||| +---- Sprite pattern table for 8x8 sprites
    /// |||+------ Background pattern table
    /// ||+------- Sprite size: 0 = 8x8, 1 = 8x16
    /// |+-------- Master/slave (ignored)
    /// +--------- NMI at VBlank start
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct PpuCtrl: u8 {
        /// Nametable select, horizontal bit.
        const NAMETABLE_X = 0b0000_0001;
        /// Nametable select, vertical bit.
        const NAMETABLE_Y = 0b0000_0010;
        /// VRAM address increment stride (0: +1, 1: +32).
        const VRAM_INCREMENT = 0b0000_0100;
        /// Sprite pattern table base (8x8 mode only).
        const SPRITE_TABLE = 0b0000_1000;
        /// Background pattern table base.
        const BG_TABLE = 0b0001_0000;
        /// Sprite size (0: 8x8, 1: 8x16).
        const SPRITE_SIZE = 0b0010_0000;
        /// Master/slave select, unused on the NES.
        const MASTER_SLAVE = 0b0100_0000;
        /// Generate an NMI at the start of VBlank.
        const NMI_ENABLE = 0b1000_0000;
    }
}

impl PpuCtrl {
    /// VRAM address increment applied after each $2007 access.
    #[inline]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    /// Sprite pattern table base for 8x8 sprites.
    #[inline]
    pub fn sprite_table_addr(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Background pattern table base.
    #[inline]
    pub fn bg_table_addr(self) -> u16 {
        if self.contains(Self::BG_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite height in pixels (8 or 16).
    #[inline]
    pub fn sprite_height(self) -> u16 {
        if self.contains(Self::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }

    /// True when an NMI should be raised while the VBlank flag is set.
    #[inline]
    pub fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

bitflags! {
    /// PPUMASK ($2001, write-only).
    ///
    /// The live value governs the rendering-state side effects on v/t;
    /// pixel visibility and sprite-0 hit use the value three dots in the
    /// past (see [`crate::MaskDelay`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct PpuMask: u8 {
        /// Greyscale: palette indices are masked with $30 before lookup.
        const GREYSCALE = 0b0000_0001;
        /// Show background in the leftmost 8 pixels.
        const BG_LEFT = 0b0000_0010;
        /// Show sprites in the leftmost 8 pixels.
        const SPRITE_LEFT = 0b0000_0100;
        /// Enable background rendering.
        const BG_ENABLE = 0b0000_1000;
        /// Enable sprite rendering.
        const SPRITE_ENABLE = 0b0001_0000;
        /// Emphasize red (green on PAL).
        const EMPHASIS_RED = 0b0010_0000;
        /// Emphasize green (red on PAL).
        const EMPHASIS_GREEN = 0b0100_0000;
        /// Emphasize blue.
        const EMPHASIS_BLUE = 0b1000_0000;
    }
}

impl PpuMask {
    /// Either rendering pipe enabled.
    #[inline]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::BG_ENABLE | Self::SPRITE_ENABLE)
    }

    /// Background pipe enabled.
    #[inline]
    pub fn show_background(self) -> bool {
        self.contains(Self::BG_ENABLE)
    }

    /// Sprite pipe enabled.
    #[inline]
    pub fn show_sprites(self) -> bool {
        self.contains(Self::SPRITE_ENABLE)
    }

    /// Background visible in the left 8-pixel column.
    #[inline]
    pub fn show_bg_left(self) -> bool {
        self.contains(Self::BG_LEFT)
    }

    /// Sprites visible in the left 8-pixel column.
    #[inline]
    pub fn show_sprites_left(self) -> bool {
        self.contains(Self::SPRITE_LEFT)
    }
}

bitflags! {
    /// PPUSTATUS ($2002, read-only). The low five bits are open bus,
    /// supplied by the system bus at read time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct PpuStatus: u8 {
        /// More than 8 sprites found on a scanline (simplified rule).
        const SPRITE_OVERFLOW = 0b0010_0000;
        /// Sprite 0 overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Vertical blank in progress.
        const VBLANK = 0b1000_0000;
    }
}

impl PpuStatus {
    /// VBlank flag state.
    #[inline]
    pub fn in_vblank(self) -> bool {
        self.contains(Self::VBLANK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_accessors() {
        assert_eq!(PpuCtrl::empty().vram_increment(), 1);
        assert_eq!(PpuCtrl::VRAM_INCREMENT.vram_increment(), 32);
        assert_eq!(PpuCtrl::empty().sprite_table_addr(), 0x0000);
        assert_eq!(PpuCtrl::SPRITE_TABLE.sprite_table_addr(), 0x1000);
        assert_eq!(PpuCtrl::BG_TABLE.bg_table_addr(), 0x1000);
        assert_eq!(PpuCtrl::empty().sprite_height(), 8);
        assert_eq!(PpuCtrl::SPRITE_SIZE.sprite_height(), 16);
        assert!(PpuCtrl::NMI_ENABLE.nmi_enabled());
    }

    #[test]
    fn mask_rendering_enabled() {
        assert!(!PpuMask::empty().rendering_enabled());
        assert!(PpuMask::BG_ENABLE.rendering_enabled());
        assert!(PpuMask::SPRITE_ENABLE.rendering_enabled());
        assert!((PpuMask::BG_ENABLE | PpuMask::SPRITE_ENABLE).rendering_enabled());
    }

    #[test]
    fn status_bits_are_top_three() {
        let all = PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW;
        assert_eq!(all.bits(), 0xE0);
    }
}
