//! Nametable mirroring.
//!
//! The PPU owns 2 KiB of physical nametable RAM; the 4 KiB logical window
//! at $2000-$2FFF is folded onto it according to the cartridge's mirroring
//! mode. Four-screen boards carry their own extra VRAM on the cartridge;
//! the core treats them as vertical over the internal 2 KiB and leaves the
//! rest to the mapper.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nametable mirroring arrangement, dictated by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mirroring {
    /// $2000/$2400 share, $2800/$2C00 share.
    #[default]
    Horizontal,
    /// $2000/$2800 share, $2400/$2C00 share.
    Vertical,
    /// Everything maps to the first physical KiB.
    SingleScreenLower,
    /// Everything maps to the second physical KiB.
    SingleScreenUpper,
    /// Mapper-provided VRAM; internal RAM behaves as vertical.
    FourScreen,
}

/// Fold a $2000-$3EFF address onto the 2 KiB physical nametable RAM.
#[must_use]
pub fn ciram_index(mirroring: Mirroring, addr: u16) -> usize {
    let addr = addr & 0x0FFF;
    let offset = (addr & 0x03FF) as usize;
    let table = match mirroring {
        Mirroring::Horizontal => (addr >> 11) & 1,
        Mirroring::Vertical | Mirroring::FourScreen => (addr >> 10) & 1,
        Mirroring::SingleScreenLower => 0,
        Mirroring::SingleScreenUpper => 1,
    };
    (table as usize) * 0x400 + offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_pairs() {
        assert_eq!(
            ciram_index(Mirroring::Horizontal, 0x2000),
            ciram_index(Mirroring::Horizontal, 0x2400)
        );
        assert_eq!(
            ciram_index(Mirroring::Horizontal, 0x2800),
            ciram_index(Mirroring::Horizontal, 0x2C00)
        );
        assert_ne!(
            ciram_index(Mirroring::Horizontal, 0x2000),
            ciram_index(Mirroring::Horizontal, 0x2800)
        );
    }

    #[test]
    fn vertical_pairs() {
        assert_eq!(
            ciram_index(Mirroring::Vertical, 0x2000),
            ciram_index(Mirroring::Vertical, 0x2800)
        );
        assert_eq!(
            ciram_index(Mirroring::Vertical, 0x2400),
            ciram_index(Mirroring::Vertical, 0x2C00)
        );
        assert_ne!(
            ciram_index(Mirroring::Vertical, 0x2000),
            ciram_index(Mirroring::Vertical, 0x2400)
        );
    }

    #[test]
    fn single_screen() {
        assert_eq!(ciram_index(Mirroring::SingleScreenLower, 0x2C00), 0);
        assert_eq!(ciram_index(Mirroring::SingleScreenUpper, 0x2000), 0x400);
    }

    #[test]
    fn mirror_region_folds_down() {
        // $3000-$3EFF mirrors $2000-$2EFF.
        assert_eq!(
            ciram_index(Mirroring::Vertical, 0x3123),
            ciram_index(Mirroring::Vertical, 0x2123)
        );
    }
}
