//! PPU chip variants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which PPU silicon is being emulated. The variant selects the scanline
/// count and nominal frame rate; the dot engine is otherwise shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PpuVariant {
    /// NTSC RP2C02G: 262 scanlines, ~60.10 Hz.
    #[default]
    Rp2c02g,
    /// PAL RP2C07: 312 scanlines, ~50.01 Hz.
    Rp2c07,
}

impl PpuVariant {
    /// Scanlines per frame, pre-render line included.
    #[must_use]
    pub const fn scanlines_per_frame(self) -> u16 {
        match self {
            Self::Rp2c02g => 262,
            Self::Rp2c07 => 312,
        }
    }

    /// Nominal frame rate in Hz.
    #[must_use]
    pub const fn frame_rate(self) -> f64 {
        match self {
            Self::Rp2c02g => 60.0988,
            Self::Rp2c07 => 50.0070,
        }
    }

    /// Whether the odd-frame dot skip applies (NTSC only).
    #[must_use]
    pub const fn has_odd_frame_skip(self) -> bool {
        matches!(self, Self::Rp2c02g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanline_counts() {
        assert_eq!(PpuVariant::Rp2c02g.scanlines_per_frame(), 262);
        assert_eq!(PpuVariant::Rp2c07.scanlines_per_frame(), 312);
        assert!(PpuVariant::Rp2c02g.has_odd_frame_skip());
        assert!(!PpuVariant::Rp2c07.has_odd_frame_skip());
    }
}
