//! Console variant selection.

use famicore_cpu::CpuVariant;
use famicore_ppu::PpuVariant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The console being emulated. Selects the CPU and PPU silicon and the
/// APU frame-counter cadence; everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConsoleVariant {
    /// NES-001 (NTSC front loader).
    #[default]
    NtscFrontLoader,
    /// NES-101 (NTSC top loader).
    NtscTopLoader,
    /// PAL NES.
    Pal,
    /// Famicom.
    Famicom,
    /// AV Famicom.
    FamicomAv,
}

impl ConsoleVariant {
    /// The CPU silicon in this console.
    #[must_use]
    pub const fn cpu_variant(self) -> CpuVariant {
        match self {
            Self::NtscFrontLoader => CpuVariant::Rp2a03g,
            Self::NtscTopLoader | Self::FamicomAv => CpuVariant::Rp2a03h,
            Self::Famicom => CpuVariant::Rp2a03e,
            Self::Pal => CpuVariant::Rp2a07,
        }
    }

    /// The PPU silicon in this console.
    #[must_use]
    pub const fn ppu_variant(self) -> PpuVariant {
        match self {
            Self::Pal => PpuVariant::Rp2c07,
            _ => PpuVariant::Rp2c02g,
        }
    }

    /// APU frame-counter period in master-clock dots (~240 Hz steps).
    #[must_use]
    pub const fn apu_frame_period_dots(self) -> u32 {
        match self {
            // 7457.5 CPU cycles, rounded to whole dots.
            Self::Pal => 24_939,
            _ => 22_371,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_mapping() {
        assert_eq!(
            ConsoleVariant::NtscFrontLoader.cpu_variant(),
            CpuVariant::Rp2a03g
        );
        assert_eq!(ConsoleVariant::Pal.cpu_variant(), CpuVariant::Rp2a07);
        assert_eq!(ConsoleVariant::Pal.ppu_variant(), PpuVariant::Rp2c07);
        assert_eq!(
            ConsoleVariant::Famicom.ppu_variant(),
            PpuVariant::Rp2c02g
        );
    }
}
