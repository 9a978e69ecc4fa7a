//! CPU chip variants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which CPU silicon is being emulated. The variant selects the clock
/// rate and whether the NMOS DMC-steal repeat-read quirk applies; the
/// instruction sequencer is identical across revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CpuVariant {
    /// Early NTSC front-loader silicon.
    Rp2a03e,
    /// The common NTSC revision.
    #[default]
    Rp2a03g,
    /// Late NTSC revision (top-loader, AV Famicom).
    Rp2a03h,
    /// PAL CPU.
    Rp2a07,
}

impl CpuVariant {
    /// CPU clock rate in Hz.
    #[must_use]
    pub const fn clock_hz(self) -> u32 {
        match self {
            Self::Rp2a03e | Self::Rp2a03g | Self::Rp2a03h => 1_789_773,
            Self::Rp2a07 => 1_662_607,
        }
    }

    /// True when DMC stalls repeat the last bus read on idle cycles (the
    /// NMOS revisions).
    #[must_use]
    pub const fn has_dmc_repeat_read(self) -> bool {
        !matches!(self, Self::Rp2a07)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_rates() {
        assert_eq!(CpuVariant::Rp2a03g.clock_hz(), 1_789_773);
        assert_eq!(CpuVariant::Rp2a07.clock_hz(), 1_662_607);
    }

    #[test]
    fn dmc_quirk_is_nmos_only() {
        assert!(CpuVariant::Rp2a03e.has_dmc_repeat_read());
        assert!(CpuVariant::Rp2a03g.has_dmc_repeat_read());
        assert!(CpuVariant::Rp2a03h.has_dmc_repeat_read());
        assert!(!CpuVariant::Rp2a07.has_dmc_repeat_read());
    }
}
