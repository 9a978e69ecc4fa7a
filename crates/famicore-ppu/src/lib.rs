//! Dot-stepped RP2C02/RP2C07 PPU core for the famicore emulator.
//!
//! One call to [`Ppu::tick`] advances exactly one dot at the position the
//! master clock dictates. The crate owns everything behind the PPU's own
//! address space: nametable RAM with mapper-selected mirroring, palette
//! RAM with its $3F1x aliases, primary and secondary OAM, the rendering
//! shifters, the four-slot PPUMASK delay ring, and the RGBA frame buffer.
//! Pattern-table fetches and A12 address strobes leave through the
//! [`ChrBus`] trait; CPU register traffic enters through
//! [`Ppu::reg_read`] / [`Ppu::reg_write`] with the system open-bus latch
//! supplied by the caller.

#![warn(missing_docs)]

mod background;
mod mask_delay;
mod oam;
mod palette;
mod ppu;
mod registers;
mod scroll;
mod sprites;
mod variant;
mod vram;

pub use mask_delay::MaskDelay;
pub use oam::{Oam, SecondaryOam, SpriteEntry, SpriteEvaluator};
pub use palette::{color_rgba, PaletteRam, SYSTEM_PALETTE};
pub use ppu::{ChrBus, Ppu, PpuEvents, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use scroll::Scroll;
pub use sprites::{SpritePixel, SpriteUnits};
pub use variant::PpuVariant;
pub use vram::{ciram_index, Mirroring};

/// Serde helpers for fixed-size byte arrays beyond serde's built-in
/// sizes.
#[cfg(feature = "serde")]
pub(crate) mod serde_bytes_array {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        data: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        data.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("wrong array length"))
    }
}
