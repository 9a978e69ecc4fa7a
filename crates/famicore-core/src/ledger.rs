//! Interaction ledger: monotone edge timestamps shared between the
//! PPU-side producers and the CPU/DMA-side consumers.
//!
//! An event is "active" when its most recent on-timestamp exceeds its
//! most recent off-timestamp; the comparison happens at well-defined call
//! sites only, never mid micro-step. Timestamps are master-clock dot
//! counts. The ledger has no mutation methods beyond `reset_all`; the
//! owning bus stamps fields directly at the edges.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sprite-DMA state captured when a sample-DMA pause lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PauseSnapshot {
    /// Source offset the sprite-DMA was working on.
    pub offset: u8,
    /// OAMADDR at the pause point.
    pub oam_addr: u8,
    /// The byte in flight (captured by performing the read when the pause
    /// hit the read phase).
    pub byte: u8,
    /// True when the pause interrupted the read phase.
    pub was_reading: bool,
}

/// Edge-timestamp record.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InteractionLedger {
    /// VBlank period began (scanline 241, dot 1).
    pub vblank_set_at: u64,
    /// VBlank period ended (pre-render, dot 1).
    pub vblank_cleared_at: u64,
    /// Sample-DMA asserted RDY-low.
    pub dmc_active_at: u64,
    /// Sample-DMA released RDY.
    pub dmc_inactive_at: u64,
    /// Sprite-DMA was paused by a sample-DMA.
    pub sprite_dma_paused_at: u64,
    /// Sprite-DMA took its first cycle after a pause.
    pub sprite_dma_resumed_at: u64,
    /// State captured at the most recent pause.
    pub pause_snapshot: PauseSnapshot,
    /// A pause landed in the sprite-DMA's read phase; the duplicated byte
    /// protocol is in effect until the transfer finishes.
    pub duplication_occurred: bool,
}

/// The uniform edge rule: on after off.
#[inline]
#[must_use]
pub const fn edge_active(on: u64, off: u64) -> bool {
    on > off
}

impl InteractionLedger {
    /// All-zero ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every timestamp and flag.
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// VBlank period in progress.
    #[inline]
    #[must_use]
    pub const fn vblank_active(&self) -> bool {
        edge_active(self.vblank_set_at, self.vblank_cleared_at)
    }

    /// Sample-DMA holding RDY low.
    #[inline]
    #[must_use]
    pub const fn dmc_active(&self) -> bool {
        edge_active(self.dmc_active_at, self.dmc_inactive_at)
    }

    /// Sprite-DMA currently paused.
    #[inline]
    #[must_use]
    pub const fn sprite_dma_paused(&self) -> bool {
        edge_active(self.sprite_dma_paused_at, self.sprite_dma_resumed_at)
    }
}
