//! The PPU core: dot-stepped scanline engine and CPU-visible registers.
//!
//! [`Ppu::tick`] advances one dot at the position handed down by the master
//! clock. Register accesses arrive through [`Ppu::reg_read`] /
//! [`Ppu::reg_write`] with the system's open-bus latch passed in; pattern
//! table traffic and A12 address strobes go out through [`ChrBus`].
//!
//! Edge bookkeeping (VBlank set/clear, frame completion) is reported back
//! to the integration layer through [`PpuEvents`] so the interaction
//! ledger can be stamped at well-defined call sites.

use crate::background::Background;
use crate::mask_delay::MaskDelay;
use crate::oam::{Oam, SecondaryOam, SpriteEvaluator};
use crate::palette::{color_rgba, PaletteRam};
use crate::registers::{PpuCtrl, PpuMask, PpuStatus};
use crate::scroll::Scroll;
use crate::sprites::SpriteUnits;
use crate::variant::PpuVariant;
use crate::vram::{ciram_index, Mirroring};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Frame width in pixels.
pub const FRAME_WIDTH: usize = 256;
/// Frame height in pixels.
pub const FRAME_HEIGHT: usize = 240;
/// Frame buffer size in bytes (RGBA8).
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT * 4;

/// Scanline where the VBlank flag is raised (dot 1).
const VBLANK_SCANLINE: u16 = 241;

/// Pattern-table access from the PPU pipeline.
///
/// The integration layer implements this on top of the mapper; every call
/// carries the fetched address so mappers that watch PPU A12 (MMC3-style
/// scanline counters) see the same edges the pipeline produces.
pub trait ChrBus {
    /// Read a pattern table byte ($0000-$1FFF).
    fn pattern_read(&mut self, addr: u16) -> u8;
    /// Write a pattern table byte (CHR RAM).
    fn pattern_write(&mut self, addr: u16, value: u8);
    /// Address strobe for fetches the PPU serves internally (nametable and
    /// attribute reads).
    fn address_strobe(&mut self, addr: u16) {
        let _ = addr;
    }
}

/// Edges produced by a tick or register access, drained by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PpuEvents {
    /// VBlank period began this dot (scanline 241, dot 1).
    pub vblank_set: bool,
    /// VBlank period ended this dot (pre-render, dot 1).
    pub vblank_cleared: bool,
}

/// RP2C02/RP2C07 PPU core.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ppu {
    ctrl: PpuCtrl,
    /// Live mask; pixel visibility uses the delayed copy.
    mask: PpuMask,
    status: PpuStatus,
    mask_delay: MaskDelay,
    scroll: Scroll,

    #[cfg_attr(feature = "serde", serde(with = "crate::serde_bytes_array"))]
    ciram: [u8; 2048],
    mirroring: Mirroring,
    palette: PaletteRam,
    oam: Oam,
    secondary: SecondaryOam,
    evaluator: SpriteEvaluator,
    sprites: SpriteUnits,
    background: Background,

    read_buffer: u8,
    sprite_fetch_lo: u8,

    scanline: u16,
    dot: u16,
    prerender_line: u16,

    nmi_suppressed: bool,
    events: PpuEvents,

    #[cfg_attr(feature = "serde", serde(skip, default = "blank_frame"))]
    frame: Vec<u8>,
}

#[cfg(feature = "serde")]
fn blank_frame() -> Vec<u8> {
    vec![0; FRAME_BYTES]
}

impl Ppu {
    /// Create a PPU for the given chip variant and initial mirroring.
    #[must_use]
    pub fn new(variant: PpuVariant, mirroring: Mirroring) -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            mask_delay: MaskDelay::new(PpuMask::empty()),
            scroll: Scroll::new(),
            ciram: [0; 2048],
            mirroring,
            palette: PaletteRam::new(),
            oam: Oam::new(),
            secondary: SecondaryOam::new(),
            evaluator: SpriteEvaluator::default(),
            sprites: SpriteUnits::default(),
            background: Background::new(),
            read_buffer: 0,
            sprite_fetch_lo: 0,
            scanline: 0,
            dot: 0,
            prerender_line: variant.scanlines_per_frame() - 1,
            nmi_suppressed: false,
            events: PpuEvents::default(),
            frame: vec![0; FRAME_BYTES],
        }
    }

    /// Reset to the power-on state, keeping memories (hardware leaves VRAM
    /// and OAM alone on reset).
    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.status = PpuStatus::empty();
        self.mask_delay.fill(PpuMask::empty());
        self.scroll = Scroll::new();
        self.read_buffer = 0;
        self.nmi_suppressed = false;
        self.events = PpuEvents::default();
        self.background.clear();
    }

    /// Update nametable mirroring (mapper-controlled).
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    /// Live-mask rendering enable, as the master clock needs it for the
    /// odd-frame skip decision.
    #[inline]
    #[must_use]
    pub fn rendering_enabled(&self) -> bool {
        self.mask.rendering_enabled()
    }

    /// NMI output line: VBlank flag AND the control enable, minus the
    /// $2002 race suppression. The CPU edge-detects this level.
    #[inline]
    #[must_use]
    pub fn nmi_line(&self) -> bool {
        self.status.in_vblank() && self.ctrl.nmi_enabled() && !self.nmi_suppressed
    }

    /// Completed frame pixels, 256x240 RGBA8.
    #[inline]
    #[must_use]
    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame
    }

    /// Drain edge events accumulated since the last call.
    pub fn take_events(&mut self) -> PpuEvents {
        std::mem::take(&mut self.events)
    }

    /// Status flags (debug inspection).
    #[must_use]
    pub fn status(&self) -> PpuStatus {
        self.status
    }

    /// Scroll registers (debug inspection).
    #[must_use]
    pub fn scroll(&self) -> Scroll {
        self.scroll
    }

    /// Current OAMADDR (the DMA arbiter snapshots this at pause points).
    #[must_use]
    pub fn oam_addr(&self) -> u8 {
        self.oam.addr()
    }

    /// Sprite-DMA write path: identical to a $2004 write.
    pub fn oam_dma_write(&mut self, value: u8) {
        self.oam.write(value);
    }

    // -----------------------------------------------------------------
    // Dot engine
    // -----------------------------------------------------------------

    /// Advance one dot at the given position. `skip_slot` marks the
    /// odd-frame idle slot: only frame bookkeeping happens there.
    pub fn tick(&mut self, scanline: u16, dot: u16, skip_slot: bool, chr: &mut impl ChrBus) {
        self.scanline = scanline;
        self.dot = dot;
        if skip_slot {
            return;
        }

        self.mask_delay.push(self.mask);

        let visible = scanline < FRAME_HEIGHT as u16;
        let prerender = scanline == self.prerender_line;
        let rendering = self.mask.rendering_enabled();

        // Pixel output happens on every visible dot; with rendering
        // disabled it is the backdrop colour.
        if visible && (1..=256).contains(&dot) {
            self.render_pixel(usize::from(dot - 1), usize::from(scanline));
        }

        if rendering && (visible || prerender) {
            self.pipeline_dot(scanline, dot, visible, prerender, chr);
        }

        if scanline == VBLANK_SCANLINE && dot == 1 {
            self.status.insert(PpuStatus::VBLANK);
            self.events.vblank_set = true;
        }
        if prerender && dot == 1 {
            self.status.remove(
                PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
            );
            self.nmi_suppressed = false;
            self.events.vblank_cleared = true;
        }
    }

    /// All rendering-enabled work for one dot.
    #[allow(clippy::too_many_lines)]
    fn pipeline_dot(
        &mut self,
        scanline: u16,
        dot: u16,
        visible: bool,
        prerender: bool,
        chr: &mut impl ChrBus,
    ) {
        // Background fetch groups: dots 1-256 and the 321-336 prefetch.
        let in_fetch = (1..=256).contains(&dot) || (321..=336).contains(&dot);

        // Shifted tiles load into the low halves on dots 8n+1.
        if dot % 8 == 1 && (dot > 1 && dot <= 257 || dot == 329 || dot == 337) {
            self.background.reload();
        }

        if in_fetch {
            match dot % 8 {
                1 => {
                    let addr = self.scroll.nametable_addr();
                    chr.address_strobe(addr);
                    let tile = self.ciram[ciram_index(self.mirroring, addr)];
                    self.background.set_tile(tile);
                }
                3 => {
                    let addr = self.scroll.attribute_addr();
                    chr.address_strobe(addr);
                    let attr = self.ciram[ciram_index(self.mirroring, addr)];
                    self.background
                        .set_attribute(attr, self.scroll.coarse_x(), self.scroll.coarse_y());
                }
                5 => {
                    let addr = self.bg_pattern_addr();
                    self.background.set_pattern_lo(chr.pattern_read(addr));
                }
                7 => {
                    let addr = self.bg_pattern_addr() + 8;
                    self.background.set_pattern_hi(chr.pattern_read(addr));
                }
                0 => self.scroll.increment_x(),
                _ => {}
            }
            self.background.shift();
        }

        if dot == 256 {
            self.scroll.increment_y();
        }
        if dot == 257 {
            self.scroll.copy_horizontal();
            // OAMADDR is forced to zero during sprite fetches.
            self.oam.set_addr(0);
        }
        if prerender && (280..=304).contains(&dot) {
            self.scroll.copy_vertical();
        }

        // Two dummy nametable fetches close the scanline.
        if dot == 337 || dot == 339 {
            let addr = self.scroll.nametable_addr();
            chr.address_strobe(addr);
            let _ = self.ciram[ciram_index(self.mirroring, addr)];
        }

        // Sprite evaluation for the next scanline (visible lines only).
        if visible {
            match dot {
                1..=64 => {
                    if dot % 2 == 0 {
                        self.secondary.clear_byte(usize::from(dot / 2 - 1));
                    }
                    if dot == 64 {
                        self.secondary.begin_evaluation();
                        self.evaluator.begin();
                    }
                }
                65..=256 => {
                    if (dot - 65) % 3 == 0 {
                        let overflow = self.evaluator.step(
                            self.oam.bytes(),
                            scanline,
                            self.ctrl.sprite_height(),
                            &mut self.secondary,
                        );
                        if overflow {
                            self.status.insert(PpuStatus::SPRITE_OVERFLOW);
                        }
                    }
                }
                _ => {}
            }
        }
        if prerender && (1..=64).contains(&dot) && dot % 2 == 0 {
            // Pre-render also scrubs the scratch so scanline 0 starts empty.
            self.secondary.clear_byte(usize::from(dot / 2 - 1));
            if dot == 64 {
                self.secondary.begin_evaluation();
            }
        }

        // Sprite pattern fetches for the next scanline.
        if (257..=320).contains(&dot) {
            self.sprite_fetch_dot(scanline, dot, chr);
        }

        // Sprite counters advance after the pixel for this dot was read.
        if visible && (1..=256).contains(&dot) {
            self.sprites.tick();
        }
    }

    /// Background pattern address from the latched tile, table select and
    /// fine Y.
    fn bg_pattern_addr(&self) -> u16 {
        self.ctrl.bg_table_addr()
            + u16::from(self.background.tile()) * 16
            + u16::from(self.scroll.fine_y())
    }

    /// One dot of the 257-320 sprite fetch window (8 dots per slot).
    fn sprite_fetch_dot(&mut self, scanline: u16, dot: u16, chr: &mut impl ChrBus) {
        let offset = dot - 257;
        let slot = usize::from(offset / 8);
        let step = offset % 8;

        if dot == 257 {
            self.sprites
                .begin_line(self.secondary.count(), self.secondary.sprite_zero_included());
        }

        match step {
            // Garbage nametable/attribute strobes; MMC3-style counters
            // depend on seeing them.
            0 => chr.address_strobe(self.scroll.nametable_addr()),
            2 => chr.address_strobe(self.scroll.attribute_addr()),
            4 => {
                let addr = self.sprite_pattern_addr(slot, scanline);
                self.sprite_fetch_lo = chr.pattern_read(addr);
            }
            6 => {
                let addr = self.sprite_pattern_addr(slot, scanline) + 8;
                let hi = chr.pattern_read(addr);
                if let Some(entry) = self.secondary.sprite(slot) {
                    let mut lo = self.sprite_fetch_lo;
                    let mut hi = hi;
                    if entry.attr & 0x40 != 0 {
                        lo = lo.reverse_bits();
                        hi = hi.reverse_bits();
                    }
                    self.sprites.load(slot, lo, hi, entry.attr, entry.x);
                }
            }
            _ => {}
        }
    }

    /// Pattern low-plane address for a sprite slot's row on the next
    /// scanline. Empty slots fetch the all-ones tile like hardware does.
    fn sprite_pattern_addr(&self, slot: usize, scanline: u16) -> u16 {
        let height = self.ctrl.sprite_height();
        let Some(entry) = self.secondary.sprite(slot) else {
            return if height == 16 {
                0x1FF0
            } else {
                self.ctrl.sprite_table_addr() | 0x0FF0
            };
        };

        let mut row = (scanline - u16::from(entry.y)).min(height - 1);
        if entry.attr & 0x80 != 0 {
            row = height - 1 - row;
        }
        if height == 16 {
            let table = u16::from(entry.tile & 0x01) * 0x1000;
            let mut tile = u16::from(entry.tile & 0xFE);
            if row >= 8 {
                tile += 1;
                row -= 8;
            }
            table + tile * 16 + row
        } else {
            self.ctrl.sprite_table_addr() + u16::from(entry.tile) * 16 + row
        }
    }

    /// Produce the pixel for (x, y) using the effective (3-dot-delayed)
    /// mask.
    fn render_pixel(&mut self, x: usize, y: usize) {
        let eff = self.mask_delay.effective();

        let (bg_pattern, bg_palette) = if eff.show_background() && (x >= 8 || eff.show_bg_left()) {
            self.background.pixel(self.scroll.fine_x())
        } else {
            (0, 0)
        };

        let sprite = if eff.show_sprites() && (x >= 8 || eff.show_sprites_left()) {
            self.sprites.pixel()
        } else {
            None
        };

        // Sprite-0 hit: both pipes enabled and opaque, x in 1..=254.
        if let Some(sp) = sprite {
            if sp.sprite_zero
                && bg_pattern != 0
                && eff.show_background()
                && eff.show_sprites()
                && (1..255).contains(&x)
            {
                self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
            }
        }

        let palette_addr = match (bg_pattern, sprite) {
            (0, None) => 0,
            (0, Some(sp)) => ((4 + u16::from(sp.palette)) << 2) | u16::from(sp.pattern),
            (_, None) => (u16::from(bg_palette) << 2) | u16::from(bg_pattern),
            (_, Some(sp)) => {
                if sp.behind_background {
                    (u16::from(bg_palette) << 2) | u16::from(bg_pattern)
                } else {
                    ((4 + u16::from(sp.palette)) << 2) | u16::from(sp.pattern)
                }
            }
        };

        let value = self.palette.read(palette_addr);
        let rgba = color_rgba(value, eff);
        let offset = (y * FRAME_WIDTH + x) * 4;
        self.frame[offset..offset + 4].copy_from_slice(&rgba);
    }

    // -----------------------------------------------------------------
    // Register interface
    // -----------------------------------------------------------------

    /// True while secondary OAM is being cleared; $2004 reads see $FF.
    fn oam_clear_window(&self) -> bool {
        let on_line = self.scanline < FRAME_HEIGHT as u16 || self.scanline == self.prerender_line;
        on_line && self.mask.rendering_enabled() && (1..=64).contains(&self.dot)
    }

    /// Service a CPU read of register `reg` (address & 7). `open_bus` is
    /// the system latch; write-only registers return it unchanged.
    pub fn reg_read(&mut self, reg: u8, open_bus: u8, chr: &mut impl ChrBus) -> u8 {
        match reg & 7 {
            // PPUSTATUS
            2 => {
                let mut value = (self.status.bits() & 0xE0) | (open_bus & 0x1F);
                // Reading on the exact dot VBlank is raised returns it
                // clear and kills this frame's NMI.
                if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
                    value &= !PpuStatus::VBLANK.bits();
                    self.nmi_suppressed = true;
                }
                self.status.remove(PpuStatus::VBLANK);
                self.scroll.clear_toggle();
                value
            }
            // OAMDATA
            4 => {
                if self.oam_clear_window() {
                    0xFF
                } else {
                    self.oam.read()
                }
            }
            // PPUDATA
            7 => {
                let addr = self.scroll.addr() & 0x3FFF;
                let value = if addr >= 0x3F00 {
                    // Palette reads bypass the buffer; the buffer still
                    // refills from the nametable underneath.
                    let mirror = ciram_index(self.mirroring, addr - 0x1000);
                    self.read_buffer = self.ciram[mirror];
                    (self.palette.read(addr) & 0x3F) | (open_bus & 0xC0)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = if addr < 0x2000 {
                        chr.pattern_read(addr)
                    } else {
                        chr.address_strobe(addr);
                        self.ciram[ciram_index(self.mirroring, addr)]
                    };
                    buffered
                };
                self.scroll.increment_addr(self.ctrl.vram_increment());
                value
            }
            // Write-only registers float.
            _ => open_bus,
        }
    }

    /// Service a CPU write of register `reg` (address & 7).
    pub fn reg_write(&mut self, reg: u8, value: u8, chr: &mut impl ChrBus) {
        match reg & 7 {
            // PPUCTRL: the NMI line recomputes from the new enable bit, so
            // a 0->1 flip during VBlank surfaces as an immediate edge.
            0 => {
                self.ctrl = PpuCtrl::from_bits_truncate(value);
                self.scroll.write_ctrl(value);
            }
            // PPUMASK: live immediately, visible three dots later.
            1 => self.mask = PpuMask::from_bits_truncate(value),
            // PPUSTATUS is read-only.
            2 => {}
            // OAMADDR
            3 => self.oam.set_addr(value),
            // OAMDATA: writes during rendering glitch the address instead
            // of storing.
            4 => {
                let rendering_line = self.scanline < FRAME_HEIGHT as u16
                    || self.scanline == self.prerender_line;
                if self.mask.rendering_enabled() && rendering_line {
                    log::debug!(
                        "OAMDATA write during rendering at ({}, {}); OAMADDR bumped",
                        self.scanline,
                        self.dot
                    );
                    self.oam.bump_addr_glitch();
                } else {
                    self.oam.write(value);
                }
            }
            // PPUSCROLL
            5 => self.scroll.write_scroll(value),
            // PPUADDR
            6 => self.scroll.write_addr(value),
            // PPUDATA
            7 => {
                let addr = self.scroll.addr() & 0x3FFF;
                if addr < 0x2000 {
                    chr.pattern_write(addr, value);
                } else if addr < 0x3F00 {
                    chr.address_strobe(addr);
                    self.ciram[ciram_index(self.mirroring, addr)] = value;
                } else {
                    self.palette.write(addr, value);
                }
                self.scroll.increment_addr(self.ctrl.vram_increment());
            }
            _ => {}
        }
    }

    /// Side-effect-free register peek for the debug surface.
    #[must_use]
    pub fn peek_reg(&self, reg: u8, open_bus: u8) -> u8 {
        match reg & 7 {
            2 => (self.status.bits() & 0xE0) | (open_bus & 0x1F),
            4 => self.oam.read(),
            7 => {
                let addr = self.scroll.addr() & 0x3FFF;
                if addr >= 0x3F00 {
                    self.palette.read(addr)
                } else {
                    self.read_buffer
                }
            }
            _ => open_bus,
        }
    }
}
