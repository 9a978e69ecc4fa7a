//! Master clock: the deterministic step generator.
//!
//! One step per master tick carries the PPU position plus the CPU and
//! APU-frame tick flags. The CPU ticks every third dot. On NTSC the
//! pre-render scanline's last dot becomes an idle "skip slot" on odd
//! frames when rendering is enabled: the step is still emitted (frame
//! bookkeeping happens there) but the global dot counter advances by two,
//! which shifts the CPU cadence exactly as the missing hardware dot does.

use crate::variant::ConsoleVariant;
use famicore_ppu::PpuVariant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dots per scanline, all variants.
pub const DOTS_PER_SCANLINE: u16 = 341;

/// One master-clock step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// PPU scanline.
    pub scanline: u16,
    /// PPU dot within the scanline.
    pub dot: u16,
    /// The CPU (or DMA) runs one cycle on this step.
    pub cpu_tick: bool,
    /// The APU frame counter ticks on this step.
    pub apu_tick: bool,
    /// Odd-frame idle slot: PPU work is suppressed.
    pub skip_slot: bool,
    /// Last slot of the frame; the frame buffer is complete.
    pub frame_complete: bool,
    /// Monotone master-clock timestamp (dot count).
    pub cycle: u64,
}

/// The step generator.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MasterClock {
    scanline: u16,
    dot: u16,
    frame: u64,
    cycle: u64,
    scanlines_per_frame: u16,
    odd_frame_skip: bool,
    apu_period: u32,
    apu_counter: u32,
}

impl MasterClock {
    /// Clock for the given console variant.
    #[must_use]
    pub fn new(variant: ConsoleVariant) -> Self {
        let ppu: PpuVariant = variant.ppu_variant();
        Self {
            scanline: 0,
            dot: 0,
            frame: 0,
            cycle: 0,
            scanlines_per_frame: ppu.scanlines_per_frame(),
            odd_frame_skip: ppu.has_odd_frame_skip(),
            apu_period: variant.apu_frame_period_dots(),
            apu_counter: 0,
        }
    }

    /// Frames completed so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Scanlines per frame for the selected variant.
    #[must_use]
    pub const fn scanlines_per_frame(&self) -> u16 {
        self.scanlines_per_frame
    }

    /// Master timestamp of the next step.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.cycle
    }

    /// Current position (next step's scanline and dot).
    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.scanline, self.dot)
    }

    /// Reset to frame 0, dot 0.
    pub fn reset(&mut self) {
        self.scanline = 0;
        self.dot = 0;
        self.frame = 0;
        self.cycle = 0;
        self.apu_counter = 0;
    }

    /// Produce the next step and advance. `rendering_enabled` is the
    /// PPU's live mask state, consulted for the odd-frame skip.
    pub fn advance(&mut self, rendering_enabled: bool) -> Step {
        let last_dot =
            self.scanline == self.scanlines_per_frame - 1 && self.dot == DOTS_PER_SCANLINE - 1;
        let skip_slot = self.odd_frame_skip
            && rendering_enabled
            && self.frame & 1 == 1
            && last_dot;

        self.apu_counter += 1;
        let apu_tick = self.apu_counter >= self.apu_period;
        if apu_tick {
            self.apu_counter = 0;
        }

        let step = Step {
            scanline: self.scanline,
            dot: self.dot,
            cpu_tick: self.cycle % 3 == 0,
            apu_tick,
            skip_slot,
            frame_complete: last_dot,
            cycle: self.cycle,
        };

        // The skip slot swallows one extra dot of master time.
        self.cycle += if skip_slot { 2 } else { 1 };
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= self.scanlines_per_frame {
                self.scanline = 0;
                self.frame += 1;
            }
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NTSC_DOTS: u64 = 341 * 262;

    fn ntsc() -> MasterClock {
        MasterClock::new(ConsoleVariant::NtscFrontLoader)
    }

    #[test]
    fn cpu_ticks_every_third_dot() {
        let mut clock = ntsc();
        let mut cpu_ticks = 0u64;
        for _ in 0..300 {
            if clock.advance(false).cpu_tick {
                cpu_ticks += 1;
            }
        }
        assert_eq!(cpu_ticks, 100);
    }

    #[test]
    fn frame_has_expected_steps() {
        let mut clock = ntsc();
        let mut steps = 0u64;
        loop {
            let step = clock.advance(false);
            steps += 1;
            if step.frame_complete {
                break;
            }
        }
        assert_eq!(steps, NTSC_DOTS);
    }

    #[test]
    fn odd_frame_skip_marks_last_slot_and_shifts_cadence() {
        let mut clock = ntsc();

        // Frame 0 (even): no skip even with rendering on.
        let mut skip_seen = false;
        loop {
            let step = clock.advance(true);
            skip_seen |= step.skip_slot;
            if step.frame_complete {
                break;
            }
        }
        assert!(!skip_seen);
        let stamp_after_even = clock.timestamp();
        assert_eq!(stamp_after_even, NTSC_DOTS);

        // Frame 1 (odd): the last slot is the skip slot and the master
        // counter swallows an extra dot.
        let mut worked_dots = 0u64;
        loop {
            let step = clock.advance(true);
            if !step.skip_slot {
                worked_dots += 1;
            }
            if step.frame_complete {
                assert!(step.skip_slot);
                break;
            }
        }
        assert_eq!(worked_dots, NTSC_DOTS - 1);
        assert_eq!(clock.timestamp(), stamp_after_even + NTSC_DOTS + 1);
    }

    #[test]
    fn no_skip_when_rendering_disabled() {
        let mut clock = ntsc();
        // Run through frame 0 and into frame 1 with rendering off.
        for _ in 0..NTSC_DOTS * 2 {
            let step = clock.advance(false);
            assert!(!step.skip_slot);
        }
    }

    #[test]
    fn pal_scanline_count() {
        let mut clock = MasterClock::new(ConsoleVariant::Pal);
        let mut steps = 0u64;
        loop {
            let step = clock.advance(false);
            steps += 1;
            if step.frame_complete {
                break;
            }
        }
        assert_eq!(steps, 341 * 312);
    }

    proptest::proptest! {
        // Master timestamps are strictly monotone no matter how the
        // rendering enable toggles around the skip slot.
        #[test]
        fn timestamps_strictly_increase(
            flags in proptest::collection::vec(proptest::bool::ANY, 1..2000)
        ) {
            let mut clock = MasterClock::new(ConsoleVariant::NtscFrontLoader);
            let mut last: Option<u64> = None;
            for rendering in flags {
                let step = clock.advance(rendering);
                if let Some(previous) = last {
                    proptest::prop_assert!(step.cycle > previous);
                }
                last = Some(step.cycle);
            }
        }
    }

    #[test]
    fn apu_tick_cadence() {
        let mut clock = ntsc();
        let period = ConsoleVariant::NtscFrontLoader.apu_frame_period_dots() as u64;
        let mut first = None;
        let mut second = None;
        for i in 0..period * 2 + 10 {
            if clock.advance(false).apu_tick {
                if first.is_none() {
                    first = Some(i);
                } else if second.is_none() {
                    second = Some(i);
                }
            }
        }
        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(second - first, period);
    }
}
