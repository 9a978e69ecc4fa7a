//! DMA arbiter: sprite-DMA and sample-DMA with preemption.
//!
//! The sample-DMA (DMC fetch) outranks the sprite-DMA ($4014 OAM copy).
//! While RDY is low the sprite machine holds still; a pause that lands in
//! its read phase captures the in-flight byte, and on resume that byte is
//! written twice (the hardware duplication artifact). To keep the OAM
//! write count at exactly 256, the transfer's final pair collapses into a
//! single idle slot per duplication, the same idiom the master clock uses
//! for the odd-frame dot skip.
//!
//! Cycle accounting: 513 or 514 cycles per undisturbed transfer
//! (alignment by CPU-cycle parity), plus exactly 4 per preemption.

use crate::bus::Bus;
use crate::ledger::PauseSnapshot;
use famicore_cpu::Bus as _;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Total transfer cycles for the 256 read/write pairs.
const TRANSFER_CYCLES: u16 = 512;

#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct SpriteDma {
    active: bool,
    page: u8,
    align_remaining: u8,
    /// Effective transfer cycle, 0..512. Even cycles read, odd write.
    cycle: u16,
    latch: u8,
    /// Read-phase pauses survived this transfer.
    dup_count: u8,
    /// The captured byte must be written before the pair replays.
    resume_write_pending: bool,
    /// Stamp the resume timestamp on the next sprite cycle.
    resume_stamp_pending: bool,
}

impl SpriteDma {
    fn source_addr(&self, offset: u16) -> u16 {
        u16::from(self.page) << 8 | offset
    }

    /// First cycle of the end-of-transfer skip region.
    fn skip_threshold(&self) -> u16 {
        TRANSFER_CYCLES - 2 * u16::from(self.dup_count)
    }

    /// In the transfer proper, about to perform a source read.
    fn in_read_phase(&self) -> bool {
        self.active
            && self.align_remaining == 0
            && !self.resume_write_pending
            && self.cycle % 2 == 0
            && (self.dup_count == 0 || self.cycle < self.skip_threshold())
    }
}

#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct SampleDma {
    active: bool,
    address: u16,
    stall_remaining: u8,
}

/// The arbiter over both cycle-stealing engines.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DmaArbiter {
    sprite: SpriteDma,
    sample: SampleDma,
}

impl DmaArbiter {
    /// Either engine holding the CPU.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.sprite.active || self.sample.active
    }

    /// $4014 write: queue a 256-byte OAM transfer from `page << 8`. The
    /// CPU-cycle parity at the trigger decides the alignment cycle count.
    pub fn start_sprite(&mut self, page: u8, cpu_cycle: u64) {
        self.sprite = SpriteDma {
            active: true,
            page,
            align_remaining: 1 + (cpu_cycle & 1) as u8,
            cycle: 0,
            latch: 0,
            dup_count: 0,
            resume_write_pending: false,
            resume_stamp_pending: false,
        };
        log::debug!("sprite DMA started from page ${page:02X}");
    }

    /// One CPU-slot cycle. Returns true when the CPU is frozen (any DMA
    /// work happened), false when the CPU may execute its micro-step.
    pub fn step_cycle(&mut self, bus: &mut Bus, now: u64) -> bool {
        // Sample-DMA outranks everything. Poll the APU when idle; the
        // request cycle is the first stall cycle.
        if self.sample.active {
            self.sample_cycle(bus, now, false);
            return true;
        }
        if let Some(request) = bus.poll_dmc_request() {
            self.sample.active = true;
            self.sample.address = request.address;
            self.sample.stall_remaining = request.stall.max(1);
            bus.ledger.dmc_active_at = now;
            log::debug!("sample DMA asserted for ${:04X}", request.address);

            let captured = if self.sprite.active {
                self.pause_sprite(bus, now)
            } else {
                false
            };
            self.sample_cycle(bus, now, captured);
            return true;
        }

        self.sprite_cycle(bus, now)
    }

    /// One RDY-low cycle: idle (with the NMOS repeat read) until the
    /// final cycle fetches the sample byte.
    fn sample_cycle(&mut self, bus: &mut Bus, now: u64, bus_used: bool) {
        self.sample.stall_remaining -= 1;
        if self.sample.stall_remaining == 0 {
            let value = bus.read(self.sample.address);
            bus.deliver_dmc(value);
            self.sample.active = false;
            bus.ledger.dmc_inactive_at = now;
            log::debug!("sample DMA delivered ${value:02X}");
        } else if !bus_used && bus.dmc_repeat_read() {
            // NMOS CPUs keep re-reading the last address while stalled.
            let addr = bus.last_read_addr();
            let _ = bus.read(addr);
        }
    }

    /// Pause bookkeeping at the edge where RDY drops. A pause in the read
    /// phase performs the read that would have occurred and arms the
    /// duplication protocol. Returns true when that capture read used the
    /// bus.
    fn pause_sprite(&mut self, bus: &mut Bus, now: u64) -> bool {
        bus.ledger.sprite_dma_paused_at = now;
        self.sprite.resume_stamp_pending = true;

        if self.sprite.in_read_phase() {
            let offset = self.sprite.cycle / 2;
            let value = bus.read(self.sprite.source_addr(offset));
            bus.ledger.pause_snapshot = PauseSnapshot {
                offset: offset as u8,
                oam_addr: bus.ppu.oam_addr(),
                byte: value,
                was_reading: true,
            };
            bus.ledger.duplication_occurred = true;
            self.sprite.latch = value;
            self.sprite.cycle += 1;
            self.sprite.resume_write_pending = true;
            self.sprite.dup_count += 1;
            log::debug!(
                "sprite DMA paused in read phase at offset {offset}; byte will duplicate"
            );
            true
        } else {
            bus.ledger.pause_snapshot = PauseSnapshot {
                offset: (self.sprite.cycle / 2).min(255) as u8,
                oam_addr: bus.ppu.oam_addr(),
                byte: self.sprite.latch,
                was_reading: false,
            };
            false
        }
    }

    /// One sprite-DMA cycle.
    fn sprite_cycle(&mut self, bus: &mut Bus, now: u64) -> bool {
        if !self.sprite.active {
            return false;
        }
        if self.sprite.resume_stamp_pending {
            bus.ledger.sprite_dma_resumed_at = now;
            self.sprite.resume_stamp_pending = false;
        }
        if self.sprite.align_remaining > 0 {
            self.sprite.align_remaining -= 1;
            return true;
        }
        if self.sprite.resume_write_pending {
            // The captured byte lands in OAM, then the counter rewinds so
            // the interrupted pair replays and the byte appears twice.
            bus.ppu.oam_dma_write(self.sprite.latch);
            self.sprite.resume_write_pending = false;
            self.sprite.cycle -= 1;
            return true;
        }
        if self.sprite.dup_count > 0 && self.sprite.cycle >= self.sprite.skip_threshold() {
            // Idle slot: the counter advances past a whole pair, keeping
            // the OAM write total at 256.
            self.sprite.cycle += 2;
            if self.sprite.cycle >= TRANSFER_CYCLES {
                self.finish_sprite(bus);
            }
            return true;
        }

        if self.sprite.cycle % 2 == 0 {
            let offset = self.sprite.cycle / 2;
            let addr = self.sprite.source_addr(offset);
            self.sprite.latch = bus.read(addr);
            self.sprite.cycle += 1;
        } else {
            bus.ppu.oam_dma_write(self.sprite.latch);
            self.sprite.cycle += 1;
            if self.sprite.cycle >= TRANSFER_CYCLES {
                self.finish_sprite(bus);
            }
        }
        true
    }

    fn finish_sprite(&mut self, bus: &mut Bus) {
        self.sprite.active = false;
        self.sprite.dup_count = 0;
        bus.ledger.duplication_occurred = false;
        log::debug!("sprite DMA finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::DmcRequest;
    use crate::testing::{FlatCartridge, NullApu, NullInput, ScriptedApu, SharedDmc};
    use crate::variant::ConsoleVariant;
    use famicore_cpu::Bus as _;

    fn bus_with_pattern() -> Bus {
        let mut bus = Bus::new(
            ConsoleVariant::NtscFrontLoader,
            Box::new(FlatCartridge::new()),
            Box::new(NullApu::default()),
            Box::new(NullInput),
        );
        // Source page $02: bytes 0..=255.
        for i in 0..=255u16 {
            bus.write(0x0200 + i, i as u8);
        }
        bus
    }

    fn bus_with_dmc(dmc: SharedDmc) -> Bus {
        let mut bus = Bus::new(
            ConsoleVariant::NtscFrontLoader,
            Box::new(FlatCartridge::new()),
            Box::new(ScriptedApu::new(dmc)),
            Box::new(NullInput),
        );
        for i in 0..=255u16 {
            bus.write(0x0200 + i, i as u8);
        }
        bus
    }

    fn oam_bytes(bus: &mut Bus) -> Vec<u8> {
        (0..=255u16)
            .map(|i| {
                bus.write(0x2003, i as u8);
                bus.read(0x2004)
            })
            .collect()
    }

    fn run_dma(bus: &mut Bus) -> u64 {
        let mut cycles = 0;
        while bus.dma_active() {
            let frozen = bus.dma_cycle(cycles);
            assert!(frozen);
            cycles += 1;
        }
        cycles
    }

    #[test]
    fn plain_transfer_even_start_takes_513() {
        let mut bus = bus_with_pattern();
        bus.cpu_cycle = 100; // even
        bus.write(0x4014, 0x02);

        let cycles = run_dma(&mut bus);
        assert_eq!(cycles, 513);

        let oam = oam_bytes(&mut bus);
        for (i, &byte) in oam.iter().enumerate() {
            let expected = if i % 4 == 2 { (i as u8) & 0xE3 } else { i as u8 };
            assert_eq!(byte, expected, "OAM slot {i}");
        }
        // OAMADDR wrapped back to its starting point.
        bus.write(0x2003, 0x00);
        assert!(!bus.dma_active());
    }

    #[test]
    fn plain_transfer_odd_start_takes_514() {
        let mut bus = bus_with_pattern();
        bus.cpu_cycle = 101; // odd
        bus.write(0x4014, 0x02);
        assert_eq!(run_dma(&mut bus), 514);
    }

    #[test]
    fn transfer_respects_starting_oamaddr() {
        let mut bus = bus_with_pattern();
        bus.write(0x2003, 0x10);
        bus.cpu_cycle = 0;
        bus.write(0x4014, 0x02);
        run_dma(&mut bus);

        bus.write(0x2003, 0x10);
        assert_eq!(bus.read(0x2004), 0x00);
        bus.write(0x2003, 0x0F);
        assert_eq!(bus.read(0x2004), 0xEF); // wrapped: source byte 239
    }

    #[test]
    fn read_phase_preemption_duplicates_byte_zero() {
        let dmc = SharedDmc::default();
        let mut bus = bus_with_dmc(dmc.clone());
        bus.cpu_cycle = 0; // even start
        bus.write(0x4014, 0x02);

        let mut cycles = 0u64;
        // Alignment cycle runs first.
        assert!(bus.dma_cycle(cycles));
        cycles += 1;

        // Assert the sample fetch right as byte 0's read comes up.
        dmc.raise(DmcRequest {
            address: 0x8000,
            stall: 4,
        });
        while bus.dma_active() {
            assert!(bus.dma_cycle(cycles));
            cycles += 1;
        }

        // 513 + 4 cycles total.
        assert_eq!(cycles, 517);
        assert_eq!(dmc.delivered(), vec![0xEA]); // FlatCartridge fill byte

        let oam = oam_bytes(&mut bus);
        assert_eq!(oam[0], 0);
        assert_eq!(oam[1], 0); // duplicated byte 0
        for (slot, &byte) in oam.iter().enumerate().skip(2) {
            let source = (slot - 1) as u8; // offsets 1..=254
            let expected = if slot % 4 == 2 { source & 0xE3 } else { source };
            assert_eq!(byte, expected, "OAM slot {slot}");
        }
        // Byte 255 was never transferred; slot 255 holds source offset 254.
        assert_eq!(oam[255], 254);
        // The one-shot latch cleared when the transfer finished.
        assert!(!bus.ledger.duplication_occurred);
    }

    #[test]
    fn duplication_flag_set_while_transfer_runs() {
        let dmc = SharedDmc::default();
        let mut bus = bus_with_dmc(dmc.clone());
        bus.cpu_cycle = 0;
        bus.write(0x4014, 0x02);

        let mut now = 0u64;
        assert!(bus.dma_cycle(now)); // alignment
        now += 1;
        dmc.raise(DmcRequest {
            address: 0x8000,
            stall: 4,
        });
        assert!(bus.dma_cycle(now)); // pause + capture
        now += 1;
        assert!(bus.ledger.duplication_occurred);
        assert!(bus.ledger.pause_snapshot.was_reading);
        assert_eq!(bus.ledger.pause_snapshot.offset, 0);
        assert!(bus.ledger.dmc_active());
        assert!(bus.ledger.sprite_dma_paused());

        while bus.dma_active() {
            bus.dma_cycle(now);
            now += 1;
        }
        assert!(!bus.ledger.duplication_occurred);
        assert!(!bus.ledger.dmc_active());
        assert!(!bus.ledger.sprite_dma_paused());
    }

    #[test]
    fn write_phase_preemption_does_not_duplicate() {
        let dmc = SharedDmc::default();
        let mut bus = bus_with_dmc(dmc.clone());
        bus.cpu_cycle = 0;
        bus.write(0x4014, 0x02);

        let mut cycles = 0u64;
        bus.dma_cycle(cycles); // alignment
        cycles += 1;
        bus.dma_cycle(cycles); // byte 0 read
        cycles += 1;

        // Pause lands on the write phase.
        dmc.raise(DmcRequest {
            address: 0x8000,
            stall: 4,
        });
        while bus.dma_active() {
            bus.dma_cycle(cycles);
            cycles += 1;
        }

        assert_eq!(cycles, 517);
        let oam = oam_bytes(&mut bus);
        assert_eq!(oam[0], 0);
        assert_eq!(oam[1], 1);
        assert_eq!(oam[255], 255);
        assert!(!bus.ledger.duplication_occurred);
        assert!(!bus.ledger.pause_snapshot.was_reading);
    }

    #[test]
    fn two_read_phase_preemptions_still_write_256() {
        let dmc = SharedDmc::default();
        let mut bus = bus_with_dmc(dmc.clone());
        bus.cpu_cycle = 0;
        bus.write(0x4014, 0x02);

        let mut cycles = 0u64;
        bus.dma_cycle(cycles); // alignment
        cycles += 1;

        dmc.raise(DmcRequest {
            address: 0x8000,
            stall: 4,
        });
        // First preemption at byte 0's read, second a few pairs later.
        for _ in 0..20 {
            bus.dma_cycle(cycles);
            cycles += 1;
        }
        dmc.raise(DmcRequest {
            address: 0x8001,
            stall: 4,
        });
        while bus.dma_active() {
            bus.dma_cycle(cycles);
            cycles += 1;
        }

        assert_eq!(cycles, 513 + 8);
        let oam = oam_bytes(&mut bus);
        assert_eq!(oam.len(), 256);
        // Exactly 256 writes happened; both duplicated bytes are present
        // and the last two source bytes were dropped.
        assert_eq!(oam[0], 0);
        assert_eq!(oam[1], 0);
    }

    #[test]
    fn sample_dma_alone_freezes_cpu_for_its_budget() {
        let dmc = SharedDmc::default();
        let mut bus = bus_with_dmc(dmc.clone());

        dmc.raise(DmcRequest {
            address: 0x9000,
            stall: 4,
        });
        let mut cycles = 0u64;
        while bus.dma_cycle(cycles) {
            cycles += 1;
        }
        assert_eq!(cycles, 4);
        assert_eq!(dmc.delivered(), vec![0xEA]);
    }

    #[test]
    fn nmos_stall_repeats_last_read() {
        let dmc = SharedDmc::default();
        let mut bus = bus_with_dmc(dmc.clone());
        bus.write(0x0040, 0x99);
        let _ = bus.read(0x0040);

        dmc.raise(DmcRequest {
            address: 0x9000,
            stall: 4,
        });
        // Idle stall cycles re-read $0040; the final cycle reads $9000.
        bus.dma_cycle(0);
        assert_eq!(bus.last_read_addr(), 0x0040);
        bus.dma_cycle(1);
        assert_eq!(bus.last_read_addr(), 0x0040);
        bus.dma_cycle(2);
        assert_eq!(bus.last_read_addr(), 0x0040);
        bus.dma_cycle(3);
        assert_eq!(bus.last_read_addr(), 0x9000);
        assert!(!bus.dma_active());
    }
}
