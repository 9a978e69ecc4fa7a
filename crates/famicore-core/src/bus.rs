//! System bus: address decode, open-bus latch, and component bridging.
//!
//! The bus owns the 2 KiB work RAM and the open-bus latch, and routes CPU
//! traffic to the PPU register window, the APU/DMA/input registers, and
//! the cartridge. Every access deposits the byte on the data bus into the
//! latch; reads of unmapped or write-only locations return the previous
//! latch value. Every access also records the address for the NMOS DMC
//! repeat-read quirk.

use crate::clock::Step;
use crate::dma::DmaArbiter;
use crate::hooks::{Apu, DmcRequest, InputPort, Mapper};
use crate::ledger::InteractionLedger;
use crate::variant::ConsoleVariant;
use famicore_cpu::CpuVariant;
use famicore_ppu::{ChrBus, Ppu};

/// Pattern-bus adapter handing PPU fetches to the mapper with A12 edges.
pub(crate) struct MapperChr<'a> {
    mapper: &'a mut dyn Mapper,
}

impl ChrBus for MapperChr<'_> {
    fn pattern_read(&mut self, addr: u16) -> u8 {
        self.mapper.notify_ppu_a12(addr & 0x1000 != 0);
        self.mapper.ppu_read(addr)
    }

    fn pattern_write(&mut self, addr: u16, value: u8) {
        self.mapper.notify_ppu_a12(addr & 0x1000 != 0);
        self.mapper.ppu_write(addr, value);
    }

    fn address_strobe(&mut self, addr: u16) {
        self.mapper.notify_ppu_a12(addr & 0x1000 != 0);
    }
}

/// The CPU-side system bus.
pub struct Bus {
    /// 2 KiB work RAM, mirrored through $1FFF.
    pub ram: [u8; 2048],
    /// The PPU; reachable through the $2000-$3FFF register window.
    pub ppu: Ppu,
    /// Shared edge-timestamp record.
    pub ledger: InteractionLedger,
    pub(crate) dma: DmaArbiter,
    pub(crate) mapper: Box<dyn Mapper>,
    pub(crate) apu: Box<dyn Apu>,
    pub(crate) input: Box<dyn InputPort>,
    pub(crate) open_bus: u8,
    pub(crate) last_read_addr: u16,
    pub(crate) cpu_cycle: u64,
    cpu_variant: CpuVariant,
}

impl Bus {
    /// Assemble the bus around the collaborators.
    pub fn new(
        variant: ConsoleVariant,
        mapper: Box<dyn Mapper>,
        apu: Box<dyn Apu>,
        input: Box<dyn InputPort>,
    ) -> Self {
        let mirroring = mapper.mirroring();
        Self {
            ram: [0; 2048],
            ppu: Ppu::new(variant.ppu_variant(), mirroring),
            ledger: InteractionLedger::new(),
            dma: DmaArbiter::default(),
            mapper,
            apu,
            input,
            open_bus: 0,
            last_read_addr: 0,
            cpu_cycle: 0,
            cpu_variant: variant.cpu_variant(),
        }
    }

    /// Reset bus-owned state. Collaborators reset themselves.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.ppu.reset();
        self.ledger.reset_all();
        self.dma = DmaArbiter::default();
        self.open_bus = 0;
        self.last_read_addr = 0;
        self.cpu_cycle = 0;
    }

    /// CPU cycles elapsed (counts DMA-stolen cycles too).
    #[must_use]
    pub const fn cpu_cycle(&self) -> u64 {
        self.cpu_cycle
    }

    /// Current open-bus latch value.
    #[must_use]
    pub const fn open_bus(&self) -> u8 {
        self.open_bus
    }

    /// Address of the most recent bus read.
    #[must_use]
    pub const fn last_read_addr(&self) -> u16 {
        self.last_read_addr
    }

    /// True while either DMA engine owns the CPU.
    #[must_use]
    pub fn dma_active(&self) -> bool {
        self.dma.busy()
    }

    /// Aggregate IRQ line: mapper OR APU.
    #[must_use]
    pub fn irq_line(&self) -> bool {
        self.mapper.irq_pending() || self.apu.irq_pending()
    }

    /// Begin a CPU cycle (parity feeds sprite-DMA alignment).
    pub(crate) fn begin_cpu_cycle(&mut self) {
        self.cpu_cycle += 1;
    }

    /// Run one PPU dot at the step's position, then stamp any edges into
    /// the ledger.
    pub(crate) fn ppu_dot(&mut self, step: &Step) {
        self.ppu.set_mirroring(self.mapper.mirroring());
        let mut chr = MapperChr {
            mapper: self.mapper.as_mut(),
        };
        self.ppu
            .tick(step.scanline, step.dot, step.skip_slot, &mut chr);
        let events = self.ppu.take_events();
        if events.vblank_set {
            self.ledger.vblank_set_at = step.cycle;
        }
        if events.vblank_cleared {
            self.ledger.vblank_cleared_at = step.cycle;
        }
    }

    /// Forward an APU frame-counter tick.
    pub(crate) fn apu_frame_tick(&mut self) {
        self.apu.frame_tick();
    }

    /// Run one DMA-arbiter cycle. Returns true when the CPU is frozen.
    pub(crate) fn dma_cycle(&mut self, now: u64) -> bool {
        let mut dma = std::mem::take(&mut self.dma);
        let frozen = dma.step_cycle(self, now);
        self.dma = dma;
        frozen
    }

    pub(crate) fn poll_dmc_request(&mut self) -> Option<DmcRequest> {
        self.apu.dmc_request()
    }

    pub(crate) fn deliver_dmc(&mut self, value: u8) {
        self.apu.dmc_deliver(value);
    }

    /// NMOS revisions repeat the last read during DMC stall cycles.
    pub(crate) fn dmc_repeat_read(&self) -> bool {
        self.cpu_variant.has_dmc_repeat_read()
    }

    /// Side-effect-free read for inspection: the open-bus latch, PPU
    /// latches, and mapper state are all left alone.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x2000..=0x3FFF => self.ppu.peek_reg((addr & 7) as u8, self.open_bus),
            0x4000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self.mapper.cpu_peek(addr),
        }
    }
}

impl famicore_cpu::Bus for Bus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x2000..=0x3FFF => {
                let reg = (addr & 7) as u8;
                match reg {
                    2 | 4 | 7 => {
                        let open_bus = self.open_bus;
                        let mut chr = MapperChr {
                            mapper: self.mapper.as_mut(),
                        };
                        self.ppu.reg_read(reg, open_bus, &mut chr)
                    }
                    // Write-only registers float.
                    _ => self.open_bus,
                }
            }
            // APU status is the only readable register in this block.
            0x4015 => self.apu.cpu_read(addr),
            // Controllers drive the low bits; the rest floats.
            0x4016 => (self.input.read(0) & 0x1F) | (self.open_bus & 0xE0),
            0x4017 => (self.input.read(1) & 0x1F) | (self.open_bus & 0xE0),
            0x4000..=0x4014 | 0x4018..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self.mapper.cpu_read(addr),
        };
        self.open_bus = value;
        self.last_read_addr = addr;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)] = value,
            0x2000..=0x3FFF => {
                let mut chr = MapperChr {
                    mapper: self.mapper.as_mut(),
                };
                self.ppu.reg_write((addr & 7) as u8, value, &mut chr);
            }
            0x4014 => {
                let cycle = self.cpu_cycle;
                self.dma.start_sprite(value, cycle);
            }
            0x4016 => self.input.strobe(value & 1 != 0),
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.cpu_write(addr, value),
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => self.mapper.cpu_write(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlatCartridge, NullApu, NullInput};
    use famicore_cpu::Bus as CpuBus;

    fn test_bus() -> Bus {
        Bus::new(
            ConsoleVariant::NtscFrontLoader,
            Box::new(FlatCartridge::new()),
            Box::new(NullApu::default()),
            Box::new(NullInput),
        )
    }

    #[test]
    fn ram_mirroring() {
        let mut bus = test_bus();
        bus.write(0x0000, 0x42);
        assert_eq!(bus.read(0x0000), 0x42);
        assert_eq!(bus.read(0x0800), 0x42);
        assert_eq!(bus.read(0x1000), 0x42);
        assert_eq!(bus.read(0x1800), 0x42);

        bus.write(0x1234, 0xAB);
        assert_eq!(bus.read(0x0234), 0xAB);
    }

    #[test]
    fn open_bus_latch_tracks_traffic() {
        let mut bus = test_bus();
        bus.write(0x0000, 0xAB);
        assert_eq!(bus.open_bus(), 0xAB);
        let _ = bus.read(0x0000);
        assert_eq!(bus.open_bus(), 0xAB);

        // Write-only PPU register read returns the latch.
        assert_eq!(bus.read(0x2000), 0xAB);
    }

    #[test]
    fn every_read_updates_last_read_addr() {
        let mut bus = test_bus();
        let _ = bus.read(0x1234);
        assert_eq!(bus.last_read_addr(), 0x1234);
        let _ = bus.read(0x8000);
        assert_eq!(bus.last_read_addr(), 0x8000);
    }

    #[test]
    fn ppu_register_window_mirrors_every_eight() {
        let mut bus = test_bus();
        // OAMADDR then OAMDATA through a mirror address.
        bus.write(0x2003, 0x10);
        bus.write(0x3FFC, 0x77); // $2004 mirror
        bus.write(0x2003, 0x10);
        assert_eq!(bus.read(0x2004), 0x77);
    }

    #[test]
    fn dma_trigger_registers_transfer() {
        let mut bus = test_bus();
        bus.write(0x4014, 0x02);
        assert!(bus.dma_active());
    }

    #[test]
    fn peek_has_no_side_effects() {
        let mut bus = test_bus();
        bus.write(0x0100, 0x42);
        let latch = bus.open_bus();
        assert_eq!(bus.peek(0x0100), 0x42);
        assert_eq!(bus.peek(0x0900), 0x42);
        // Peeking PPUSTATUS must not clear VBlank or touch the latch.
        let _ = bus.peek(0x2002);
        assert_eq!(bus.open_bus(), latch);
    }

    #[test]
    fn disabled_region_reads_float() {
        let mut bus = test_bus();
        bus.write(0x0000, 0x5A);
        let _ = bus.read(0x0000);
        assert_eq!(bus.read(0x4018), 0x5A);
        assert_eq!(bus.read(0x4014), 0x5A);
    }
}
