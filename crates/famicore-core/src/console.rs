//! The console facade: master tick loop, snapshots, and debug surface.

use crate::bus::Bus;
use crate::clock::MasterClock;
use crate::debug::{DebugIntent, IntentLog};
use crate::dma::DmaArbiter;
use crate::hooks::{Apu, InputPort, Mapper};
use crate::ledger::InteractionLedger;
use crate::variant::ConsoleVariant;
use famicore_cpu::{Bus as _, Cpu};
use famicore_ppu::Ppu;

/// Errors from the console surface. The tick path itself is total; only
/// state-management operations can fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// A snapshot from a different console variant cannot be restored.
    #[error("snapshot variant mismatch: {snapshot} scanlines vs {console}")]
    SnapshotVariantMismatch {
        /// Scanline count baked into the snapshot.
        snapshot: u16,
        /// Scanline count of the running console.
        console: u16,
    },
}

/// Full-core state copy, suitable for rewind. Collaborators (mapper, APU,
/// input) are external and carry their own state.
#[derive(Clone)]
pub struct Snapshot {
    cpu: Cpu,
    clock: MasterClock,
    ram: [u8; 2048],
    ppu: Ppu,
    dma: DmaArbiter,
    ledger: InteractionLedger,
    open_bus: u8,
    last_read_addr: u16,
    cpu_cycle: u64,
}

/// Frame sink invoked once per completed PPU frame with 256x240 RGBA
/// pixels.
pub type FrameCallback = Box<dyn FnMut(&[u8])>;

/// The assembled console core.
pub struct Console {
    cpu: Cpu,
    bus: Bus,
    clock: MasterClock,
    frame_callback: Option<FrameCallback>,
    intents: IntentLog,
}

impl Console {
    /// Assemble a console around the collaborators.
    pub fn new(
        variant: ConsoleVariant,
        mapper: Box<dyn Mapper>,
        apu: Box<dyn Apu>,
        input: Box<dyn InputPort>,
    ) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(variant, mapper, apu, input),
            clock: MasterClock::new(variant),
            frame_callback: None,
            intents: IntentLog::default(),
        }
    }

    /// Cold boot: reset everything and load PC from the reset vector.
    pub fn power_on(&mut self) {
        self.bus.reset();
        self.clock.reset();
        self.cpu.reset(&mut self.bus);
        self.intents.clear();
    }

    /// Register the frame sink.
    pub fn set_frame_callback(&mut self, callback: FrameCallback) {
        self.frame_callback = Some(callback);
    }

    /// Advance the whole core by one master-clock step (one PPU dot).
    ///
    /// Fixed order: clock, PPU dot, APU frame tick, then the CPU slot,
    /// where the sample-DMA outranks the sprite-DMA which outranks the
    /// instruction micro-step. Returns true when this step completed a
    /// frame.
    pub fn master_tick(&mut self) -> bool {
        let step = self.clock.advance(self.bus.ppu.rendering_enabled());

        self.bus.ppu_dot(&step);
        if step.frame_complete {
            if let Some(callback) = &mut self.frame_callback {
                callback(self.bus.ppu.frame_buffer());
            }
        }

        if step.apu_tick {
            self.bus.apu_frame_tick();
        }

        if step.cpu_tick {
            self.bus.begin_cpu_cycle();
            let frozen = self.bus.dma_cycle(step.cycle);
            if !frozen {
                self.cpu.step_cycle(&mut self.bus);
            }
            // Interrupt lines are sampled once per CPU slot, after the
            // cycle's bus activity settled.
            let irq = self.bus.irq_line();
            self.cpu.set_irq_line(irq);
            self.cpu.set_nmi_line(self.bus.ppu.nmi_line());
        }

        step.frame_complete
    }

    /// Run master ticks until a frame completes.
    pub fn step_frame(&mut self) {
        while !self.master_tick() {}
    }

    /// The CPU (debug surfaces may mutate registers freely).
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// The CPU, read-only.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The system bus.
    #[must_use]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The system bus, mutable.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// The master clock.
    #[must_use]
    pub fn clock(&self) -> &MasterClock {
        &self.clock
    }

    /// Read without side effects: open bus, PPU latches, and mapper state
    /// stay untouched.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Debugger write. RAM and register regions behave like bus writes;
    /// ROM-targeted pokes update the open-bus latch and are logged as
    /// intents instead of mutating the cartridge.
    pub fn poke(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            log::warn!("debugger poke to ROM ${addr:04X} = ${value:02X} recorded as intent");
            self.bus.open_bus = value;
            self.intents.record(addr, value);
        } else {
            self.bus.write(addr, value);
        }
    }

    /// ROM-poke history, oldest first.
    #[must_use]
    pub fn intent_history(&self) -> &[DebugIntent] {
        self.intents.entries()
    }

    /// Capture a restorable copy of the core state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cpu: self.cpu.clone(),
            clock: *self.clock(),
            ram: self.bus.ram,
            ppu: self.bus.ppu.clone(),
            dma: self.bus.dma,
            ledger: self.bus.ledger,
            open_bus: self.bus.open_bus,
            last_read_addr: self.bus.last_read_addr,
            cpu_cycle: self.bus.cpu_cycle,
        }
    }

    /// Restore a previously captured state.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot came from a console with a different
    /// scanline count (NTSC vs PAL).
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), CoreError> {
        if snapshot.clock.scanlines_per_frame() != self.clock.scanlines_per_frame() {
            return Err(CoreError::SnapshotVariantMismatch {
                snapshot: snapshot.clock.scanlines_per_frame(),
                console: self.clock.scanlines_per_frame(),
            });
        }
        self.cpu = snapshot.cpu.clone();
        self.clock = snapshot.clock;
        self.bus.ram = snapshot.ram;
        self.bus.ppu = snapshot.ppu.clone();
        self.bus.dma = snapshot.dma;
        self.bus.ledger = snapshot.ledger;
        self.bus.open_bus = snapshot.open_bus;
        self.bus.last_read_addr = snapshot.last_read_addr;
        self.bus.cpu_cycle = snapshot.cpu_cycle;
        Ok(())
    }
}
