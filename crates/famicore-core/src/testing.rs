//! Reference collaborators for tests and benches.
//!
//! Real mappers, APUs, and input devices live outside this crate; these
//! minimal stand-ins satisfy the hook traits with deterministic behavior
//! so the core can be exercised on its own.

use crate::hooks::{Apu, DmcRequest, InputPort, Mapper};
use famicore_ppu::Mirroring;
use std::cell::RefCell;
use std::rc::Rc;

/// Flat 32 KiB PRG ROM (filled with NOPs) plus 8 KiB CHR RAM. No banking,
/// horizontal mirroring, no IRQ.
pub struct FlatCartridge {
    prg: Vec<u8>,
    chr: Vec<u8>,
    mirroring: Mirroring,
}

impl Default for FlatCartridge {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatCartridge {
    /// Empty cartridge: PRG full of $EA (NOP), reset vector at $8000.
    #[must_use]
    pub fn new() -> Self {
        let mut cart = Self {
            prg: vec![0xEA; 0x8000],
            chr: vec![0; 0x2000],
            mirroring: Mirroring::Horizontal,
        };
        cart.set_reset_vector(0x8000);
        cart
    }

    /// Cartridge with a program placed at $8000 and the reset vector
    /// pointing at it.
    #[must_use]
    pub fn with_program(program: &[u8]) -> Self {
        let mut cart = Self::new();
        cart.load(0x8000, program);
        cart
    }

    /// Copy bytes into PRG space.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let offset = usize::from(addr - 0x8000) + i;
            self.prg[offset & 0x7FFF] = byte;
        }
    }

    /// Point the RESET vector somewhere.
    pub fn set_reset_vector(&mut self, target: u16) {
        self.prg[0x7FFC] = (target & 0xFF) as u8;
        self.prg[0x7FFD] = (target >> 8) as u8;
    }

    /// Point the NMI vector somewhere.
    pub fn set_nmi_vector(&mut self, target: u16) {
        self.prg[0x7FFA] = (target & 0xFF) as u8;
        self.prg[0x7FFB] = (target >> 8) as u8;
    }

    /// Point the IRQ/BRK vector somewhere.
    pub fn set_irq_vector(&mut self, target: u16) {
        self.prg[0x7FFE] = (target & 0xFF) as u8;
        self.prg[0x7FFF] = (target >> 8) as u8;
    }

    /// Fill CHR with a byte (handy for opaque-everything patterns).
    pub fn fill_chr(&mut self, value: u8) {
        self.chr.fill(value);
    }
}

impl Mapper for FlatCartridge {
    fn cpu_read(&mut self, addr: u16) -> u8 {
        self.cpu_peek(addr)
    }

    fn cpu_write(&mut self, _addr: u16, _value: u8) {
        // PRG ROM: writes land nowhere.
    }

    fn cpu_peek(&self, addr: u16) -> u8 {
        if addr >= 0x8000 {
            self.prg[usize::from(addr - 0x8000) & 0x7FFF]
        } else {
            0
        }
    }

    fn ppu_read(&mut self, addr: u16) -> u8 {
        self.chr[usize::from(addr & 0x1FFF)]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.chr[usize::from(addr & 0x1FFF)] = value;
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}

/// APU stand-in that never requests samples.
#[derive(Default)]
pub struct NullApu {
    /// Frame-counter ticks observed.
    pub frame_ticks: u64,
}

impl Apu for NullApu {
    fn cpu_read(&mut self, _addr: u16) -> u8 {
        0
    }

    fn cpu_write(&mut self, _addr: u16, _value: u8) {}

    fn frame_tick(&mut self) {
        self.frame_ticks += 1;
    }
}

/// Input stand-in that reads all zeros.
pub struct NullInput;

impl InputPort for NullInput {
    fn read(&mut self, _port: u8) -> u8 {
        0
    }

    fn strobe(&mut self, _level: bool) {}
}

#[derive(Default)]
struct DmcShared {
    pending: Option<DmcRequest>,
    delivered: Vec<u8>,
    frame_ticks: u64,
}

/// Handle for scripting DMC requests from a test while the console owns
/// the APU box.
#[derive(Default, Clone)]
pub struct SharedDmc(Rc<RefCell<DmcShared>>);

impl SharedDmc {
    /// Queue a sample-fetch request; the arbiter picks it up on the next
    /// CPU cycle.
    pub fn raise(&self, request: DmcRequest) {
        self.0.borrow_mut().pending = Some(request);
    }

    /// Bytes the sample-DMA delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<u8> {
        self.0.borrow().delivered.clone()
    }

    /// Frame-counter ticks observed.
    #[must_use]
    pub fn frame_ticks(&self) -> u64 {
        self.0.borrow().frame_ticks
    }
}

/// APU whose DMC requests are driven externally through [`SharedDmc`].
pub struct ScriptedApu {
    dmc: SharedDmc,
}

impl ScriptedApu {
    /// Wrap a shared handle.
    #[must_use]
    pub fn new(dmc: SharedDmc) -> Self {
        Self { dmc }
    }
}

impl Apu for ScriptedApu {
    fn cpu_read(&mut self, _addr: u16) -> u8 {
        0
    }

    fn cpu_write(&mut self, _addr: u16, _value: u8) {}

    fn frame_tick(&mut self) {
        self.dmc.0.borrow_mut().frame_ticks += 1;
    }

    fn dmc_request(&mut self) -> Option<DmcRequest> {
        self.dmc.0.borrow_mut().pending.take()
    }

    fn dmc_deliver(&mut self, value: u8) {
        self.dmc.0.borrow_mut().delivered.push(value);
    }
}
