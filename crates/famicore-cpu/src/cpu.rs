//! 6502 CPU core.
//!
//! The CPU is a table-driven micro-sequencer: [`Cpu::step_cycle`] advances
//! exactly one cycle with at most one bus access. The dispatch table maps
//! each opcode to an addressing mode and execution kind; together they
//! select the walk through [`MicroState`] values. All timing follows the
//! NESdev Wiki cycle listings, including dummy reads, the RMW triple
//! access, and the seven-cycle interrupt sequence.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::OPCODE_TABLE;
use crate::state::{MicroState, OpKind};
use crate::status::Status;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interrupt vector addresses.
pub mod vectors {
    /// NMI vector.
    pub const NMI: u16 = 0xFFFA;
    /// RESET vector.
    pub const RESET: u16 = 0xFFFC;
    /// IRQ/BRK vector.
    pub const IRQ: u16 = 0xFFFE;
}

/// RP2A03 CPU core (MOS 6502 without decimal mode hardware).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(clippy::struct_excessive_bools)] // Latches and lines are genuinely boolean
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer; all stack traffic addresses `$0100 | SP`.
    pub sp: u8,
    /// Status flags.
    pub status: Status,
    /// Cycles executed since power-on. Does not advance while the bus is
    /// stolen by DMA (the arbiter freezes the CPU before calling us).
    pub cycles: u64,
    /// CPU halted by a JAM opcode; only RESET clears this.
    pub halted: bool,

    // Micro-sequencer state
    micro: MicroState,
    pub(crate) opcode: u8,
    mode: AddrMode,
    kind: OpKind,
    operand_lo: u8,
    operand_hi: u8,
    base_addr: u16,
    pub(crate) effective_addr: u16,
    page_crossed: bool,
    temp: u8,
    branch_offset: i8,

    // Interrupt plumbing
    nmi_line_prev: bool,
    nmi_pending: bool,
    irq_line: bool,
    /// I flag as sampled at the previous instruction boundary; models the
    /// one-instruction latency of CLI/SEI/PLP/RTI.
    prev_irq_inhibit: bool,
    /// One-shot NMI poll suppression after BRK completes.
    suppress_nmi_next: bool,
    int_vector: u16,
    int_software: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Create a CPU in the power-on state. PC is loaded by [`Cpu::reset`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: Status::POWER_ON,
            cycles: 0,
            halted: false,
            micro: MicroState::FetchOpcode,
            opcode: 0,
            mode: AddrMode::Implied,
            kind: OpKind::Implied,
            operand_lo: 0,
            operand_hi: 0,
            base_addr: 0,
            effective_addr: 0,
            page_crossed: false,
            temp: 0,
            branch_offset: 0,
            nmi_line_prev: false,
            nmi_pending: false,
            irq_line: false,
            prev_irq_inhibit: true,
            suppress_nmi_next: false,
            int_vector: vectors::IRQ,
            int_software: false,
        }
    }

    /// Reset the CPU: A/X/Y cleared, SP to $FD, I set, PC loaded from the
    /// RESET vector. Applied synchronously; the seven hardware spin-up
    /// cycles are accounted for in the cycle counter only.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.status = Status::POWER_ON;
        self.pc = bus.read_u16(vectors::RESET);
        self.cycles += 7;
        self.halted = false;
        self.micro = MicroState::FetchOpcode;
        self.nmi_pending = false;
        self.nmi_line_prev = false;
        self.irq_line = false;
        self.prev_irq_inhibit = true;
        self.suppress_nmi_next = false;
    }

    /// Drive the NMI input. Edge-detected: a low-to-high transition
    /// latches a pending NMI serviced at the next instruction boundary.
    pub fn set_nmi_line(&mut self, level: bool) {
        if level && !self.nmi_line_prev {
            self.nmi_pending = true;
        }
        self.nmi_line_prev = level;
    }

    /// Drive the IRQ input. Level-sensitive: sampled at instruction
    /// boundaries while the I flag (as of the previous boundary) is clear.
    pub fn set_irq_line(&mut self, level: bool) {
        self.irq_line = level;
    }

    /// True at an instruction boundary (next cycle fetches an opcode).
    #[must_use]
    pub fn at_instruction_boundary(&self) -> bool {
        self.micro == MicroState::FetchOpcode
    }

    /// Run whole instructions: cycles until the next boundary. Returns the
    /// cycle count. Intended for tests and trace tooling.
    pub fn step_instruction(&mut self, bus: &mut impl Bus) -> u8 {
        let start = self.cycles;
        loop {
            let boundary = self.step_cycle(bus);
            if boundary || self.halted {
                break;
            }
        }
        (self.cycles - start) as u8
    }

    /// Advance the CPU by exactly one cycle.
    ///
    /// Returns `true` when the cycle completed an instruction (or an
    /// interrupt sequence). A halted CPU burns the cycle with no bus
    /// access and never reaches a boundary again until reset.
    pub fn step_cycle(&mut self, bus: &mut impl Bus) -> bool {
        if self.halted {
            self.cycles += 1;
            return false;
        }
        self.cycles += 1;

        match self.micro {
            MicroState::FetchOpcode => self.cycle_fetch_opcode(bus),
            MicroState::FetchOperandLo => self.cycle_fetch_operand_lo(bus),
            MicroState::FetchOperandHi => self.cycle_fetch_operand_hi(bus),
            MicroState::IndexZeroPage => self.cycle_index_zero_page(bus),
            MicroState::PointerLo => self.cycle_pointer_lo(bus),
            MicroState::PointerHi => self.cycle_pointer_hi(bus),
            MicroState::FixPage => self.cycle_fix_page(bus),
            MicroState::ReadOperand => self.cycle_read_operand(bus),
            MicroState::WriteResult => self.cycle_write_result(bus),
            MicroState::RmwRead => self.cycle_rmw_read(bus),
            MicroState::RmwWriteBack => self.cycle_rmw_write_back(bus),
            MicroState::RmwWriteNew => self.cycle_rmw_write_new(bus),
            MicroState::ImpliedExec => self.cycle_implied_exec(bus),
            MicroState::BranchTaken => self.cycle_branch_taken(bus),
            MicroState::BranchFix => self.cycle_branch_fix(bus),
            MicroState::StackDummy => self.cycle_stack_dummy(bus),
            MicroState::PushValue => self.cycle_push_value(bus),
            MicroState::PullDummy => self.cycle_pull_dummy(bus),
            MicroState::PullValue => self.cycle_pull_value(bus),
            MicroState::PullStatus => self.cycle_pull_status(bus),
            MicroState::PullPcl => self.cycle_pull_pcl(bus),
            MicroState::PullPch => self.cycle_pull_pch(bus),
            MicroState::RtsIncrement => self.cycle_rts_increment(bus),
            MicroState::JsrInternal => self.cycle_jsr_internal(bus),
            MicroState::JsrPushPch => self.cycle_jsr_push_pch(bus),
            MicroState::JsrPushPcl => self.cycle_jsr_push_pcl(bus),
            MicroState::JsrJump => self.cycle_jsr_jump(bus),
            MicroState::BrkPadding => self.cycle_brk_padding(bus),
            MicroState::IntDummy => self.cycle_int_dummy(bus),
            MicroState::IntPushPch => self.cycle_int_push_pch(bus),
            MicroState::IntPushPcl => self.cycle_int_push_pcl(bus),
            MicroState::IntPushStatus => self.cycle_int_push_status(bus),
            MicroState::IntVectorLo => self.cycle_int_vector_lo(bus),
            MicroState::IntVectorHi => self.cycle_int_vector_hi(bus),
        }
    }

    // ---------------------------------------------------------------
    // Cycle handlers
    // ---------------------------------------------------------------

    fn cycle_fetch_opcode(&mut self, bus: &mut impl Bus) -> bool {
        let irq_inhibit_now = self.status.contains(Status::I);

        // Pending interrupts hijack the fetch cycle. NMI outranks IRQ and
        // ignores the I flag.
        if self.nmi_pending && !self.suppress_nmi_next {
            self.nmi_pending = false;
            self.prev_irq_inhibit = true;
            let _ = bus.read(self.pc);
            self.int_vector = vectors::NMI;
            self.int_software = false;
            self.micro = MicroState::IntDummy;
            log::trace!("NMI accepted at PC ${:04X}", self.pc);
            return false;
        }
        if self.suppress_nmi_next {
            self.suppress_nmi_next = false;
        }
        if self.irq_line && !self.prev_irq_inhibit {
            self.prev_irq_inhibit = true;
            let _ = bus.read(self.pc);
            self.int_vector = vectors::IRQ;
            self.int_software = false;
            self.micro = MicroState::IntDummy;
            log::trace!("IRQ accepted at PC ${:04X}", self.pc);
            return false;
        }
        self.prev_irq_inhibit = irq_inhibit_now;

        self.opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        let info = &OPCODE_TABLE[self.opcode as usize];
        self.mode = info.mode;
        self.kind = info.kind;
        self.operand_lo = 0;
        self.operand_hi = 0;
        self.base_addr = 0;
        self.effective_addr = 0;
        self.page_crossed = false;
        self.temp = 0;
        self.branch_offset = 0;

        match self.kind {
            OpKind::Jam => {
                self.halted = true;
                log::warn!(
                    "CPU halted by JAM opcode ${:02X} at ${:04X}",
                    self.opcode,
                    self.pc.wrapping_sub(1)
                );
                self.micro = MicroState::FetchOpcode;
                true
            }
            OpKind::Implied | OpKind::Accumulator => {
                self.micro = MicroState::ImpliedExec;
                false
            }
            OpKind::Brk => {
                self.micro = MicroState::BrkPadding;
                false
            }
            OpKind::Push | OpKind::Pull | OpKind::Rts | OpKind::Rti => {
                self.micro = MicroState::StackDummy;
                false
            }
            _ => {
                self.micro = MicroState::FetchOperandLo;
                false
            }
        }
    }

    /// State following the operand fetch, by execution kind.
    fn operand_ready_state(&self) -> MicroState {
        match self.kind {
            OpKind::Read => MicroState::ReadOperand,
            OpKind::Write => MicroState::WriteResult,
            OpKind::Rmw => MicroState::RmwRead,
            _ => MicroState::FetchOpcode,
        }
    }

    fn cycle_fetch_operand_lo(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_lo = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        match self.mode {
            AddrMode::Immediate => {
                // Operand is the value; execute in this cycle.
                let value = self.operand_lo;
                self.exec_read(value);
                self.micro = MicroState::FetchOpcode;
                return true;
            }
            AddrMode::ZeroPage => {
                self.effective_addr = u16::from(self.operand_lo);
                self.micro = self.operand_ready_state();
            }
            AddrMode::ZeroPageX | AddrMode::ZeroPageY => {
                self.base_addr = u16::from(self.operand_lo);
                self.micro = MicroState::IndexZeroPage;
            }
            AddrMode::IndirectX => {
                self.base_addr = u16::from(self.operand_lo);
                self.micro = MicroState::IndexZeroPage;
            }
            AddrMode::IndirectY => {
                self.base_addr = u16::from(self.operand_lo);
                self.micro = MicroState::PointerLo;
            }
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => {
                self.micro = if self.kind == OpKind::Jsr {
                    MicroState::JsrInternal
                } else {
                    MicroState::FetchOperandHi
                };
            }
            AddrMode::Relative => {
                self.branch_offset = self.operand_lo as i8;
                if self.branch_condition() {
                    self.micro = MicroState::BranchTaken;
                } else {
                    self.micro = MicroState::FetchOpcode;
                    return true;
                }
            }
            AddrMode::Implied | AddrMode::Accumulator => {
                self.micro = MicroState::FetchOpcode;
            }
        }
        false
    }

    fn cycle_fetch_operand_hi(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_hi = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        let addr = u16::from_le_bytes([self.operand_lo, self.operand_hi]);

        match self.mode {
            AddrMode::Absolute => {
                if self.kind == OpKind::JmpAbs {
                    self.pc = addr;
                    self.micro = MicroState::FetchOpcode;
                    return true;
                }
                self.effective_addr = addr;
                self.micro = self.operand_ready_state();
            }
            AddrMode::AbsoluteX | AddrMode::AbsoluteY => {
                let index = if self.mode == AddrMode::AbsoluteX {
                    self.x
                } else {
                    self.y
                };
                self.base_addr = addr;
                self.effective_addr = addr.wrapping_add(u16::from(index));
                self.page_crossed = (addr ^ self.effective_addr) & 0xFF00 != 0;
                self.micro = self.indexed_next_state();
            }
            AddrMode::Indirect => {
                self.base_addr = addr;
                self.micro = MicroState::PointerLo;
            }
            _ => self.micro = MicroState::FetchOpcode,
        }
        false
    }

    /// After computing an indexed effective address: writes and RMW always
    /// pay the fix-up read; reads only on page cross.
    fn indexed_next_state(&self) -> MicroState {
        match self.kind {
            OpKind::Write | OpKind::Rmw => MicroState::FixPage,
            _ if self.page_crossed => MicroState::FixPage,
            _ => self.operand_ready_state(),
        }
    }

    fn cycle_index_zero_page(&mut self, bus: &mut impl Bus) -> bool {
        // Dummy read at the unindexed zero-page address.
        let _ = bus.read(self.base_addr);
        let index = match self.mode {
            AddrMode::ZeroPageY => self.y,
            _ => self.x,
        };
        let indexed = u16::from((self.base_addr as u8).wrapping_add(index));
        if self.mode == AddrMode::IndirectX {
            self.base_addr = indexed;
            self.micro = MicroState::PointerLo;
        } else {
            self.effective_addr = indexed;
            self.micro = self.operand_ready_state();
        }
        false
    }

    fn cycle_pointer_lo(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_lo = bus.read(self.base_addr);
        self.micro = MicroState::PointerHi;
        false
    }

    fn cycle_pointer_hi(&mut self, bus: &mut impl Bus) -> bool {
        match self.mode {
            AddrMode::IndirectY => {
                let hi_addr = u16::from((self.base_addr as u8).wrapping_add(1));
                self.operand_hi = bus.read(hi_addr);
                let pointer = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
                self.base_addr = pointer;
                self.effective_addr = pointer.wrapping_add(u16::from(self.y));
                self.page_crossed = (pointer ^ self.effective_addr) & 0xFF00 != 0;
                self.micro = self.indexed_next_state();
            }
            AddrMode::IndirectX => {
                let hi_addr = u16::from((self.base_addr as u8).wrapping_add(1));
                self.operand_hi = bus.read(hi_addr);
                self.effective_addr = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
                self.micro = self.operand_ready_state();
            }
            AddrMode::Indirect => {
                // JMP ($xxFF) fetches the high byte from $xx00.
                let hi_addr =
                    (self.base_addr & 0xFF00) | u16::from((self.base_addr as u8).wrapping_add(1));
                self.operand_hi = bus.read(hi_addr);
                self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
                self.micro = MicroState::FetchOpcode;
                return true;
            }
            _ => self.micro = MicroState::FetchOpcode,
        }
        false
    }

    fn cycle_fix_page(&mut self, bus: &mut impl Bus) -> bool {
        // Dummy read with the uncorrected high byte.
        let wrong = (self.base_addr & 0xFF00) | (self.effective_addr & 0x00FF);
        let _ = bus.read(wrong);
        self.micro = self.operand_ready_state();
        false
    }

    fn cycle_read_operand(&mut self, bus: &mut impl Bus) -> bool {
        let value = bus.read(self.effective_addr);
        self.exec_read(value);
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_write_result(&mut self, bus: &mut impl Bus) -> bool {
        let value = self.store_value();
        bus.write(self.effective_addr, value);
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_rmw_read(&mut self, bus: &mut impl Bus) -> bool {
        self.temp = bus.read(self.effective_addr);
        self.micro = MicroState::RmwWriteBack;
        false
    }

    fn cycle_rmw_write_back(&mut self, bus: &mut impl Bus) -> bool {
        // The unmodified byte goes back first; memory-mapped registers see
        // this write.
        bus.write(self.effective_addr, self.temp);
        self.micro = MicroState::RmwWriteNew;
        false
    }

    fn cycle_rmw_write_new(&mut self, bus: &mut impl Bus) -> bool {
        let value = self.temp;
        let result = self.exec_rmw(value);
        bus.write(self.effective_addr, result);
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_implied_exec(&mut self, bus: &mut impl Bus) -> bool {
        let _ = bus.read(self.pc);
        if self.kind == OpKind::Accumulator {
            self.exec_accumulator();
        } else {
            self.exec_implied();
        }
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_branch_taken(&mut self, bus: &mut impl Bus) -> bool {
        let _ = bus.read(self.pc);
        let old_pc = self.pc;
        self.pc = self.pc.wrapping_add(self.branch_offset as u16);
        if (old_pc ^ self.pc) & 0xFF00 == 0 {
            self.micro = MicroState::FetchOpcode;
            true
        } else {
            self.micro = MicroState::BranchFix;
            false
        }
    }

    fn cycle_branch_fix(&mut self, bus: &mut impl Bus) -> bool {
        // Dummy read in the pre-cross page.
        let old_pc = self.pc.wrapping_sub(self.branch_offset as u16);
        let _ = bus.read((self.pc & 0x00FF) | (old_pc & 0xFF00));
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_stack_dummy(&mut self, bus: &mut impl Bus) -> bool {
        let _ = bus.read(self.pc);
        self.micro = match self.kind {
            OpKind::Push => MicroState::PushValue,
            _ => MicroState::PullDummy,
        };
        false
    }

    fn cycle_push_value(&mut self, bus: &mut impl Bus) -> bool {
        let value = if self.opcode == 0x08 {
            // PHP pushes with B set.
            self.status.to_stack_byte(true)
        } else {
            self.a
        };
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_pull_dummy(&mut self, bus: &mut impl Bus) -> bool {
        let _ = bus.read(0x0100 | u16::from(self.sp));
        self.sp = self.sp.wrapping_add(1);
        self.micro = match self.kind {
            OpKind::Pull => MicroState::PullValue,
            OpKind::Rts => MicroState::PullPcl,
            _ => MicroState::PullStatus,
        };
        false
    }

    fn cycle_pull_value(&mut self, bus: &mut impl Bus) -> bool {
        let value = bus.read(0x0100 | u16::from(self.sp));
        if self.opcode == 0x68 {
            // PLA
            self.a = value;
            self.set_zn(value);
        } else {
            // PLP: bits 4-5 of the pulled byte are ignored.
            self.status = Status::from_stack_byte(value);
        }
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_pull_status(&mut self, bus: &mut impl Bus) -> bool {
        let value = bus.read(0x0100 | u16::from(self.sp));
        self.status = Status::from_stack_byte(value);
        // An I restored to 1 blocks IRQ starting with the next instruction.
        if self.status.contains(Status::I) {
            self.prev_irq_inhibit = true;
        }
        self.sp = self.sp.wrapping_add(1);
        self.micro = MicroState::PullPcl;
        false
    }

    fn cycle_pull_pcl(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_lo = bus.read(0x0100 | u16::from(self.sp));
        self.sp = self.sp.wrapping_add(1);
        self.micro = MicroState::PullPch;
        false
    }

    fn cycle_pull_pch(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_hi = bus.read(0x0100 | u16::from(self.sp));
        self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
        if self.kind == OpKind::Rts {
            self.micro = MicroState::RtsIncrement;
            false
        } else {
            self.micro = MicroState::FetchOpcode;
            true
        }
    }

    fn cycle_rts_increment(&mut self, bus: &mut impl Bus) -> bool {
        let _ = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_jsr_internal(&mut self, bus: &mut impl Bus) -> bool {
        let _ = bus.read(0x0100 | u16::from(self.sp));
        self.micro = MicroState::JsrPushPch;
        false
    }

    fn cycle_jsr_push_pch(&mut self, bus: &mut impl Bus) -> bool {
        // PC addresses the last operand byte here, so the pushed word is
        // the JSR return address minus one, as RTS expects.
        bus.write(0x0100 | u16::from(self.sp), (self.pc >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.micro = MicroState::JsrPushPcl;
        false
    }

    fn cycle_jsr_push_pcl(&mut self, bus: &mut impl Bus) -> bool {
        bus.write(0x0100 | u16::from(self.sp), (self.pc & 0xFF) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.micro = MicroState::JsrJump;
        false
    }

    fn cycle_jsr_jump(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_hi = bus.read(self.pc);
        self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
        self.micro = MicroState::FetchOpcode;
        true
    }

    fn cycle_brk_padding(&mut self, bus: &mut impl Bus) -> bool {
        // BRK has a padding byte; the return address is PC+2.
        let _ = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.int_vector = vectors::IRQ;
        self.int_software = true;
        self.micro = MicroState::IntPushPch;
        false
    }

    fn cycle_int_dummy(&mut self, bus: &mut impl Bus) -> bool {
        let _ = bus.read(self.pc);
        self.micro = MicroState::IntPushPch;
        false
    }

    fn cycle_int_push_pch(&mut self, bus: &mut impl Bus) -> bool {
        bus.write(0x0100 | u16::from(self.sp), (self.pc >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.micro = MicroState::IntPushPcl;
        false
    }

    fn cycle_int_push_pcl(&mut self, bus: &mut impl Bus) -> bool {
        bus.write(0x0100 | u16::from(self.sp), (self.pc & 0xFF) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.micro = MicroState::IntPushStatus;
        false
    }

    fn cycle_int_push_status(&mut self, bus: &mut impl Bus) -> bool {
        // An NMI edge that arrived before the vector fetch hijacks the
        // sequence: BRK and IRQ jump through $FFFA instead. The pushed B
        // bit still reflects the original source.
        if self.nmi_pending && self.int_vector != vectors::NMI {
            self.nmi_pending = false;
            self.int_vector = vectors::NMI;
        }
        let value = self.status.to_stack_byte(self.int_software);
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
        self.status.insert(Status::I);
        if self.int_software {
            // Let the first handler instruction run before polling NMI again.
            self.suppress_nmi_next = true;
        }
        self.micro = MicroState::IntVectorLo;
        false
    }

    fn cycle_int_vector_lo(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_lo = bus.read(self.int_vector);
        self.micro = MicroState::IntVectorHi;
        false
    }

    fn cycle_int_vector_hi(&mut self, bus: &mut impl Bus) -> bool {
        self.operand_hi = bus.read(self.int_vector.wrapping_add(1));
        self.pc = u16::from_le_bytes([self.operand_lo, self.operand_hi]);
        self.micro = MicroState::FetchOpcode;
        true
    }
}
