//! Opcode dispatch table.
//!
//! All 256 opcodes, official and unofficial, with their addressing mode,
//! execution kind, documented cycle count, and page-cross penalty. The
//! sequencer derives its cycle walk from the mode and kind; the cycle count
//! is documentation that the timing tests check the walk against.

use crate::addressing::AddrMode;
use crate::state::OpKind;

/// Static description of one opcode.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// Instruction mnemonic (for trace/debug output).
    pub mnemonic: &'static str,
    /// Addressing mode.
    pub mode: AddrMode,
    /// Execution pattern.
    pub kind: OpKind,
    /// Documented cycle count, excluding the page-cross penalty.
    pub cycles: u8,
    /// True when an indexed read pays one extra cycle on page cross.
    pub page_penalty: bool,
    /// True for the unofficial set.
    pub unofficial: bool,
}

const fn op(mnemonic: &'static str, mode: AddrMode, kind: OpKind, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        kind,
        cycles,
        page_penalty: false,
        unofficial: false,
    }
}

/// Official opcode with a page-cross penalty cycle.
const fn opp(mnemonic: &'static str, mode: AddrMode, kind: OpKind, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        page_penalty: true,
        ..op(mnemonic, mode, kind, cycles)
    }
}

/// Unofficial opcode.
const fn un(mnemonic: &'static str, mode: AddrMode, kind: OpKind, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        unofficial: true,
        ..op(mnemonic, mode, kind, cycles)
    }
}

/// Unofficial opcode with a page-cross penalty cycle.
const fn unp(mnemonic: &'static str, mode: AddrMode, kind: OpKind, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        unofficial: true,
        page_penalty: true,
        ..op(mnemonic, mode, kind, cycles)
    }
}

/// Complete 256-entry dispatch table, indexed by opcode byte.
#[rustfmt::skip]
pub const OPCODE_TABLE: [OpcodeInfo; 256] = {
    use AddrMode::{Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implied, Indirect,
        IndirectX, IndirectY, Relative, ZeroPage, ZeroPageX, ZeroPageY};
    use OpKind as K;
    [
    // 0x00-0x0F
    op("BRK", Implied, K::Brk, 7),
    op("ORA", IndirectX, K::Read, 6),
    un("JAM", Implied, K::Jam, 2),
    un("SLO", IndirectX, K::Rmw, 8),
    un("NOP", ZeroPage, K::Read, 3),
    op("ORA", ZeroPage, K::Read, 3),
    op("ASL", ZeroPage, K::Rmw, 5),
    un("SLO", ZeroPage, K::Rmw, 5),
    op("PHP", Implied, K::Push, 3),
    op("ORA", Immediate, K::Read, 2),
    op("ASL", Accumulator, K::Accumulator, 2),
    un("ANC", Immediate, K::Read, 2),
    un("NOP", Absolute, K::Read, 4),
    op("ORA", Absolute, K::Read, 4),
    op("ASL", Absolute, K::Rmw, 6),
    un("SLO", Absolute, K::Rmw, 6),
    // 0x10-0x1F
    op("BPL", Relative, K::Branch, 2),
    opp("ORA", IndirectY, K::Read, 5),
    un("JAM", Implied, K::Jam, 2),
    un("SLO", IndirectY, K::Rmw, 8),
    un("NOP", ZeroPageX, K::Read, 4),
    op("ORA", ZeroPageX, K::Read, 4),
    op("ASL", ZeroPageX, K::Rmw, 6),
    un("SLO", ZeroPageX, K::Rmw, 6),
    op("CLC", Implied, K::Implied, 2),
    opp("ORA", AbsoluteY, K::Read, 4),
    un("NOP", Implied, K::Implied, 2),
    un("SLO", AbsoluteY, K::Rmw, 7),
    unp("NOP", AbsoluteX, K::Read, 4),
    opp("ORA", AbsoluteX, K::Read, 4),
    op("ASL", AbsoluteX, K::Rmw, 7),
    un("SLO", AbsoluteX, K::Rmw, 7),
    // 0x20-0x2F
    op("JSR", Absolute, K::Jsr, 6),
    op("AND", IndirectX, K::Read, 6),
    un("JAM", Implied, K::Jam, 2),
    un("RLA", IndirectX, K::Rmw, 8),
    op("BIT", ZeroPage, K::Read, 3),
    op("AND", ZeroPage, K::Read, 3),
    op("ROL", ZeroPage, K::Rmw, 5),
    un("RLA", ZeroPage, K::Rmw, 5),
    op("PLP", Implied, K::Pull, 4),
    op("AND", Immediate, K::Read, 2),
    op("ROL", Accumulator, K::Accumulator, 2),
    un("ANC", Immediate, K::Read, 2),
    op("BIT", Absolute, K::Read, 4),
    op("AND", Absolute, K::Read, 4),
    op("ROL", Absolute, K::Rmw, 6),
    un("RLA", Absolute, K::Rmw, 6),
    // 0x30-0x3F
    op("BMI", Relative, K::Branch, 2),
    opp("AND", IndirectY, K::Read, 5),
    un("JAM", Implied, K::Jam, 2),
    un("RLA", IndirectY, K::Rmw, 8),
    un("NOP", ZeroPageX, K::Read, 4),
    op("AND", ZeroPageX, K::Read, 4),
    op("ROL", ZeroPageX, K::Rmw, 6),
    un("RLA", ZeroPageX, K::Rmw, 6),
    op("SEC", Implied, K::Implied, 2),
    opp("AND", AbsoluteY, K::Read, 4),
    un("NOP", Implied, K::Implied, 2),
    un("RLA", AbsoluteY, K::Rmw, 7),
    unp("NOP", AbsoluteX, K::Read, 4),
    opp("AND", AbsoluteX, K::Read, 4),
    op("ROL", AbsoluteX, K::Rmw, 7),
    un("RLA", AbsoluteX, K::Rmw, 7),
    // 0x40-0x4F
    op("RTI", Implied, K::Rti, 6),
    op("EOR", IndirectX, K::Read, 6),
    un("JAM", Implied, K::Jam, 2),
    un("SRE", IndirectX, K::Rmw, 8),
    un("NOP", ZeroPage, K::Read, 3),
    op("EOR", ZeroPage, K::Read, 3),
    op("LSR", ZeroPage, K::Rmw, 5),
    un("SRE", ZeroPage, K::Rmw, 5),
    op("PHA", Implied, K::Push, 3),
    op("EOR", Immediate, K::Read, 2),
    op("LSR", Accumulator, K::Accumulator, 2),
    un("ALR", Immediate, K::Read, 2),
    op("JMP", Absolute, K::JmpAbs, 3),
    op("EOR", Absolute, K::Read, 4),
    op("LSR", Absolute, K::Rmw, 6),
    un("SRE", Absolute, K::Rmw, 6),
    // 0x50-0x5F
    op("BVC", Relative, K::Branch, 2),
    opp("EOR", IndirectY, K::Read, 5),
    un("JAM", Implied, K::Jam, 2),
    un("SRE", IndirectY, K::Rmw, 8),
    un("NOP", ZeroPageX, K::Read, 4),
    op("EOR", ZeroPageX, K::Read, 4),
    op("LSR", ZeroPageX, K::Rmw, 6),
    un("SRE", ZeroPageX, K::Rmw, 6),
    op("CLI", Implied, K::Implied, 2),
    opp("EOR", AbsoluteY, K::Read, 4),
    un("NOP", Implied, K::Implied, 2),
    un("SRE", AbsoluteY, K::Rmw, 7),
    unp("NOP", AbsoluteX, K::Read, 4),
    opp("EOR", AbsoluteX, K::Read, 4),
    op("LSR", AbsoluteX, K::Rmw, 7),
    un("SRE", AbsoluteX, K::Rmw, 7),
    // 0x60-0x6F
    op("RTS", Implied, K::Rts, 6),
    op("ADC", IndirectX, K::Read, 6),
    un("JAM", Implied, K::Jam, 2),
    un("RRA", IndirectX, K::Rmw, 8),
    un("NOP", ZeroPage, K::Read, 3),
    op("ADC", ZeroPage, K::Read, 3),
    op("ROR", ZeroPage, K::Rmw, 5),
    un("RRA", ZeroPage, K::Rmw, 5),
    op("PLA", Implied, K::Pull, 4),
    op("ADC", Immediate, K::Read, 2),
    op("ROR", Accumulator, K::Accumulator, 2),
    un("ARR", Immediate, K::Read, 2),
    op("JMP", Indirect, K::JmpInd, 5),
    op("ADC", Absolute, K::Read, 4),
    op("ROR", Absolute, K::Rmw, 6),
    un("RRA", Absolute, K::Rmw, 6),
    // 0x70-0x7F
    op("BVS", Relative, K::Branch, 2),
    opp("ADC", IndirectY, K::Read, 5),
    un("JAM", Implied, K::Jam, 2),
    un("RRA", IndirectY, K::Rmw, 8),
    un("NOP", ZeroPageX, K::Read, 4),
    op("ADC", ZeroPageX, K::Read, 4),
    op("ROR", ZeroPageX, K::Rmw, 6),
    un("RRA", ZeroPageX, K::Rmw, 6),
    op("SEI", Implied, K::Implied, 2),
    opp("ADC", AbsoluteY, K::Read, 4),
    un("NOP", Implied, K::Implied, 2),
    un("RRA", AbsoluteY, K::Rmw, 7),
    unp("NOP", AbsoluteX, K::Read, 4),
    opp("ADC", AbsoluteX, K::Read, 4),
    op("ROR", AbsoluteX, K::Rmw, 7),
    un("RRA", AbsoluteX, K::Rmw, 7),
    // 0x80-0x8F
    un("NOP", Immediate, K::Read, 2),
    op("STA", IndirectX, K::Write, 6),
    un("NOP", Immediate, K::Read, 2),
    un("SAX", IndirectX, K::Write, 6),
    op("STY", ZeroPage, K::Write, 3),
    op("STA", ZeroPage, K::Write, 3),
    op("STX", ZeroPage, K::Write, 3),
    un("SAX", ZeroPage, K::Write, 3),
    op("DEY", Implied, K::Implied, 2),
    un("NOP", Immediate, K::Read, 2),
    op("TXA", Implied, K::Implied, 2),
    un("XAA", Immediate, K::Read, 2),
    op("STY", Absolute, K::Write, 4),
    op("STA", Absolute, K::Write, 4),
    op("STX", Absolute, K::Write, 4),
    un("SAX", Absolute, K::Write, 4),
    // 0x90-0x9F
    op("BCC", Relative, K::Branch, 2),
    op("STA", IndirectY, K::Write, 6),
    un("JAM", Implied, K::Jam, 2),
    un("SHA", IndirectY, K::Write, 6),
    op("STY", ZeroPageX, K::Write, 4),
    op("STA", ZeroPageX, K::Write, 4),
    op("STX", ZeroPageY, K::Write, 4),
    un("SAX", ZeroPageY, K::Write, 4),
    op("TYA", Implied, K::Implied, 2),
    op("STA", AbsoluteY, K::Write, 5),
    op("TXS", Implied, K::Implied, 2),
    un("TAS", AbsoluteY, K::Write, 5),
    un("SHY", AbsoluteX, K::Write, 5),
    op("STA", AbsoluteX, K::Write, 5),
    un("SHX", AbsoluteY, K::Write, 5),
    un("SHA", AbsoluteY, K::Write, 5),
    // 0xA0-0xAF
    op("LDY", Immediate, K::Read, 2),
    op("LDA", IndirectX, K::Read, 6),
    op("LDX", Immediate, K::Read, 2),
    un("LAX", IndirectX, K::Read, 6),
    op("LDY", ZeroPage, K::Read, 3),
    op("LDA", ZeroPage, K::Read, 3),
    op("LDX", ZeroPage, K::Read, 3),
    un("LAX", ZeroPage, K::Read, 3),
    op("TAY", Implied, K::Implied, 2),
    op("LDA", Immediate, K::Read, 2),
    op("TAX", Implied, K::Implied, 2),
    un("LXA", Immediate, K::Read, 2),
    op("LDY", Absolute, K::Read, 4),
    op("LDA", Absolute, K::Read, 4),
    op("LDX", Absolute, K::Read, 4),
    un("LAX", Absolute, K::Read, 4),
    // 0xB0-0xBF
    op("BCS", Relative, K::Branch, 2),
    opp("LDA", IndirectY, K::Read, 5),
    un("JAM", Implied, K::Jam, 2),
    unp("LAX", IndirectY, K::Read, 5),
    op("LDY", ZeroPageX, K::Read, 4),
    op("LDA", ZeroPageX, K::Read, 4),
    op("LDX", ZeroPageY, K::Read, 4),
    un("LAX", ZeroPageY, K::Read, 4),
    op("CLV", Implied, K::Implied, 2),
    opp("LDA", AbsoluteY, K::Read, 4),
    op("TSX", Implied, K::Implied, 2),
    unp("LAS", AbsoluteY, K::Read, 4),
    opp("LDY", AbsoluteX, K::Read, 4),
    opp("LDA", AbsoluteX, K::Read, 4),
    opp("LDX", AbsoluteY, K::Read, 4),
    unp("LAX", AbsoluteY, K::Read, 4),
    // 0xC0-0xCF
    op("CPY", Immediate, K::Read, 2),
    op("CMP", IndirectX, K::Read, 6),
    un("NOP", Immediate, K::Read, 2),
    un("DCP", IndirectX, K::Rmw, 8),
    op("CPY", ZeroPage, K::Read, 3),
    op("CMP", ZeroPage, K::Read, 3),
    op("DEC", ZeroPage, K::Rmw, 5),
    un("DCP", ZeroPage, K::Rmw, 5),
    op("INY", Implied, K::Implied, 2),
    op("CMP", Immediate, K::Read, 2),
    op("DEX", Implied, K::Implied, 2),
    un("AXS", Immediate, K::Read, 2),
    op("CPY", Absolute, K::Read, 4),
    op("CMP", Absolute, K::Read, 4),
    op("DEC", Absolute, K::Rmw, 6),
    un("DCP", Absolute, K::Rmw, 6),
    // 0xD0-0xDF
    op("BNE", Relative, K::Branch, 2),
    opp("CMP", IndirectY, K::Read, 5),
    un("JAM", Implied, K::Jam, 2),
    un("DCP", IndirectY, K::Rmw, 8),
    un("NOP", ZeroPageX, K::Read, 4),
    op("CMP", ZeroPageX, K::Read, 4),
    op("DEC", ZeroPageX, K::Rmw, 6),
    un("DCP", ZeroPageX, K::Rmw, 6),
    op("CLD", Implied, K::Implied, 2),
    opp("CMP", AbsoluteY, K::Read, 4),
    un("NOP", Implied, K::Implied, 2),
    un("DCP", AbsoluteY, K::Rmw, 7),
    unp("NOP", AbsoluteX, K::Read, 4),
    opp("CMP", AbsoluteX, K::Read, 4),
    op("DEC", AbsoluteX, K::Rmw, 7),
    un("DCP", AbsoluteX, K::Rmw, 7),
    // 0xE0-0xEF
    op("CPX", Immediate, K::Read, 2),
    op("SBC", IndirectX, K::Read, 6),
    un("NOP", Immediate, K::Read, 2),
    un("ISC", IndirectX, K::Rmw, 8),
    op("CPX", ZeroPage, K::Read, 3),
    op("SBC", ZeroPage, K::Read, 3),
    op("INC", ZeroPage, K::Rmw, 5),
    un("ISC", ZeroPage, K::Rmw, 5),
    op("INX", Implied, K::Implied, 2),
    op("SBC", Immediate, K::Read, 2),
    op("NOP", Implied, K::Implied, 2),
    un("SBC", Immediate, K::Read, 2),
    op("CPX", Absolute, K::Read, 4),
    op("SBC", Absolute, K::Read, 4),
    op("INC", Absolute, K::Rmw, 6),
    un("ISC", Absolute, K::Rmw, 6),
    // 0xF0-0xFF
    op("BEQ", Relative, K::Branch, 2),
    opp("SBC", IndirectY, K::Read, 5),
    un("JAM", Implied, K::Jam, 2),
    un("ISC", IndirectY, K::Rmw, 8),
    un("NOP", ZeroPageX, K::Read, 4),
    op("SBC", ZeroPageX, K::Read, 4),
    op("INC", ZeroPageX, K::Rmw, 6),
    un("ISC", ZeroPageX, K::Rmw, 6),
    op("SED", Implied, K::Implied, 2),
    opp("SBC", AbsoluteY, K::Read, 4),
    un("NOP", Implied, K::Implied, 2),
    un("ISC", AbsoluteY, K::Rmw, 7),
    unp("NOP", AbsoluteX, K::Read, 4),
    opp("SBC", AbsoluteX, K::Read, 4),
    op("INC", AbsoluteX, K::Rmw, 7),
    un("ISC", AbsoluteX, K::Rmw, 7),
    ]
};
