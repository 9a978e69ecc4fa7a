//! Instruction execute functions.
//!
//! The micro-sequencer in [`crate::cpu`] walks the addressing cycles; these
//! functions run on the cycle where hardware consumes the operand (reads),
//! produces the store value (writes), or computes the modified byte (RMW).
//! Dispatch is by raw opcode, grouped per mnemonic.

use crate::cpu::Cpu;
use crate::status::Status;

/// Canonical magic constant for the unstable XAA/LXA opcodes. Real chips
/// vary by revision and temperature; $EE is the commonly observed value.
const LXA_MAGIC: u8 = 0xEE;

impl Cpu {
    /// Execute a read-class instruction against the fetched operand.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn exec_read(&mut self, value: u8) {
        match self.opcode {
            // LDA
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => {
                self.a = value;
                self.set_zn(self.a);
            }
            // LDX
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => {
                self.x = value;
                self.set_zn(self.x);
            }
            // LDY
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => {
                self.y = value;
                self.set_zn(self.y);
            }
            // ADC
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.do_adc(value),
            // SBC (0xEB is the unofficial duplicate)
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 | 0xEB => self.do_sbc(value),
            // AND
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => {
                self.a &= value;
                self.set_zn(self.a);
            }
            // ORA
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => {
                self.a |= value;
                self.set_zn(self.a);
            }
            // EOR
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => {
                self.a ^= value;
                self.set_zn(self.a);
            }
            // CMP
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => {
                self.do_compare(self.a, value);
            }
            // CPX
            0xE0 | 0xE4 | 0xEC => self.do_compare(self.x, value),
            // CPY
            0xC0 | 0xC4 | 0xCC => self.do_compare(self.y, value),
            // BIT
            0x24 | 0x2C => {
                self.status.set(Status::Z, (self.a & value) == 0);
                self.status.set(Status::V, value & 0x40 != 0);
                self.status.set(Status::N, value & 0x80 != 0);
            }
            // LAX (unofficial)
            0xA7 | 0xB7 | 0xAF | 0xBF | 0xA3 | 0xB3 => {
                self.a = value;
                self.x = value;
                self.set_zn(value);
            }
            // LAS (unofficial): AND with SP, fan out to A, X, SP
            0xBB => {
                let result = value & self.sp;
                self.a = result;
                self.x = result;
                self.sp = result;
                self.set_zn(result);
            }
            // ANC (unofficial): AND, then copy N into C
            0x0B | 0x2B => {
                self.a &= value;
                self.set_zn(self.a);
                self.status.set(Status::C, self.a & 0x80 != 0);
            }
            // ALR (unofficial): AND then LSR A
            0x4B => {
                self.a &= value;
                self.status.set(Status::C, self.a & 0x01 != 0);
                self.a >>= 1;
                self.set_zn(self.a);
            }
            // ARR (unofficial): AND then ROR A with odd flag rules
            0x6B => {
                self.a &= value;
                let carry_in = self.status.contains(Status::C);
                self.a = (self.a >> 1) | (u8::from(carry_in) << 7);
                self.set_zn(self.a);
                self.status.set(Status::C, self.a & 0x40 != 0);
                self.status
                    .set(Status::V, ((self.a & 0x40) ^ ((self.a & 0x20) << 1)) != 0);
            }
            // XAA (unofficial, unstable)
            0x8B => {
                self.a = (self.a | LXA_MAGIC) & self.x & value;
                self.set_zn(self.a);
            }
            // LXA (unofficial, unstable)
            0xAB => {
                self.a = (self.a | LXA_MAGIC) & value;
                self.x = self.a;
                self.set_zn(self.a);
            }
            // AXS (unofficial): X = (A & X) - value, CMP-style carry
            0xCB => {
                let base = self.a & self.x;
                self.status.set(Status::C, base >= value);
                self.x = base.wrapping_sub(value);
                self.set_zn(self.x);
            }
            // Read-flavored NOPs: the fetch happened, nothing else does
            _ => {}
        }
    }

    /// Compute the value a write-class instruction stores.
    ///
    /// The unstable SHA/SHX/SHY/TAS family stores `register & (H + 1)`
    /// where H is the high byte of the target address; TAS additionally
    /// loads SP with A & X.
    pub(crate) fn store_value(&mut self) -> u8 {
        let high_plus_one = ((self.effective_addr >> 8) as u8).wrapping_add(1);
        match self.opcode {
            // STA
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.a,
            // STX
            0x86 | 0x96 | 0x8E => self.x,
            // STY
            0x84 | 0x94 | 0x8C => self.y,
            // SAX (unofficial)
            0x87 | 0x97 | 0x8F | 0x83 => self.a & self.x,
            // SHA (unofficial)
            0x93 | 0x9F => self.a & self.x & high_plus_one,
            // SHX (unofficial)
            0x9E => self.x & high_plus_one,
            // SHY (unofficial)
            0x9C => self.y & high_plus_one,
            // TAS (unofficial): SP = A & X, store (A & X) & (H + 1)
            0x9B => {
                self.sp = self.a & self.x;
                self.sp & high_plus_one
            }
            _ => 0,
        }
    }

    /// Execute an RMW instruction on the fetched byte, returning the
    /// modified byte to write back.
    pub(crate) fn exec_rmw(&mut self, value: u8) -> u8 {
        match self.opcode {
            // ASL
            0x06 | 0x16 | 0x0E | 0x1E => {
                self.status.set(Status::C, value & 0x80 != 0);
                let result = value << 1;
                self.set_zn(result);
                result
            }
            // LSR
            0x46 | 0x56 | 0x4E | 0x5E => {
                self.status.set(Status::C, value & 0x01 != 0);
                let result = value >> 1;
                self.set_zn(result);
                result
            }
            // ROL
            0x26 | 0x36 | 0x2E | 0x3E => {
                let carry_in = self.status.contains(Status::C);
                self.status.set(Status::C, value & 0x80 != 0);
                let result = (value << 1) | u8::from(carry_in);
                self.set_zn(result);
                result
            }
            // ROR
            0x66 | 0x76 | 0x6E | 0x7E => {
                let carry_in = self.status.contains(Status::C);
                self.status.set(Status::C, value & 0x01 != 0);
                let result = (value >> 1) | (u8::from(carry_in) << 7);
                self.set_zn(result);
                result
            }
            // INC
            0xE6 | 0xF6 | 0xEE | 0xFE => {
                let result = value.wrapping_add(1);
                self.set_zn(result);
                result
            }
            // DEC
            0xC6 | 0xD6 | 0xCE | 0xDE => {
                let result = value.wrapping_sub(1);
                self.set_zn(result);
                result
            }
            // SLO (unofficial): ASL then ORA
            0x07 | 0x17 | 0x0F | 0x1F | 0x1B | 0x03 | 0x13 => {
                self.status.set(Status::C, value & 0x80 != 0);
                let result = value << 1;
                self.a |= result;
                self.set_zn(self.a);
                result
            }
            // RLA (unofficial): ROL then AND
            0x27 | 0x37 | 0x2F | 0x3F | 0x3B | 0x23 | 0x33 => {
                let carry_in = self.status.contains(Status::C);
                self.status.set(Status::C, value & 0x80 != 0);
                let result = (value << 1) | u8::from(carry_in);
                self.a &= result;
                self.set_zn(self.a);
                result
            }
            // SRE (unofficial): LSR then EOR
            0x47 | 0x57 | 0x4F | 0x5F | 0x5B | 0x43 | 0x53 => {
                self.status.set(Status::C, value & 0x01 != 0);
                let result = value >> 1;
                self.a ^= result;
                self.set_zn(self.a);
                result
            }
            // RRA (unofficial): ROR then ADC
            0x67 | 0x77 | 0x6F | 0x7F | 0x7B | 0x63 | 0x73 => {
                let carry_in = self.status.contains(Status::C);
                self.status.set(Status::C, value & 0x01 != 0);
                let result = (value >> 1) | (u8::from(carry_in) << 7);
                self.do_adc(result);
                result
            }
            // DCP (unofficial): DEC then CMP
            0xC7 | 0xD7 | 0xCF | 0xDF | 0xDB | 0xC3 | 0xD3 => {
                let result = value.wrapping_sub(1);
                self.do_compare(self.a, result);
                result
            }
            // ISC (unofficial): INC then SBC
            0xE7 | 0xF7 | 0xEF | 0xFF | 0xFB | 0xE3 | 0xF3 => {
                let result = value.wrapping_add(1);
                self.do_sbc(result);
                result
            }
            _ => value,
        }
    }

    /// Execute a register-only (implied) instruction.
    pub(crate) fn exec_implied(&mut self) {
        match self.opcode {
            // Transfers
            0xAA => {
                self.x = self.a;
                self.set_zn(self.x);
            }
            0xA8 => {
                self.y = self.a;
                self.set_zn(self.y);
            }
            0x8A => {
                self.a = self.x;
                self.set_zn(self.a);
            }
            0x98 => {
                self.a = self.y;
                self.set_zn(self.a);
            }
            0xBA => {
                self.x = self.sp;
                self.set_zn(self.x);
            }
            0x9A => self.sp = self.x,
            // Increment/decrement
            0xE8 => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
            }
            0xC8 => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
            }
            0xCA => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
            }
            0x88 => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
            }
            // Flag operations
            0x18 => self.status.remove(Status::C),
            0x38 => self.status.insert(Status::C),
            0x58 => self.status.remove(Status::I),
            0x78 => self.status.insert(Status::I),
            0xB8 => self.status.remove(Status::V),
            0xD8 => self.status.remove(Status::D),
            0xF8 => self.status.insert(Status::D),
            // NOP, official and unofficial implied variants
            0xEA | 0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => {}
            _ => {}
        }
    }

    /// Execute an accumulator shift/rotate.
    pub(crate) fn exec_accumulator(&mut self) {
        match self.opcode {
            // ASL A
            0x0A => {
                self.status.set(Status::C, self.a & 0x80 != 0);
                self.a <<= 1;
                self.set_zn(self.a);
            }
            // LSR A
            0x4A => {
                self.status.set(Status::C, self.a & 0x01 != 0);
                self.a >>= 1;
                self.set_zn(self.a);
            }
            // ROL A
            0x2A => {
                let carry_in = self.status.contains(Status::C);
                self.status.set(Status::C, self.a & 0x80 != 0);
                self.a = (self.a << 1) | u8::from(carry_in);
                self.set_zn(self.a);
            }
            // ROR A
            0x6A => {
                let carry_in = self.status.contains(Status::C);
                self.status.set(Status::C, self.a & 0x01 != 0);
                self.a = (self.a >> 1) | (u8::from(carry_in) << 7);
                self.set_zn(self.a);
            }
            _ => {}
        }
    }

    /// Branch condition for the current branch opcode.
    pub(crate) fn branch_condition(&self) -> bool {
        match self.opcode {
            0x10 => !self.status.contains(Status::N), // BPL
            0x30 => self.status.contains(Status::N),  // BMI
            0x50 => !self.status.contains(Status::V), // BVC
            0x70 => self.status.contains(Status::V),  // BVS
            0x90 => !self.status.contains(Status::C), // BCC
            0xB0 => self.status.contains(Status::C),  // BCS
            0xD0 => !self.status.contains(Status::Z), // BNE
            0xF0 => self.status.contains(Status::Z),  // BEQ
            _ => false,
        }
    }

    pub(crate) fn do_adc(&mut self, value: u8) {
        let carry = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry;
        let result = sum as u8;
        self.status.set(Status::C, sum > 0xFF);
        self.status.set(
            Status::V,
            (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0,
        );
        self.a = result;
        self.set_zn(self.a);
    }

    pub(crate) fn do_sbc(&mut self, value: u8) {
        // Binary subtraction is addition of the one's complement.
        self.do_adc(!value);
    }

    pub(crate) fn do_compare(&mut self, register: u8, value: u8) {
        self.status.set(Status::C, register >= value);
        self.set_zn(register.wrapping_sub(value));
    }

    pub(crate) fn set_zn(&mut self, value: u8) {
        self.status.set_zn(value);
    }
}
