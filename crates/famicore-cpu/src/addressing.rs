//! 6502 addressing modes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Addressing modes for 6502 instructions.
///
/// The dummy-read behavior of the indexed modes depends on the instruction
/// kind (reads take the page-cross shortcut, writes and RMW never do), so a
/// single mode value covers both; the sequencer consults [`crate::OpKind`]
/// when deciding whether the fix-up cycle is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AddrMode {
    /// No operand; the operation is implied (CLC, INX, ...).
    Implied,
    /// Operates on the accumulator (ASL A, ROR A, ...).
    Accumulator,
    /// 8-bit constant follows the opcode (LDA #$42).
    Immediate,
    /// 8-bit zero-page address (LDA $42).
    ZeroPage,
    /// Zero-page address plus X, wrapping within page zero (LDA $42,X).
    ZeroPageX,
    /// Zero-page address plus Y, wrapping within page zero (LDX $42,Y).
    ZeroPageY,
    /// Signed 8-bit branch offset (BEQ label).
    Relative,
    /// Full 16-bit address (LDA $1234).
    Absolute,
    /// 16-bit address plus X (LDA $1234,X).
    AbsoluteX,
    /// 16-bit address plus Y (LDA $1234,Y).
    AbsoluteY,
    /// JMP only: 16-bit pointer to the target address, with the $xxFF
    /// page-wrap bug on the high-byte fetch.
    Indirect,
    /// ($zp,X): pointer in page zero indexed by X before the fetch.
    IndirectX,
    /// ($zp),Y: pointer fetched from page zero, then indexed by Y.
    IndirectY,
}

impl AddrMode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn operand_size(self) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::Relative
            | Self::IndirectX
            | Self::IndirectY => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_sizes() {
        assert_eq!(AddrMode::Implied.operand_size(), 0);
        assert_eq!(AddrMode::Accumulator.operand_size(), 0);
        assert_eq!(AddrMode::Immediate.operand_size(), 1);
        assert_eq!(AddrMode::ZeroPage.operand_size(), 1);
        assert_eq!(AddrMode::IndirectY.operand_size(), 1);
        assert_eq!(AddrMode::Absolute.operand_size(), 2);
        assert_eq!(AddrMode::Indirect.operand_size(), 2);
    }
}
