//! Micro-sequencer states and instruction classification.
//!
//! Every instruction is a fixed walk through [`MicroState`] values, one per
//! CPU cycle, with at most one bus access per state. The walk is selected by
//! the opcode's addressing mode and [`OpKind`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One cycle of the CPU micro-sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MicroState {
    /// Fetch opcode at PC (cycle 1 of every instruction). Pending
    /// interrupts are serviced here instead, turning the fetch into the
    /// first dummy cycle of the interrupt sequence.
    #[default]
    FetchOpcode,

    /// Fetch operand low byte at PC.
    FetchOperandLo,
    /// Fetch operand high byte at PC.
    FetchOperandHi,

    /// Zero-page indexing cycle: dummy read at the unindexed zero-page
    /// address while the index is added (wrapping in page zero).
    IndexZeroPage,
    /// Fetch pointer low byte (indirect modes).
    PointerLo,
    /// Fetch pointer high byte (indirect modes; JMP indirect applies the
    /// same-page wrap bug here).
    PointerHi,
    /// Page-cross fix-up: dummy read at `hi<<8 | (lo+index) & $FF` before
    /// the corrected access.
    FixPage,

    /// Final read of the operand; the execute function runs in this cycle.
    ReadOperand,
    /// Compute the store value and write it.
    WriteResult,
    /// RMW cycle 1: read the original byte.
    RmwRead,
    /// RMW cycle 2: write the unmodified byte back. Visible to
    /// memory-mapped registers with write-triggered side effects.
    RmwWriteBack,
    /// RMW cycle 3: write the modified byte.
    RmwWriteNew,

    /// Implied/accumulator execute cycle: dummy read at PC, then the
    /// register-only operation.
    ImpliedExec,

    /// Branch taken: dummy read at PC, then PC gains the offset.
    BranchTaken,
    /// Branch crossed a page: dummy read at the stale-page address.
    BranchFix,

    /// PHA/PHP cycle 2: dummy read at PC.
    StackDummy,
    /// Push A or P to the stack.
    PushValue,
    /// Pull sequence spin-up: dummy stack read, SP pre-increment.
    PullDummy,
    /// Pull A or P from the stack.
    PullValue,
    /// RTI: pull status.
    PullStatus,
    /// RTS/RTI: pull PC low byte.
    PullPcl,
    /// RTS/RTI: pull PC high byte.
    PullPch,
    /// RTS final cycle: dummy read at the pulled PC, then PC+1.
    RtsIncrement,

    /// JSR cycle 3: internal stack cycle.
    JsrInternal,
    /// JSR: push PC high (PC points at the last operand byte).
    JsrPushPch,
    /// JSR: push PC low.
    JsrPushPcl,
    /// JSR final cycle: fetch the target high byte and jump.
    JsrJump,

    /// BRK cycle 2: read and discard the padding byte, PC+1.
    BrkPadding,
    /// Hardware interrupt cycle 2: dummy read at PC.
    IntDummy,
    /// Interrupt sequence: push PC high.
    IntPushPch,
    /// Interrupt sequence: push PC low.
    IntPushPcl,
    /// Interrupt sequence: push status (B=0 for hardware, 1 for BRK), set
    /// I, and settle the vector. A pending NMI hijacks the vector here.
    IntPushStatus,
    /// Fetch interrupt vector low byte.
    IntVectorLo,
    /// Fetch interrupt vector high byte and jump.
    IntVectorHi,
}

/// Execution pattern of an opcode. Together with the addressing mode this
/// fully determines the cycle walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OpKind {
    /// Load/ALU reads (LDA, ADC, CMP, BIT, LAX, ANC, ...). The final bus
    /// read and the register update share a cycle; indexed reads take the
    /// page-cross shortcut.
    #[default]
    Read,
    /// Stores (STA, STX, STY, SAX, SHA, SHX, SHY, TAS). Always pay the
    /// fix-up cycle on indexed modes.
    Write,
    /// Read-modify-write (ASL, INC, SLO, DCP, ...). Read, write back the
    /// original, write the result.
    Rmw,
    /// Register-only single-byte instructions (TAX, CLC, NOP, ...).
    Implied,
    /// Accumulator shifts/rotates (ASL A, ROR A, ...).
    Accumulator,
    /// Conditional branches.
    Branch,
    /// JMP absolute.
    JmpAbs,
    /// JMP indirect.
    JmpInd,
    /// JSR.
    Jsr,
    /// RTS.
    Rts,
    /// RTI.
    Rti,
    /// PHA/PHP.
    Push,
    /// PLA/PLP.
    Pull,
    /// BRK: software interrupt through the IRQ vector with B=1.
    Brk,
    /// JAM/KIL: halts the CPU until reset.
    Jam,
}

impl MicroState {
    /// True when this state performs a bus read.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(
            self,
            Self::FetchOpcode
                | Self::FetchOperandLo
                | Self::FetchOperandHi
                | Self::IndexZeroPage
                | Self::PointerLo
                | Self::PointerHi
                | Self::FixPage
                | Self::ReadOperand
                | Self::RmwRead
                | Self::ImpliedExec
                | Self::BranchTaken
                | Self::BranchFix
                | Self::StackDummy
                | Self::PullDummy
                | Self::PullValue
                | Self::PullStatus
                | Self::PullPcl
                | Self::PullPch
                | Self::RtsIncrement
                | Self::JsrInternal
                | Self::JsrJump
                | Self::BrkPadding
                | Self::IntDummy
                | Self::IntVectorLo
                | Self::IntVectorHi
        )
    }

    /// True when this state performs a bus write.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            Self::WriteResult
                | Self::RmwWriteBack
                | Self::RmwWriteNew
                | Self::PushValue
                | Self::JsrPushPch
                | Self::JsrPushPcl
                | Self::IntPushPch
                | Self::IntPushPcl
                | Self::IntPushStatus
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_is_read_or_write_exclusive() {
        // No state may both read and write; one bus access per cycle.
        let states = [
            MicroState::FetchOpcode,
            MicroState::ReadOperand,
            MicroState::WriteResult,
            MicroState::RmwRead,
            MicroState::RmwWriteBack,
            MicroState::RmwWriteNew,
            MicroState::PushValue,
            MicroState::IntPushStatus,
            MicroState::IntVectorHi,
        ];
        for s in states {
            assert!(!(s.is_read() && s.is_write()), "{s:?} reads and writes");
        }
    }
}
