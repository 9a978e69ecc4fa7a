//! CPU status register (P) flags.
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! ```
//!
//! The U bit reads as 1 in the live register. The B bit does not exist in
//! the live register at all; it only appears on copies pushed to the stack
//! (1 for PHP/BRK, 0 for IRQ/NMI) and is discarded again on PLP/RTI.

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// CPU status register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable. Masks IRQ; NMI is unaffected.
        const I = 1 << 2;
        /// Decimal mode. The RP2A03 has no BCD unit, but the flag itself works.
        const D = 1 << 3;
        /// Break. Only meaningful on stack-pushed copies.
        const B = 1 << 4;
        /// Unused. Always 1 in the live register.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative.
        const N = 1 << 7;
    }
}

impl Status {
    /// Status after power-on/reset: I and U set.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Creates a status register in the power-on state.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Updates Z and N from a result value.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// Byte form for pushing to the stack. U is always set; B reflects
    /// whether the push came from software (PHP/BRK) or hardware (IRQ/NMI).
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, software: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if software {
            value |= Self::B.bits();
        }
        value
    }

    /// Rebuilds the live register from a byte pulled off the stack.
    /// Bits 4-5 of the pulled byte are ignored: B is dropped, U forced to 1.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}
