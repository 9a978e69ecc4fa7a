//! Sprite output units.
//!
//! Eight shifter pairs with attribute latches and X counters, loaded from
//! secondary OAM during the dot 257-320 fetches. On each visible dot every
//! unit with a zeroed counter exposes its leading pixel; the first opaque
//! one wins, and its priority bit decides front/back against the
//! background.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A sprite pixel candidate for the current dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritePixel {
    /// 2-bit pattern value (non-zero; transparent candidates are skipped).
    pub pattern: u8,
    /// Sprite palette select (0-3; palette RAM row 4 + this).
    pub palette: u8,
    /// True when the sprite draws behind an opaque background pixel.
    pub behind_background: bool,
    /// True when the pixel came from sprite 0.
    pub sprite_zero: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Unit {
    pattern_lo: u8,
    pattern_hi: u8,
    attr: u8,
    x_counter: u8,
}

/// The eight sprite output units for the current scanline.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpriteUnits {
    units: [Unit; 8],
    count: u8,
    sprite_zero_on_line: bool,
}

impl SpriteUnits {
    /// Drop all units ahead of the dot 257-320 reload.
    pub fn begin_line(&mut self, count: u8, sprite_zero_on_line: bool) {
        self.units = [Unit::default(); 8];
        self.count = count.min(8);
        self.sprite_zero_on_line = sprite_zero_on_line;
    }

    /// Install a fetched sprite into a unit. Pattern bytes arrive with
    /// horizontal flip already applied.
    pub fn load(&mut self, slot: usize, pattern_lo: u8, pattern_hi: u8, attr: u8, x: u8) {
        if slot < 8 {
            self.units[slot] = Unit {
                pattern_lo,
                pattern_hi,
                attr,
                x_counter: x,
            };
        }
    }

    /// Advance counters/shifters by one dot. Call after the pixel for the
    /// dot has been sampled.
    pub fn tick(&mut self) {
        for unit in &mut self.units[..usize::from(self.count)] {
            if unit.x_counter > 0 {
                unit.x_counter -= 1;
            } else {
                unit.pattern_lo <<= 1;
                unit.pattern_hi <<= 1;
            }
        }
    }

    /// First opaque pixel among the active units, in slot priority order.
    #[must_use]
    pub fn pixel(&self) -> Option<SpritePixel> {
        for (slot, unit) in self.units[..usize::from(self.count)].iter().enumerate() {
            if unit.x_counter != 0 {
                continue;
            }
            let pattern =
                (u8::from(unit.pattern_hi & 0x80 != 0) << 1) | u8::from(unit.pattern_lo & 0x80 != 0);
            if pattern == 0 {
                continue;
            }
            return Some(SpritePixel {
                pattern,
                palette: unit.attr & 0x03,
                behind_background: unit.attr & 0x20 != 0,
                sprite_zero: slot == 0 && self.sprite_zero_on_line,
            });
        }
        None
    }

    /// Whether sprite 0 occupies slot 0 this scanline.
    #[inline]
    #[must_use]
    pub const fn sprite_zero_on_line(&self) -> bool {
        self.sprite_zero_on_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_delays_activation() {
        let mut units = SpriteUnits::default();
        units.begin_line(1, false);
        units.load(0, 0b1010_0000, 0, 0x00, 2);

        // x=2: inactive for two dots.
        assert!(units.pixel().is_none());
        units.tick();
        assert!(units.pixel().is_none());
        units.tick();
        // Counter reached 0: bit 7 is exposed.
        assert_eq!(units.pixel().unwrap().pattern, 0b01);
        units.tick();
        // Shifted once: next bit is 0 -> transparent.
        assert!(units.pixel().is_none());
    }

    #[test]
    fn slot_priority_first_opaque_wins() {
        let mut units = SpriteUnits::default();
        units.begin_line(2, false);
        units.load(0, 0x00, 0x00, 0x00, 0); // transparent
        units.load(1, 0x80, 0x80, 0x01, 0); // opaque, palette 1
        let pixel = units.pixel().unwrap();
        assert_eq!(pixel.pattern, 0b11);
        assert_eq!(pixel.palette, 1);
        assert!(!pixel.sprite_zero);
    }

    #[test]
    fn sprite_zero_flag_carried() {
        let mut units = SpriteUnits::default();
        units.begin_line(1, true);
        units.load(0, 0x80, 0x00, 0x20, 0);
        let pixel = units.pixel().unwrap();
        assert!(pixel.sprite_zero);
        assert!(pixel.behind_background);
    }
}
