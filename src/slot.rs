use crate::consts::{MODE_ACTIVE, MODE_MASK, MODE_WIDE};

/// Selects which pending field of a slot is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingWidth {
    /// 32-bit pending vector.
    #[default]
    Narrow,
    /// 64-bit pending vector.
    Wide,
}

impl PendingWidth {
    pub const fn bits(self) -> u32 {
        match self {
            PendingWidth::Narrow => u32::BITS,
            PendingWidth::Wide => u64::BITS,
        }
    }
}

/// The 2-bit mode of a slot: bit 0 is `active`, bit 1 is the pending width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotMode {
    pub active: bool,
    pub width: PendingWidth,
}

impl SlotMode {
    pub const fn new() -> Self {
        Self {
            active: false,
            width: PendingWidth::Narrow,
        }
    }

    /// Decodes a register value; bits above bit 1 are discarded.
    pub const fn from_bits(bits: u64) -> Self {
        let bits = (bits & MODE_MASK) as u16;
        Self {
            active: bits & MODE_ACTIVE != 0,
            width: if bits & MODE_WIDE != 0 {
                PendingWidth::Wide
            } else {
                PendingWidth::Narrow
            },
        }
    }

    pub const fn bits(self) -> u16 {
        let mut bits = 0;
        if self.active {
            bits |= MODE_ACTIVE;
        }
        if let PendingWidth::Wide = self.width {
            bits |= MODE_WIDE;
        }
        bits
    }
}

/// Error returned when a pending bit does not fit the live pending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitOutOfRange {
    pub bit: u64,
    pub width: PendingWidth,
}

/// One user interrupt request entry (UIRS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slot {
    pub mode: SlotMode,
    pub target_hart: u16,
    pub pending_narrow: u32,
    pub pending_wide: u64,
}

impl Slot {
    pub const fn new() -> Self {
        Self {
            mode: SlotMode::new(),
            target_hart: 0,
            pending_narrow: 0,
            pending_wide: 0,
        }
    }

    /// The live pending field, zero-extended.
    pub fn pending(&self) -> u64 {
        match self.mode.width {
            PendingWidth::Narrow => self.pending_narrow as u64,
            PendingWidth::Wide => self.pending_wide,
        }
    }

    /// Overwrites the live pending field. A narrow slot keeps only the low 32 bits.
    pub fn set_pending(&mut self, val: u64) {
        match self.mode.width {
            PendingWidth::Narrow => self.pending_narrow = val as u32,
            PendingWidth::Wide => self.pending_wide = val,
        }
    }

    pub fn set_pending_bit(&mut self, bit: u64) -> Result<(), BitOutOfRange> {
        let width = self.mode.width;
        if bit >= width.bits() as u64 {
            return Err(BitOutOfRange { bit, width });
        }
        match width {
            PendingWidth::Narrow => self.pending_narrow |= 1 << bit,
            PendingWidth::Wide => self.pending_wide |= 1 << bit,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_bits_cover_all_encodings() {
        for bits in 0..4u64 {
            let mode = SlotMode::from_bits(bits);
            assert_eq!(mode.bits() as u64, bits);
        }
        assert_eq!(
            SlotMode::from_bits(0xfffd),
            SlotMode {
                active: true,
                width: PendingWidth::Narrow
            }
        );
    }

    #[test]
    fn new_slot_is_zeroed() {
        let slot = Slot::new();
        assert_eq!(slot, Slot::default());
        assert!(!slot.mode.active);
        assert_eq!(slot.mode.width, PendingWidth::Narrow);
        assert_eq!(slot.pending(), 0);
    }

    #[test]
    fn pending_follows_width() {
        let mut slot = Slot::new();
        slot.pending_wide = 0xdead_beef_0000_0001;
        slot.set_pending(0x1_0000_0002);
        assert_eq!(slot.pending(), 0x2);
        slot.mode.width = PendingWidth::Wide;
        assert_eq!(slot.pending(), 0xdead_beef_0000_0001);
        slot.mode.width = PendingWidth::Narrow;
        assert_eq!(slot.pending(), 0x2);
    }

    #[test]
    fn set_pending_bit_rejects_out_of_range() {
        let mut slot = Slot::new();
        assert_eq!(
            slot.set_pending_bit(32),
            Err(BitOutOfRange {
                bit: 32,
                width: PendingWidth::Narrow
            })
        );
        assert_eq!(slot.pending_narrow, 0);

        slot.mode.width = PendingWidth::Wide;
        slot.set_pending_bit(63).unwrap();
        assert_eq!(slot.pending_wide, 1 << 63);
        assert!(slot.set_pending_bit(64).is_err());
        assert_eq!(slot.pending_wide, 1 << 63);
    }
}
