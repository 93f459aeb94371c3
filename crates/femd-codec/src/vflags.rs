//! Verbose-dump category bitmask for per-frame decoded output.

use bitflags::bitflags;

bitflags! {
    /// Selects which categories of decoded content a frame dump prints.
    ///
    /// `ALL` alone enables every category regardless of the other bits
    /// (mirrors the card firmware's own dump tool).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VerboseFlags: u32 {
        const ALL                = 0x0000_0001;
        const SIZE               = 0x0000_0002;
        const HIT_CH             = 0x0000_0004;
        const HIT_CNT            = 0x0000_0008;
        const CHAN_DATA          = 0x0000_0010;
        const HISTO_BINS         = 0x0000_0020;
        const ASCII              = 0x0000_0040;
        const FRAME_BOUNDARY     = 0x0000_0080;
        const EVENT_BOUNDARY     = 0x0000_0100;
        const NULL_WORD          = 0x0000_0200;
        const HISTO_STAT         = 0x0000_0400;
        const LISTS              = 0x0000_0800;
        const LAST_CELL_READ_0   = 0x0000_1000;
        const LAST_CELL_READ_1   = 0x0000_2000;
        const LAST_CELL_READ_2   = 0x0000_4000;
        const LAST_CELL_READ_3   = 0x0000_8000;
        const BUILT_EVENT_BOUNDARY = 0x0001_0000;
    }
}

impl VerboseFlags {
    /// `ALL` forces every category on, independent of which other bits are set.
    pub fn wants(&self, category: VerboseFlags) -> bool {
        self.contains(VerboseFlags::ALL) || self.contains(category)
    }

    pub fn last_cell_read_for_chip(chip: u8) -> VerboseFlags {
        match chip & 0x03 {
            0 => VerboseFlags::LAST_CELL_READ_0,
            1 => VerboseFlags::LAST_CELL_READ_1,
            2 => VerboseFlags::LAST_CELL_READ_2,
            _ => VerboseFlags::LAST_CELL_READ_3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_forces_every_category() {
        let f = VerboseFlags::ALL;
        assert!(f.wants(VerboseFlags::ASCII));
        assert!(f.wants(VerboseFlags::HISTO_STAT));
    }

    #[test]
    fn without_all_only_set_bits_are_wanted() {
        let f = VerboseFlags::ASCII | VerboseFlags::SIZE;
        assert!(f.wants(VerboseFlags::ASCII));
        assert!(!f.wants(VerboseFlags::HIT_CH));
    }

    #[test]
    fn last_cell_read_maps_chip_to_bit() {
        assert_eq!(VerboseFlags::last_cell_read_for_chip(0), VerboseFlags::LAST_CELL_READ_0);
        assert_eq!(VerboseFlags::last_cell_read_for_chip(3), VerboseFlags::LAST_CELL_READ_3);
        assert_eq!(VerboseFlags::last_cell_read_for_chip(7), VerboseFlags::LAST_CELL_READ_3);
    }
}
