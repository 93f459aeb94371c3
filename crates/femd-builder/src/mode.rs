//! The 4-bit event-builder mode: whether cross-source events are built at
//! all, and which consistency checks run across sources while building.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EbMode: u8 {
        /// Build cross-source events (bit0). Clear = transparent passthrough.
        const ACTIVE = 0b0001;
        /// Reference `ev_ty`/`ev_nb` must match exactly across sources.
        const VERIFY_EVNB = 0b0010;
        /// Reference 48-bit timestamp must match exactly across sources.
        const VERIFY_TS_EXACT = 0b0100;
        /// Reference timestamp may differ by ±1 in the low 32 bits.
        const VERIFY_TS_TOLERANT = 0b1000;
    }
}

impl EbMode {
    pub fn is_active(&self) -> bool {
        self.contains(EbMode::ACTIVE)
    }
}
