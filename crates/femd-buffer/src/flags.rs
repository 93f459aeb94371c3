//! Per-slot ownership flags: busy/free and who is responsible for returning
//! a busy slot.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Returned by the send path once the datagram is on the wire.
    AutoReturned,
    /// Returned only by the explicit consumer (the event builder's recycle
    /// queue), after the buffer has been dispatched downstream.
    UserReturned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,
    Busy(Owner),
}

impl SlotState {
    pub fn is_busy(&self) -> bool {
        matches!(self, SlotState::Busy(_))
    }
}
