//! Destination address filtering.
use crate::frame::BROADCAST_ADDRESS;

/// Slot value marking a multicast filter as unused
pub const FILTER_UNUSED: u8 = 0xff;

/// Acceptance filter applied to the destination byte of incoming frames.
///
/// A frame is accepted if its destination matches the local address, the
/// broadcast address 0xff or one of the two multicast slots. An unused
/// multicast slot holds 0xff, which makes it indistinguishable from the
/// broadcast rule, so 0xff is always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFilter {
    local: u8,
    mcast: [u8; 2],
}

impl AddressFilter {
    pub fn new(local: u8) -> Self {
        Self {
            local,
            mcast: [FILTER_UNUSED; 2],
        }
    }

    pub fn local(&self) -> u8 {
        self.local
    }

    pub fn set_local(&mut self, address: u8) {
        self.local = address;
    }

    pub fn multicast(&self, slot: usize) -> u8 {
        self.mcast[slot]
    }

    pub fn set_multicast(&mut self, slot: usize, address: u8) {
        self.mcast[slot] = address;
    }

    /// Returns true if a frame addressed to `destination` is received.
    pub fn accept(&self, destination: u8) -> bool {
        destination == self.local
            || destination == BROADCAST_ADDRESS
            || destination == self.mcast[0]
            || destination == self.mcast[1]
    }
}
