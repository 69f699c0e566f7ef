//! Transmit staging buffer.
use crate::frame::{HEADER_LEN, MAX_PAYLOAD};
use alloc::vec::Vec;

/// Staging area filled byte-by-byte through the TX data port.
///
/// Holds header and payload only, the trailer is appended when the frame
/// goes on the wire. A START command latches the content as the pending
/// frame, RST_POINTER discards it.
#[derive(Debug, Clone, Default)]
pub struct TxBuffer {
    data: Vec<u8>,
}

impl TxBuffer {
    /// Appends one byte, returns false on overflow.
    pub fn write(&mut self, byte: u8) -> bool {
        if self.data.len() >= HEADER_LEN + MAX_PAYLOAD {
            return false;
        }

        self.data.push(byte);
        true
    }

    /// Rewinds the write pointer, dropping all staged bytes.
    pub fn reset_pointer(&mut self) {
        self.data.clear();
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Moves the staged bytes out, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.data)
    }
}
