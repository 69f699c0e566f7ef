//! Register map and single-byte register layouts (generation 0x0d).
#![allow(unused_braces)]
use modular_bitfield_msb::prelude::*;

/// Value read back from [REG_VERSION]
pub const VERSION: u8 = 0x0d;

pub const REG_VERSION: u8 = 0x00;
pub const REG_SETTING: u8 = 0x02;
pub const REG_IDLE_WAIT_LEN: u8 = 0x04;
pub const REG_TX_PERMIT_LEN_L: u8 = 0x05;
pub const REG_TX_PERMIT_LEN_H: u8 = 0x06;
pub const REG_MAX_IDLE_LEN_L: u8 = 0x07;
pub const REG_MAX_IDLE_LEN_H: u8 = 0x08;
pub const REG_TX_PRE_LEN: u8 = 0x09;
pub const REG_FILTER: u8 = 0x0b;
pub const REG_DIV_LS_L: u8 = 0x0c;
pub const REG_DIV_LS_H: u8 = 0x0d;
pub const REG_DIV_HS_L: u8 = 0x0e;
pub const REG_DIV_HS_H: u8 = 0x0f;
pub const REG_INT_FLAG: u8 = 0x10;
pub const REG_INT_MASK: u8 = 0x11;
pub const REG_RX: u8 = 0x14;
pub const REG_TX: u8 = 0x15;
pub const REG_RX_CTRL: u8 = 0x16;
pub const REG_TX_CTRL: u8 = 0x17;
pub const REG_RX_ADDR: u8 = 0x18;
pub const REG_RX_PAGE_FLAG: u8 = 0x19;
pub const REG_FILTER1: u8 = 0x1a;
pub const REG_FILTER2: u8 = 0x1b;

/// SETTING register (0x02)
#[bitfield]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub struct Setting {
    #[skip]
    __: B1,
    /// Receive while transmitting on a separate channel, no collision detection
    pub full_duplex: bool,
    /// Resynchronize the bus clock on received break conditions
    pub break_sync: bool,
    /// Wait for the transmit permit window and arbitrate bit-wise
    pub arbitrate: bool,
    /// Refuse overwriting unread pages and keep broken frames
    pub no_drop: bool,
    /// Trailer bytes are supplied and consumed by the host
    pub user_crc: bool,
    /// Invert the transmit line
    pub tx_invert: bool,
    /// Drive the transmit line push-pull instead of open-drain
    pub tx_push_pull: bool,
}

/// INT_FLAG (0x10) and INT_MASK (0x11) registers
#[bitfield]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub struct IntFlag {
    /// Transmit failed (staging overflow)
    pub tx_error: bool,
    /// Arbitration lost, frame collided
    pub tx_cd: bool,
    /// Transmit buffer is empty and nothing is pending
    pub tx_buf_clean: bool,
    /// A corrupted frame was seen on the wire
    pub rx_error: bool,
    /// A received frame was dropped or refused
    pub rx_lost: bool,
    /// A break condition was received
    pub rx_break: bool,
    /// At least one unread page in the receive ring
    pub rx_pending: bool,
    /// The bus has been idle past the wait threshold
    pub bus_idle: bool,
}

/// RX_CTRL register (0x16), write-only command bits
#[bitfield]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub struct RxCtrl {
    #[skip]
    __: B2,
    pub clr_break: bool,
    /// Reset the entire receive ring
    pub rst: bool,
    pub clr_error: bool,
    pub clr_lost: bool,
    /// Release the current page and advance to the next
    pub clr_pending: bool,
    /// Rewind the in-page read pointer
    pub rst_pointer: bool,
}

/// TX_CTRL register (0x17), write-only command bits
#[bitfield]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub struct TxCtrl {
    #[skip]
    __: B2,
    pub send_break: bool,
    /// Drop the pending frame and clear the staging buffer
    pub abort: bool,
    pub clr_error: bool,
    pub clr_cd: bool,
    /// Latch the staged bytes as the pending frame
    pub start: bool,
    /// Rewind the staging write pointer
    pub rst_pointer: bool,
}
