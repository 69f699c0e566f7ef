//! Controller configuration.
use crate::registers::Setting;
use serde::{Deserialize, Serialize};

/// Full controller configuration as written by [configure](crate::device::Cdctl::configure).
///
/// Timing lengths are in bit times of the low-speed rate. Baud rate divisors
/// follow `rate = sys_clock / (divisor + 1)`, so the defaults give 1 Mbps
/// low-speed and 10 Mbps high-speed on a 40 MHz clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Drive the transmit line push-pull instead of open-drain
    pub tx_push_pull: bool,
    /// Invert the transmit line
    pub tx_invert: bool,
    /// Trailer bytes are supplied and consumed by the host
    pub user_crc: bool,
    /// Refuse overwriting unread pages and keep broken frames
    pub no_drop: bool,
    /// Wait for the transmit permit window and arbitrate bit-wise
    pub arbitrate: bool,
    /// Resynchronize the bus clock on received break conditions
    pub break_sync: bool,
    /// Separate receive and transmit channels, no collision detection
    pub full_duplex: bool,

    /// Idle bit times before the bus counts as free
    pub idle_wait_len: u8,
    /// Additional bit times before this node may start transmitting
    pub tx_permit_len: u16,
    /// Upper bound on the transmit wait, 0 disables the cap
    pub max_idle_len: u16,
    /// Extra high bit times driven ahead of each frame
    pub tx_pre_len: u8,

    /// Low-speed baud rate divisor
    pub div_ls: u16,
    /// High-speed baud rate divisor
    pub div_hs: u16,

    /// Local address matched against frame destinations
    pub filter: u8,
    /// Multicast slots, 0xff marks a slot as unused
    pub multicast: [u8; 2],
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            tx_push_pull: false,
            tx_invert: false,
            user_crc: false,
            no_drop: false,
            arbitrate: true,
            break_sync: false,
            full_duplex: false,
            idle_wait_len: 10,
            tx_permit_len: 20,
            max_idle_len: 0,
            tx_pre_len: 1,
            div_ls: 39,
            div_hs: 3,
            filter: 0xff,
            multicast: [0xff; 2],
        }
    }
}

impl Configuration {
    /// Encodes the mode bits as the SETTING register byte.
    pub fn setting_register(&self) -> Setting {
        Setting::new()
            .with_tx_push_pull(self.tx_push_pull)
            .with_tx_invert(self.tx_invert)
            .with_user_crc(self.user_crc)
            .with_no_drop(self.no_drop)
            .with_arbitrate(self.arbitrate)
            .with_break_sync(self.break_sync)
            .with_full_duplex(self.full_duplex)
    }

    /// Takes the mode bits from a SETTING register byte.
    pub fn apply_setting_register(&mut self, setting: Setting) {
        self.tx_push_pull = setting.tx_push_pull();
        self.tx_invert = setting.tx_invert();
        self.user_crc = setting.user_crc();
        self.no_drop = setting.no_drop();
        self.arbitrate = setting.arbitrate();
        self.break_sync = setting.break_sync();
        self.full_duplex = setting.full_duplex();
    }
}
