//! Controller engine: register file, receive path and transmit state.
use crate::config::Configuration;
use crate::crc::crc16;
use crate::filter::AddressFilter;
use crate::frame::{FRAME_CAPACITY, HEADER_LEN, TRAILER_LEN};
use crate::registers::*;
use crate::ring::{RxRing, WriteOutcome};
use crate::txbuf::TxBuffer;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};
use log::debug;

/// Receive ring size used by [Node::new]
pub const DEFAULT_RX_PAGES: usize = 8;

/// One bus controller.
///
/// Holds the register file and all buffer state. Registers are reached
/// through [register_read](Self::register_read) and
/// [register_write](Self::register_write), which is the interface every
/// host transport ends up at. Bus traffic and timing are driven externally
/// by [Wire](crate::wire::Wire).
#[derive(Debug)]
pub struct Node {
    config: Configuration,
    int_mask: u8,
    flags: IntFlag,
    ring: RxRing,
    staging: TxBuffer,
    /// Latched frame (header + payload) waiting for its permit window
    pending: Option<Vec<u8>>,
    armed: bool,
    break_requested: bool,
    transmitting: bool,
}

impl Node {
    /// Creates a node with default configuration and the given local address.
    pub fn new(address: u8) -> Self {
        let mut config = Configuration::default();
        config.filter = address;

        Self::with_config(config, DEFAULT_RX_PAGES)
    }

    pub fn with_config(config: Configuration, rx_pages: usize) -> Self {
        let mut node = Self {
            config,
            int_mask: 0,
            flags: IntFlag::new(),
            ring: RxRing::new(rx_pages),
            staging: TxBuffer::default(),
            pending: None,
            armed: false,
            break_requested: false,
            transmitting: false,
        };

        node.refresh_status();
        node
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn address(&self) -> u8 {
        self.config.filter
    }

    fn filter(&self) -> AddressFilter {
        let mut filter = AddressFilter::new(self.config.filter);
        filter.set_multicast(0, self.config.multicast[0]);
        filter.set_multicast(1, self.config.multicast[1]);
        filter
    }

    /// Reads one register. Reading the RX port advances the page pointer.
    pub fn register_read(&mut self, address: u8) -> u8 {
        match address {
            REG_VERSION => VERSION,
            REG_SETTING => self.config.setting_register().into(),
            REG_IDLE_WAIT_LEN => self.config.idle_wait_len,
            REG_TX_PERMIT_LEN_L => self.config.tx_permit_len as u8,
            REG_TX_PERMIT_LEN_H => (self.config.tx_permit_len >> 8) as u8,
            REG_MAX_IDLE_LEN_L => self.config.max_idle_len as u8,
            REG_MAX_IDLE_LEN_H => (self.config.max_idle_len >> 8) as u8,
            REG_TX_PRE_LEN => self.config.tx_pre_len,
            REG_FILTER => self.config.filter,
            REG_DIV_LS_L => self.config.div_ls as u8,
            REG_DIV_LS_H => (self.config.div_ls >> 8) as u8,
            REG_DIV_HS_L => self.config.div_hs as u8,
            REG_DIV_HS_H => (self.config.div_hs >> 8) as u8,
            REG_INT_FLAG => {
                self.refresh_status();
                self.flags.into()
            }
            REG_INT_MASK => self.int_mask,
            REG_RX => self.ring.read_byte(),
            REG_RX_CTRL => 0x0,
            REG_TX_CTRL => 0x0,
            REG_RX_ADDR => self.ring.read_page_index() as u8,
            REG_RX_PAGE_FLAG => self.ring.dirty_bitmap() as u8,
            REG_FILTER1 => self.config.multicast[0],
            REG_FILTER2 => self.config.multicast[1],
            _ => 0x0,
        }
    }

    /// Writes one register. Writing the TX port appends to the staging buffer.
    pub fn register_write(&mut self, address: u8, value: u8) {
        match address {
            REG_SETTING => self.config.apply_setting_register(Setting::from(value)),
            REG_IDLE_WAIT_LEN => self.config.idle_wait_len = value,
            REG_TX_PERMIT_LEN_L => {
                self.config.tx_permit_len = (self.config.tx_permit_len & 0xff00) | value as u16
            }
            REG_TX_PERMIT_LEN_H => {
                self.config.tx_permit_len = (self.config.tx_permit_len & 0x00ff) | ((value as u16) << 8)
            }
            REG_MAX_IDLE_LEN_L => {
                self.config.max_idle_len = (self.config.max_idle_len & 0xff00) | value as u16
            }
            REG_MAX_IDLE_LEN_H => {
                self.config.max_idle_len = (self.config.max_idle_len & 0x00ff) | ((value as u16) << 8)
            }
            REG_TX_PRE_LEN => self.config.tx_pre_len = value,
            REG_FILTER => self.config.filter = value,
            REG_DIV_LS_L => self.config.div_ls = (self.config.div_ls & 0xff00) | value as u16,
            REG_DIV_LS_H => self.config.div_ls = (self.config.div_ls & 0x00ff) | ((value as u16) << 8),
            REG_DIV_HS_L => self.config.div_hs = (self.config.div_hs & 0xff00) | value as u16,
            REG_DIV_HS_H => self.config.div_hs = (self.config.div_hs & 0x00ff) | ((value as u16) << 8),
            REG_INT_MASK => self.int_mask = value,
            REG_TX => {
                if !self.staging.write(value) {
                    debug!("Staging buffer overflow");
                    self.flags.set_tx_error(true);
                }
            }
            REG_RX_CTRL => self.rx_control(RxCtrl::from(value)),
            REG_TX_CTRL => self.tx_control(TxCtrl::from(value)),
            REG_FILTER1 => self.config.multicast[0] = value,
            REG_FILTER2 => self.config.multicast[1] = value,
            _ => {}
        }
    }

    fn rx_control(&mut self, ctrl: RxCtrl) {
        if ctrl.rst() {
            self.ring.reset();
            self.flags.set_rx_lost(false);
            self.flags.set_rx_error(false);
            self.flags.set_rx_break(false);
        }
        if ctrl.clr_pending() {
            self.ring.clear_pending();
        }
        if ctrl.rst_pointer() {
            self.ring.reset_pointer();
        }
        if ctrl.clr_lost() {
            self.flags.set_rx_lost(false);
        }
        if ctrl.clr_error() {
            self.flags.set_rx_error(false);
        }
        if ctrl.clr_break() {
            self.flags.set_rx_break(false);
        }

        self.refresh_status();
    }

    fn tx_control(&mut self, ctrl: TxCtrl) {
        if ctrl.abort() {
            self.pending = None;
            self.staging.reset_pointer();
            self.armed = false;
            self.transmitting = false;
        }
        if ctrl.start() {
            if !self.staging.is_empty() {
                self.pending = Some(self.staging.take());
                self.armed = true;
            } else if self.pending.is_some() {
                // Frame kept after a lost arbitration, re-arm it
                self.armed = true;
            } else {
                debug!("Start with nothing to send");
                self.flags.set_tx_error(true);
            }
        }
        if ctrl.rst_pointer() {
            self.staging.reset_pointer();
        }
        if ctrl.clr_cd() {
            self.flags.set_tx_cd(false);
        }
        if ctrl.clr_error() {
            self.flags.set_tx_error(false);
        }
        if ctrl.send_break() {
            self.break_requested = true;
        }

        self.refresh_status();
    }

    /// Runs the receive path on one raw wire image.
    pub fn receive_frame(&mut self, raw: &[u8]) {
        if raw.len() < HEADER_LEN + TRAILER_LEN || raw.len() > FRAME_CAPACITY {
            debug!("Malformed frame of {} bytes", raw.len());
            self.flags.set_rx_error(true);
            return;
        }

        if !self.filter().accept(raw[1]) {
            return;
        }

        let mut broken = false;
        if !self.config.user_crc {
            let expected = crc16(&raw[..raw.len() - TRAILER_LEN]);
            let actual = LittleEndian::read_u16(&raw[raw.len() - TRAILER_LEN..]);

            if expected != actual {
                debug!("Broken frame from 0x{:02x}", raw[0]);
                self.flags.set_rx_error(true);
                broken = true;
            }
        }

        // Broken frames are normally discarded, no-drop keeps them for
        // host-side inspection.
        if !broken || self.config.no_drop {
            match self.ring.write(raw, self.config.no_drop) {
                WriteOutcome::Stored => {}
                WriteOutcome::Overwrote | WriteOutcome::Refused => self.flags.set_rx_lost(true),
            }
        }

        self.refresh_status();
    }

    /// Registers a break condition seen on the wire.
    pub fn receive_break(&mut self) {
        self.flags.set_rx_break(true);
    }

    /// Idle bit times this node waits for before it may transmit.
    pub fn permit_threshold(&self) -> u32 {
        let mut threshold = self.config.idle_wait_len as u32;

        if (self.config.arbitrate || self.config.break_sync) && !self.config.full_duplex {
            threshold += self.config.tx_permit_len as u32;
        }

        if self.config.max_idle_len > 0 {
            threshold = threshold.min(self.config.max_idle_len as u32);
        }

        threshold
    }

    pub fn wants_tx(&self) -> bool {
        self.armed && self.pending.is_some()
    }

    pub fn wants_break(&self) -> bool {
        self.break_requested
    }

    pub fn is_transmitting(&self) -> bool {
        self.transmitting
    }

    /// Arbitration priority of the pending frame. Bits go out LSB first and
    /// low bits are dominant, so the reversed source byte orders winners.
    pub fn arbitration_key(&self) -> u8 {
        match &self.pending {
            Some(frame) => frame[0].reverse_bits(),
            None => u8::MAX,
        }
    }

    /// Takes the wire image of the pending frame and marks the node busy.
    pub fn begin_tx(&mut self) -> Vec<u8> {
        let mut raw = match self.pending.clone() {
            Some(frame) => frame,
            None => {
                debug!("Transmission started without a pending frame");
                return Vec::new();
            }
        };

        if !self.config.user_crc {
            let mut trailer = [0x0u8; TRAILER_LEN];
            LittleEndian::write_u16(&mut trailer, crc16(&raw));
            raw.extend_from_slice(&trailer);
        }

        self.transmitting = true;
        raw
    }

    /// Frame left the wire completely.
    pub fn complete_tx(&mut self) {
        self.pending = None;
        self.armed = false;
        self.transmitting = false;
        self.refresh_status();
    }

    /// Break burst left the wire completely.
    pub fn complete_break(&mut self) {
        self.break_requested = false;
        self.transmitting = false;
    }

    pub fn begin_break(&mut self) {
        self.transmitting = true;
    }

    /// Another node won the permit window. The frame stays armed and retries
    /// in arbitration mode, otherwise the host has to restart it.
    pub fn lose_arbitration(&mut self) {
        if self.config.full_duplex {
            return;
        }

        self.flags.set_tx_cd(true);

        if !(self.config.arbitrate || self.config.break_sync) {
            self.armed = false;
        }
    }

    pub fn set_bus_idle(&mut self, idle: bool) {
        self.flags.set_bus_idle(idle);
    }

    fn refresh_status(&mut self) {
        self.flags.set_rx_pending(self.ring.pending());
        self.flags
            .set_tx_buf_clean(self.pending.is_none() && self.staging.is_empty());
    }

    /// Current interrupt flags.
    pub fn flags(&mut self) -> IntFlag {
        self.refresh_status();
        self.flags
    }

    /// Level of the interrupt line (flags gated by the mask).
    pub fn irq(&mut self) -> bool {
        u8::from(self.flags()) & self.int_mask != 0
    }
}
