//! Register-level host driver.
use crate::access::RegisterAccess;
use crate::config::Configuration;
use crate::frame::{Frame, FrameError, HEADER_LEN, TRAILER_LEN};
use crate::registers::*;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use log::debug;

#[derive(Debug, PartialEq)]
pub enum DeviceError<E: Debug> {
    /// Transport failed
    Access(E),
    /// Chip generation does not match this driver
    VersionMismatch { expected: u8, actual: u8 },
    /// No unread page in the receive ring
    RxEmpty,
    /// Received data failed to parse
    Frame(FrameError),
}

impl<E: Debug> From<FrameError> for DeviceError<E> {
    fn from(error: FrameError) -> Self {
        Self::Frame(error)
    }
}

/// Driver for a bus controller behind any [RegisterAccess] transport.
///
/// ```
/// use cdbus::access::RegisterAccess;
/// use cdbus::config::Configuration;
/// use cdbus::device::Cdctl;
///
/// fn setup<B: RegisterAccess>(access: B) -> Result<Cdctl<B>, cdbus::device::DeviceError<B::Error>> {
///     let mut device = Cdctl::new(access);
///     device.check_version()?;
///     device.configure(&Configuration::default())?;
///     Ok(device)
/// }
/// ```
#[derive(Debug)]
pub struct Cdctl<B: RegisterAccess> {
    access: B,
    user_crc: bool,
}

impl<B: RegisterAccess> Cdctl<B> {
    pub fn new(access: B) -> Self {
        Self {
            access,
            user_crc: false,
        }
    }

    /// Reads the raw version register.
    pub fn version(&mut self) -> Result<u8, DeviceError<B::Error>> {
        self.read(REG_VERSION)
    }

    /// Reads the version register and verifies the chip generation.
    pub fn check_version(&mut self) -> Result<u8, DeviceError<B::Error>> {
        let version = self.read(REG_VERSION)?;

        if version != VERSION {
            debug!("Unexpected version 0x{:02x}", version);
            return Err(DeviceError::VersionMismatch {
                expected: VERSION,
                actual: version,
            });
        }

        Ok(version)
    }

    /// Writes the full configuration to the register file.
    pub fn configure(&mut self, config: &Configuration) -> Result<(), DeviceError<B::Error>> {
        self.write(REG_SETTING, config.setting_register().into())?;

        self.write(REG_IDLE_WAIT_LEN, config.idle_wait_len)?;
        self.write(REG_TX_PERMIT_LEN_H, (config.tx_permit_len >> 8) as u8)?;
        self.write(REG_TX_PERMIT_LEN_L, config.tx_permit_len as u8)?;
        self.write(REG_MAX_IDLE_LEN_H, (config.max_idle_len >> 8) as u8)?;
        self.write(REG_MAX_IDLE_LEN_L, config.max_idle_len as u8)?;
        self.write(REG_TX_PRE_LEN, config.tx_pre_len)?;

        self.write(REG_DIV_LS_H, (config.div_ls >> 8) as u8)?;
        self.write(REG_DIV_LS_L, config.div_ls as u8)?;
        self.write(REG_DIV_HS_H, (config.div_hs >> 8) as u8)?;
        self.write(REG_DIV_HS_L, config.div_hs as u8)?;

        self.write(REG_FILTER, config.filter)?;
        self.write(REG_FILTER1, config.multicast[0])?;
        self.write(REG_FILTER2, config.multicast[1])?;

        self.user_crc = config.user_crc;
        Ok(())
    }

    /// Current interrupt flags.
    pub fn flags(&mut self) -> Result<IntFlag, DeviceError<B::Error>> {
        Ok(IntFlag::from(self.read(REG_INT_FLAG)?))
    }

    /// Selects which flags drive the interrupt line.
    pub fn set_interrupt_mask(&mut self, mask: IntFlag) -> Result<(), DeviceError<B::Error>> {
        self.write(REG_INT_MASK, mask.into())
    }

    /// Stages a frame and starts its transmission.
    pub fn transmit(&mut self, frame: &Frame) -> Result<(), DeviceError<B::Error>> {
        self.transmit_raw(&frame.staging_bytes())
    }

    /// Stages raw header + payload bytes and starts their transmission.
    /// In user-CRC mode the caller includes the trailer.
    pub fn transmit_raw(&mut self, data: &[u8]) -> Result<(), DeviceError<B::Error>> {
        debug!("Transmitting {} bytes", data.len());

        self.access
            .write_burst(REG_TX, data)
            .map_err(DeviceError::Access)?;

        self.write(
            REG_TX_CTRL,
            TxCtrl::new().with_start(true).with_rst_pointer(true).into(),
        )
    }

    /// Drops the pending frame and clears the staging buffer.
    pub fn abort(&mut self) -> Result<(), DeviceError<B::Error>> {
        self.write(REG_TX_CTRL, TxCtrl::new().with_abort(true).into())
    }

    /// Alias of [abort](Self::abort): discards the staged frame.
    pub fn drop_frame(&mut self) -> Result<(), DeviceError<B::Error>> {
        self.abort()
    }

    /// Queues a break burst.
    pub fn send_break(&mut self) -> Result<(), DeviceError<B::Error>> {
        self.write(REG_TX_CTRL, TxCtrl::new().with_send_break(true).into())
    }

    /// Acknowledges a lost arbitration.
    pub fn clear_collision(&mut self) -> Result<(), DeviceError<B::Error>> {
        self.write(REG_TX_CTRL, TxCtrl::new().with_clr_cd(true).into())
    }

    /// Clears receive side conditions (lost, error, break).
    pub fn clear_rx(&mut self, ctrl: RxCtrl) -> Result<(), DeviceError<B::Error>> {
        self.write(REG_RX_CTRL, ctrl.into())
    }

    /// True if a received frame was dropped or refused since the last clear.
    pub fn rx_lost(&mut self) -> Result<bool, DeviceError<B::Error>> {
        Ok(self.flags()?.rx_lost())
    }

    /// Acknowledges a lost frame condition.
    pub fn clear_lost(&mut self) -> Result<(), DeviceError<B::Error>> {
        self.clear_rx(RxCtrl::new().with_clr_lost(true))
    }

    /// Reads and parses the next pending frame.
    pub fn receive(&mut self) -> Result<Frame, DeviceError<B::Error>> {
        let raw = self.receive_raw()?;
        Ok(Frame::decode(&raw, self.user_crc)?)
    }

    /// Reads the raw wire image of the next pending frame and releases its
    /// page.
    pub fn receive_raw(&mut self) -> Result<Vec<u8>, DeviceError<B::Error>> {
        if !self.flags()?.rx_pending() {
            return Err(DeviceError::RxEmpty);
        }

        let mut header = [0x0u8; HEADER_LEN];
        self.access
            .read_burst(REG_RX, &mut header)
            .map_err(DeviceError::Access)?;

        let mut rest = vec![0x0u8; header[2] as usize + TRAILER_LEN];
        self.access
            .read_burst(REG_RX, &mut rest)
            .map_err(DeviceError::Access)?;

        self.write(
            REG_RX_CTRL,
            RxCtrl::new().with_clr_pending(true).with_rst_pointer(true).into(),
        )?;

        let mut raw = Vec::with_capacity(header.len() + rest.len());
        raw.extend_from_slice(&header);
        raw.extend_from_slice(&rest);
        Ok(raw)
    }

    fn read(&mut self, address: u8) -> Result<u8, DeviceError<B::Error>> {
        self.access.read_register(address).map_err(DeviceError::Access)
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), DeviceError<B::Error>> {
        self.access
            .write_register(address, value)
            .map_err(DeviceError::Access)
    }
}
