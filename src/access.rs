//! Host-side register transports (CSR, SPI, I2C, QSPI).
use crate::wire::NodeHandle;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt::Debug;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use embedded_hal::spi::{Operation, SpiDevice};

/// MSB of the first SPI byte selects a write access
pub const SPI_WRITE_FLAG: u8 = 0x80;

/// Fixed 7-bit I2C device address
pub const I2C_DEVICE_ADDRESS: SevenBitAddress = 0x60;

/// Byte-level access to the register file.
///
/// The burst operations keep the register address fixed, which is how the
/// RX and TX data ports are streamed.
pub trait RegisterAccess {
    type Error: Debug;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error>;
    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buffer.iter_mut() {
            *byte = self.read_register(address)?;
        }
        Ok(())
    }

    fn write_burst(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        for byte in data {
            self.write_register(address, *byte)?;
        }
        Ok(())
    }
}

/// Direct register access to an attached node, as from a bus master sharing
/// the memory map.
#[derive(Debug)]
pub struct CsrAccess {
    node: NodeHandle,
}

impl CsrAccess {
    pub fn new(node: NodeHandle) -> Self {
        Self { node }
    }
}

impl RegisterAccess for CsrAccess {
    type Error = Infallible;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        Ok(self.node.borrow_mut().register_read(address))
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.node.borrow_mut().register_write(address, value);
        Ok(())
    }
}

/// SPI transport: `[address, data…]` for reads, `[address | 0x80, data…]`
/// for writes, one chip select assertion per access.
#[derive(Debug)]
pub struct SpiAccess<D: SpiDevice<u8>> {
    device: D,
}

impl<D: SpiDevice<u8>> SpiAccess<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }
}

impl<D: SpiDevice<u8>> RegisterAccess for SpiAccess<D> {
    type Error = D::Error;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut buffer = [0x0u8];
        self.device
            .transaction(&mut [Operation::Write(&[address]), Operation::Read(&mut buffer)])?;
        Ok(buffer[0])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.device.write(&[address | SPI_WRITE_FLAG, value])
    }

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.device
            .transaction(&mut [Operation::Write(&[address]), Operation::Read(buffer)])
    }

    fn write_burst(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.device.transaction(&mut [
            Operation::Write(&[address | SPI_WRITE_FLAG]),
            Operation::Write(data),
        ])
    }
}

/// I2C transport at the fixed device address 0x60: writes send the register
/// address followed by data, reads use a repeated start.
#[derive(Debug)]
pub struct I2cAccess<D: I2c> {
    device: D,
}

impl<D: I2c> I2cAccess<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }
}

impl<D: I2c> RegisterAccess for I2cAccess<D> {
    type Error = D::Error;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut buffer = [0x0u8];
        self.device
            .write_read(I2C_DEVICE_ADDRESS, &[address], &mut buffer)?;
        Ok(buffer[0])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.device.write(I2C_DEVICE_ADDRESS, &[address, value])
    }

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.device.write_read(I2C_DEVICE_ADDRESS, &[address], buffer)
    }

    fn write_burst(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        let mut message = Vec::with_capacity(data.len() + 1);
        message.push(address);
        message.extend_from_slice(data);
        self.device.write(I2C_DEVICE_ADDRESS, &message)
    }
}

/// Four-bit wide bus carrying one nibble per transfer.
pub trait QuadBus {
    type Error: Debug;

    fn write_nibbles(&mut self, nibbles: &[u8]) -> Result<(), Self::Error>;
    fn read_nibbles(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// QSPI transport: same command layout as SPI, every byte split into two
/// nibbles with the high nibble first.
#[derive(Debug)]
pub struct QspiAccess<B: QuadBus> {
    bus: B,
}

impl<B: QuadBus> QspiAccess<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn unpack(byte: u8) -> [u8; 2] {
        [byte >> 4, byte & 0x0f]
    }
}

impl<B: QuadBus> RegisterAccess for QspiAccess<B> {
    type Error = B::Error;

    fn read_register(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut buffer = [0x0u8];
        self.read_burst(address, &mut buffer)?;
        Ok(buffer[0])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.write_burst(address, &[value])
    }

    fn read_burst(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.write_nibbles(&Self::unpack(address))?;

        let mut nibbles = alloc::vec![0x0u8; buffer.len() * 2];
        self.bus.read_nibbles(&mut nibbles)?;

        for (byte, pair) in buffer.iter_mut().zip(nibbles.chunks_exact(2)) {
            *byte = (pair[0] << 4) | (pair[1] & 0x0f);
        }
        Ok(())
    }

    fn write_burst(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        let mut nibbles = Vec::with_capacity((data.len() + 1) * 2);
        nibbles.extend_from_slice(&Self::unpack(address | SPI_WRITE_FLAG));

        for byte in data {
            nibbles.extend_from_slice(&Self::unpack(*byte));
        }

        self.bus.write_nibbles(&nibbles)
    }
}
