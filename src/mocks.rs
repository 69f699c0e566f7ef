use crate::access::QuadBus;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_hal::i2c;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use embedded_hal::spi;
use embedded_hal::spi::{Operation, SpiDevice};
use mockall::mock;

mock! {
    pub SpiBus {}

    impl spi::ErrorType for SpiBus {
        type Error = spi::ErrorKind;
    }

    impl SpiDevice<u8> for SpiBus {
        fn transaction<'a>(&mut self, operations: &mut [Operation<'a, u8>]) -> Result<(), spi::ErrorKind>;
    }
}

mock! {
    pub I2cBus {}

    impl i2c::ErrorType for I2cBus {
        type Error = i2c::ErrorKind;
    }

    impl I2c<SevenBitAddress> for I2cBus {
        fn transaction<'a>(&mut self, address: SevenBitAddress, operations: &mut [i2c::Operation<'a>]) -> Result<(), i2c::ErrorKind>;
        fn write_read(&mut self, address: SevenBitAddress, write: &[u8], read: &mut [u8]) -> Result<(), i2c::ErrorKind>;
        fn write(&mut self, address: SevenBitAddress, write: &[u8]) -> Result<(), i2c::ErrorKind>;
    }
}

/// Scripted four-bit bus recording all written nibbles.
#[derive(Default)]
pub struct RecordingQuadBus {
    pub written: Vec<u8>,
    pub read_script: VecDeque<u8>,
}

impl QuadBus for RecordingQuadBus {
    type Error = Infallible;

    fn write_nibbles(&mut self, nibbles: &[u8]) -> Result<(), Self::Error> {
        self.written.extend_from_slice(nibbles);
        Ok(())
    }

    fn read_nibbles(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buffer.iter_mut() {
            *byte = self.read_script.pop_front().unwrap_or_default();
        }
        Ok(())
    }
}
