//! Behavioral model and register-level host driver for CDBUS serial bus
//! controllers.
//!
//! The crate covers both sides of the chip boundary: [node](crate::node)
//! and [wire](crate::wire) model the controller itself down to register
//! semantics and bus bit timing, while [device](crate::device) and
//! [access](crate::access) implement the host driver over CSR, SPI, I2C or
//! QSPI transports.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use cdbus::example::example_pair;
//! use cdbus::frame::Frame;
//!
//! let mut pair = example_pair();
//!
//! // Node 0x01 sends a single byte to node 0x02
//! let frame = Frame::new(0x01, 0x02, Bytes::from_static(&[0xcd])).unwrap();
//! pair.left.transmit(&frame).unwrap();
//!
//! // Let the bus run until the frame has settled
//! pair.wire.run(2_000);
//!
//! let received = pair.right.receive().unwrap();
//! assert_eq!(received.source(), 0x01);
//! assert_eq!(received.payload().as_ref(), &[0xcd]);
//! ```
#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate alloc;

pub mod access;
pub mod config;
pub mod crc;
pub mod device;
pub mod example;
pub mod filter;
pub mod frame;
pub mod node;
pub mod registers;
pub mod ring;
pub mod txbuf;
pub mod wire;

#[cfg(test)]
pub(crate) mod mocks;

#[cfg(test)]
mod tests;
