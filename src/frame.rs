//! Bus frames and their wire encoding.
//!
//! A frame on the wire is `[source, destination, length, payload…, crc_lo, crc_hi]`.
//! The checksum covers everything before the trailer and is computed with
//! [crc16](crate::crc::crc16) unless the controller runs in user-CRC mode,
//! in which case the last two payload bytes are sent verbatim.
//!
//! ```
//! use bytes::Bytes;
//! use cdbus::frame::Frame;
//!
//! let frame = Frame::new(0x01, 0x02, Bytes::from_static(&[0xcd])).unwrap();
//! assert_eq!(frame.encode(), vec![0x01, 0x02, 0x01, 0xcd, 0x60, 0x1d]);
//! ```
use crate::crc::crc16;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use log::debug;

/// Maximum payload length of a single frame
pub const MAX_PAYLOAD: usize = 253;

/// Source, destination and length byte
pub const HEADER_LEN: usize = 3;

/// CRC16 trailer
pub const TRAILER_LEN: usize = 2;

/// Largest possible wire image (header + payload + trailer)
pub const FRAME_CAPACITY: usize = HEADER_LEN + MAX_PAYLOAD + TRAILER_LEN;

/// Destination address matched by every node
pub const BROADCAST_ADDRESS: u8 = 0xff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Payload exceeds [MAX_PAYLOAD]
    TooLong(usize),
    /// Raw data is shorter than header + trailer
    TooShort(usize),
    /// Trailer does not match the computed checksum
    CrcMismatch { expected: u16, actual: u16 },
}

/// Single addressed frame with an owned payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    src: u8,
    dst: u8,
    payload: Bytes,
}

impl Frame {
    /// Creates a new frame. Payloads longer than [MAX_PAYLOAD] are rejected
    /// before anything reaches the wire.
    pub fn new(src: u8, dst: u8, payload: Bytes) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD {
            debug!("Payload of {} bytes exceeds the frame limit", payload.len());
            return Err(FrameError::TooLong(payload.len()));
        }

        Ok(Self { src, dst, payload })
    }

    pub fn source(&self) -> u8 {
        self.src
    }

    pub fn destination(&self) -> u8 {
        self.dst
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Header and payload without the trailer, as staged in the transmit buffer.
    pub fn staging_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(HEADER_LEN + self.payload.len());
        data.push(self.src);
        data.push(self.dst);
        data.push(self.payload.len() as u8);
        data.extend_from_slice(&self.payload);
        data
    }

    /// Full wire image including the CRC16 trailer.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = self.staging_bytes();

        let mut trailer = [0x0u8; TRAILER_LEN];
        LittleEndian::write_u16(&mut trailer, crc16(&data));
        data.extend_from_slice(&trailer);

        data
    }

    /// Parses a raw wire image back into a frame.
    ///
    /// With `user_crc` the trailer is not validated and becomes part of the
    /// payload, so the returned payload holds `length + 2` bytes.
    pub fn decode(raw: &[u8], user_crc: bool) -> Result<Self, FrameError> {
        if raw.len() < HEADER_LEN + TRAILER_LEN {
            return Err(FrameError::TooShort(raw.len()));
        }

        if raw.len() > FRAME_CAPACITY {
            return Err(FrameError::TooLong(raw.len() - HEADER_LEN - TRAILER_LEN));
        }

        let length = raw[2] as usize;
        if raw.len() < HEADER_LEN + length + TRAILER_LEN {
            return Err(FrameError::TooShort(raw.len()));
        }
        if raw.len() > HEADER_LEN + length + TRAILER_LEN {
            return Err(FrameError::TooLong(raw.len() - HEADER_LEN - TRAILER_LEN));
        }

        let payload = if user_crc {
            Bytes::copy_from_slice(&raw[HEADER_LEN..])
        } else {
            let expected = crc16(&raw[..HEADER_LEN + length]);
            let actual = LittleEndian::read_u16(&raw[HEADER_LEN + length..]);

            if expected != actual {
                debug!("Frame checksum mismatch (expected {:04x}, got {:04x})", expected, actual);
                return Err(FrameError::CrcMismatch { expected, actual });
            }

            Bytes::copy_from_slice(&raw[HEADER_LEN..HEADER_LEN + length])
        };

        Ok(Self {
            src: raw[0],
            dst: raw[1],
            payload,
        })
    }
}
