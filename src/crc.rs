//! CRC16 checksum used for frame trailers (Modbus variant).
//!
//! Reflected polynomial 0xA001, initial value 0xFFFF. The two checksum
//! bytes are carried on the wire in little-endian order.

/// Computes the CRC16/Modbus checksum of the given bytes.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for byte in data {
        crc ^= *byte as u16;

        for _ in 0..8 {
            if crc & 0x1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
