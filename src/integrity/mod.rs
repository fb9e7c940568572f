//! Record integrity checks
//!
//! The credential record is protected by an 8-bit CRC:
//! - Polynomial 0x31 (x^8 + x^5 + x^4 + 1)
//! - Initial value 0x00, no reflection, no final XOR
//!
//! The same CRC is computed by the transmitter over the record it wants the
//! device to end up with, and sent as the last field of the symbol stream.

/// CRC-8 generator polynomial
pub const CRC8_POLY: u8 = 0x31;

/// Incremental CRC-8 calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc8 {
    crc: u8,
}

impl Crc8 {
    /// Create a calculator with the initial value
    pub fn new() -> Self {
        Self { crc: 0 }
    }

    /// Feed bytes into the calculation
    pub fn update(mut self, data: &[u8]) -> Self {
        for &byte in data {
            self.crc ^= byte;
            for _ in 0..8 {
                self.crc = if self.crc & 0x80 != 0 {
                    (self.crc << 1) ^ CRC8_POLY
                } else {
                    self.crc << 1
                };
            }
        }
        self
    }

    /// Get the checksum of everything fed so far
    pub fn finish(self) -> u8 {
        self.crc
    }
}

/// Compute the CRC-8 of `data` in one go
pub fn crc8(data: &[u8]) -> u8 {
    Crc8::new().update(data).finish()
}
