//! CRC-32 checksum
//!
//! Standard CRC-32 (IEEE 802.3 polynomial, reflected): init 0xFFFFFFFF,
//! final XOR 0xFFFFFFFF. These are protocol constants; a decoder that uses
//! any other variant will reject every frame.

/// Reflected IEEE 802.3 polynomial
pub const POLY: u32 = 0xEDB8_8320;

/// Register value before the first byte
pub const INIT: u32 = 0xFFFF_FFFF;

/// Byte-wise lookup table, built at compile time
static TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Incremental CRC-32 hasher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub const fn new() -> Self {
        Self { state: INIT }
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            crc = (crc >> 8) ^ TABLE[((crc ^ byte as u32) & 0xFF) as usize];
        }
        self.state = crc;
    }

    /// Final checksum value
    pub const fn finalize(self) -> u32 {
        !self.state
    }
}

/// CRC-32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(data);
    hasher.finalize()
}
