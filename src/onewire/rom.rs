// src/onewire/rom.rs

//! 64-bit ROM codes.
//!
//! Layout, least significant byte first: one family code byte, six serial
//! number bytes, one CRC-8/Maxim byte covering the first seven.

use crate::common::crc::verify_rom_crc;
use crate::common::error::SensorError;

/// A CRC-validated 1-Wire ROM code.
///
/// The only way to construct one is [`try_new`](Self::try_new), so any
/// `RomCode` in circulation has already passed its checksum.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RomCode(u64);

impl RomCode {
    /// Validates the embedded CRC byte and wraps the raw code.
    pub fn try_new<E>(raw: u64) -> Result<Self, SensorError<E>>
    where
        E: core::fmt::Debug,
    {
        verify_rom_crc(raw)?;
        Ok(RomCode(raw))
    }

    /// Family code identifying the device type (0x28 for the DS18B20).
    pub fn family_code(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// The 48-bit serial number, least significant byte first.
    pub fn serial(&self) -> [u8; 6] {
        let bytes = self.0.to_le_bytes();
        let mut serial = [0u8; 6];
        serial.copy_from_slice(&bytes[1..7]);
        serial
    }

    /// The stored CRC byte.
    pub fn checksum(&self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// The full code in wire order, family code first.
    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// The raw 64-bit value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for RomCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Builds a CRC-valid raw code from a family byte and serial.
#[cfg(test)]
pub(crate) fn raw_code(family: u8, serial: [u8; 6]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[0] = family;
    bytes[1..7].copy_from_slice(&serial);
    bytes[7] = crate::common::crc::calculate_crc8(&bytes[..7]);
    u64::from_le_bytes(bytes)
}
