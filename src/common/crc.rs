// src/common/crc.rs

use super::error::SensorError;
use crc::{Algorithm, Crc};

/// CRC algorithm used by 1-Wire ROM codes (CRC-8/MAXIM-DOW).
/// Polynomial: 0x31 (normal representation of x^8 + x^5 + x^4 + 1)
/// Initial Value: 0x00
/// Input Reflected: true
/// Output Reflected: true
/// Final XOR: 0x00
/// Check Value: 0xA1 (for "123456789")
/// Residue: 0x00
pub const ONEWIRE_CRC: Algorithm<u8> = Algorithm {
    poly: 0x31,
    init: 0x00,
    refin: true,
    refout: true,
    xorout: 0x00,
    check: 0xA1,
    width: 8,
    residue: 0x00,
};

// Create a Crc instance for the 1-Wire algorithm for reuse.
const CRC_COMPUTER: Crc<u8> = Crc::<u8>::new(&ONEWIRE_CRC);

/// Calculates the CRC-8/Maxim checksum for the given data buffer.
///
/// For a ROM code this covers the family code byte followed by the six
/// serial number bytes, least significant first.
#[inline]
pub fn calculate_crc8(data: &[u8]) -> u8 {
    CRC_COMPUTER.checksum(data)
}

/// Verifies a raw 64-bit ROM code against its embedded CRC byte.
///
/// Bits 0..56 are the family code and serial number (LSB first); bits
/// 56..64 carry the CRC-8/Maxim of the preceding seven bytes.
///
/// # Returns
///
/// * `Ok(())` if the CRC is valid.
/// * `Err(SensorError::Checksum)` with both values on mismatch.
pub fn verify_rom_crc<E>(raw: u64) -> Result<(), SensorError<E>>
where
    E: core::fmt::Debug,
{
    let bytes = raw.to_le_bytes();
    let computed = calculate_crc8(&bytes[..7]);
    let expected = bytes[7];

    if computed == expected {
        Ok(())
    } else {
        Err(SensorError::Checksum { expected, computed })
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_check_value() {
        // The standard check input for every CRC catalog entry.
        assert_eq!(calculate_crc8(b"123456789"), 0xA1);
    }

    #[test]
    fn test_empty_and_single_byte() {
        assert_eq!(calculate_crc8(&[]), 0x00);
        // A lone zero byte leaves the register untouched.
        assert_eq!(calculate_crc8(&[0x00]), 0x00);
    }

    #[test]
    fn test_verify_constructed_rom_code() {
        // Family code 0x28 (DS18B20) with an arbitrary serial.
        let payload = [0x28, 0x5c, 0x04, 0x00, 0x00, 0x12, 0xa3];
        let crc = calculate_crc8(&payload);

        let mut bytes = [0u8; 8];
        bytes[..7].copy_from_slice(&payload);
        bytes[7] = crc;
        let raw = u64::from_le_bytes(bytes);

        assert!(verify_rom_crc::<()>(raw).is_ok());
    }

    #[test]
    fn test_verify_detects_corruption() {
        let payload = [0x28, 0x5c, 0x04, 0x00, 0x00, 0x12, 0xa3];
        let crc = calculate_crc8(&payload);

        let mut bytes = [0u8; 8];
        bytes[..7].copy_from_slice(&payload);
        bytes[7] = crc;
        let raw = u64::from_le_bytes(bytes);

        // Flip one serial bit; the stored CRC no longer matches.
        let corrupted = raw ^ (1 << 13);
        let result = verify_rom_crc::<()>(corrupted);
        assert!(matches!(result, Err(SensorError::Checksum { .. })));

        // Corrupting the CRC byte itself is detected too.
        let bad_crc = raw ^ (1 << 60);
        assert!(matches!(
            verify_rom_crc::<()>(bad_crc),
            Err(SensorError::Checksum { .. })
        ));
    }

    #[test]
    fn test_crc_is_order_sensitive() {
        assert_ne!(
            calculate_crc8(&[0x01, 0x02, 0x03]),
            calculate_crc8(&[0x03, 0x02, 0x01])
        );
    }
}
