// src/onewire/search.rs

//! Binary-tree ROM search.
//!
//! Each pass walks the 64 ROM bits: the bus master reads two time slots
//! (every device answers with its bit, then its complement, wired-AND
//! together) and writes one bit back, deselecting every device that
//! disagrees. Collisions are resolved zero-branch first; the discrepancy
//! mask remembers which branch points still have an unexplored one-side.

use arrayvec::ArrayVec;

use crate::common::{
    error::{BusFault, SensorError},
    hal_traits::OneWireBus,
    types::LineId,
};

use super::commands;
use super::rom::RomCode;

/// Upper bound on devices collected per enumeration.
pub const MAX_DEVICES: usize = 8;

/// Consecutive CRC-invalid passes tolerated before the search gives up.
const MAX_CRC_RETRIES: u8 = 3;

/// Result collection for one enumeration.
pub type RomList = ArrayVec<RomCode, MAX_DEVICES>;

/// Runs one search pass and returns the raw 64-bit code it resolved.
///
/// `mask` carries the discrepancy state between passes: a set bit marks a
/// collision position whose one-branch has not been taken yet. The pass
/// updates it in place.
fn search_pass<B>(bus: &mut B, line: LineId, mask: &mut u64) -> Result<u64, SensorError<B::Error>>
where
    B: OneWireBus,
{
    bus.reset(line)?;
    bus.write_bits(line, commands::SEARCH_ROM as u32, 8)?;

    let mut rom = 0u64;
    for bit in 0..64u32 {
        let bit_mask = 1u64 << bit;
        match bus.read_bits(line, 2)? & 0b11 {
            0b00 => {
                // Collision: devices with 0 and 1 both present.
                if *mask & bit_mask != 0 {
                    // Shift twice to avoid the 64-bit shift at bit 63.
                    if (*mask >> 1) >> bit != 0 {
                        // A deeper unresolved collision exists; stay on
                        // the zero branch here.
                        bus.write_bits(line, 0, 1)?;
                    } else {
                        // This is the deepest open branch point: take the
                        // one side and close it.
                        rom |= bit_mask;
                        *mask ^= bit_mask;
                        bus.write_bits(line, 1, 1)?;
                    }
                } else {
                    *mask |= bit_mask;
                    bus.write_bits(line, 0, 1)?;
                }
            }
            0b01 => {
                rom |= bit_mask;
                bus.write_bits(line, 1, 1)?;
            }
            0b10 => {
                bus.write_bits(line, 0, 1)?;
            }
            _ => {
                // Both slots idle high: nothing is answering.
                return Err(SensorError::Bus(BusFault::NoResponse));
            }
        }
    }
    Ok(rom)
}

/// Enumerates every device on `line`, up to [`MAX_DEVICES`].
///
/// Passes repeat until the discrepancy mask clears or the collection
/// fills. A pass whose code fails its CRC is discarded and the mask is
/// rolled back to its pre-pass value, so the same branch is retried and a
/// transient glitch costs nothing from the device budget. More than
/// [`MAX_CRC_RETRIES`] invalid passes in a row fail the enumeration with
/// [`BusFault::SearchExhausted`].
pub fn enumerate<B>(bus: &mut B, line: LineId) -> Result<RomList, SensorError<B::Error>>
where
    B: OneWireBus,
{
    let mut devices = RomList::new();
    let mut mask = 0u64;
    let mut failed_passes = 0u8;

    loop {
        let mask_snapshot = mask;
        let raw = search_pass(bus, line, &mut mask)?;
        match RomCode::try_new::<B::Error>(raw) {
            Ok(code) => {
                failed_passes = 0;
                devices.push(code);
                if devices.is_full() || mask == 0 {
                    return Ok(devices);
                }
            }
            Err(_) => {
                mask = mask_snapshot;
                failed_passes += 1;
                if failed_passes > MAX_CRC_RETRIES {
                    return Err(SensorError::Bus(BusFault::SearchExhausted));
                }
            }
        }
    }
}
