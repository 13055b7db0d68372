// src/onewire/commands.rs

//! 1-Wire command bytes, sent LSB first after a reset.

/// Begin the binary-tree ROM search.
pub const SEARCH_ROM: u8 = 0xF0;
/// Address the device whose 64-bit ROM code follows.
pub const MATCH_ROM: u8 = 0x55;
/// Address all devices on the line at once.
pub const SKIP_ROM: u8 = 0xCC;
/// Start a temperature conversion (DS18B20 function command).
pub const CONVERT_T: u8 = 0x44;
/// Read the nine-byte scratchpad (DS18B20 function command).
pub const READ_SCRATCHPAD: u8 = 0xBE;
/// Write TH, TL and the configuration register (DS18B20 function command).
pub const WRITE_SCRATCHPAD: u8 = 0x4E;
