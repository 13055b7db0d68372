// src/onewire/ds18b20.rs

//! DS18B20 digital thermometer driver.
//!
//! Every transaction is reset, ROM addressing, function command. The
//! addressing step is MATCH ROM plus the stored code when a device has
//! been selected, or SKIP ROM to broadcast when the line carries a single
//! device. Temperature comes back as a signed 16-bit count of 1/16 °C.

use crate::common::{
    error::SensorError,
    hal_traits::{OneWireBus, SensorTimer},
    types::LineId,
};

use super::commands;
use super::rom::RomCode;
use super::search::{self, RomList};

/// Conversion resolution, configuration register values per datasheet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Nine,
    Ten,
    Eleven,
    Twelve,
}

impl Resolution {
    /// Resolution in bits.
    pub fn bits(&self) -> u8 {
        match self {
            Resolution::Nine => 9,
            Resolution::Ten => 10,
            Resolution::Eleven => 11,
            Resolution::Twelve => 12,
        }
    }

    /// Configuration register byte selecting this resolution.
    fn config_byte(&self) -> u8 {
        match self {
            Resolution::Nine => 0x1F,
            Resolution::Ten => 0x3F,
            Resolution::Eleven => 0x5F,
            Resolution::Twelve => 0x7F,
        }
    }

    /// Worst-case conversion time at this resolution.
    fn conversion_wait_ms(&self) -> u32 {
        match self {
            Resolution::Nine => 94,
            Resolution::Ten => 188,
            Resolution::Eleven => 375,
            Resolution::Twelve => 750,
        }
    }
}

/// Alarm trigger registers written alongside the configuration byte.
const ALARM_TRIGGER_HIGH_C: u8 = 75;
const ALARM_TRIGGER_LOW_C: u8 = 70;

/// Driver for one or more DS18B20 devices on a single line.
///
/// Owns the bus interface; a measurement sequence therefore holds the
/// only handle to the wire from reset to final read.
#[derive(Debug)]
pub struct Ds18b20<IF>
where
    IF: OneWireBus + SensorTimer,
{
    interface: IF,
    line: LineId,
    selected: Option<RomCode>,
    resolution: Resolution,
}

impl<IF> Ds18b20<IF>
where
    IF: OneWireBus + SensorTimer,
{
    pub fn new(interface: IF, line: LineId) -> Self {
        Ds18b20 {
            interface,
            line,
            selected: None,
            resolution: Resolution::Twelve,
        }
    }

    /// Enumerates the ROM codes present on the line.
    pub fn enumerate(&mut self) -> Result<RomList, SensorError<IF::Error>> {
        search::enumerate(&mut self.interface, self.line)
    }

    /// Addresses `code` for all subsequent transactions.
    pub fn select(&mut self, code: RomCode) {
        self.selected = Some(code);
    }

    /// Broadcasts subsequent transactions with SKIP ROM. Only valid when
    /// the line carries a single device.
    pub fn select_single(&mut self) {
        self.selected = None;
    }

    /// Starts a conversion and blocks for the worst-case conversion time
    /// of the configured resolution.
    pub fn measure(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.address_device()?;
        self.interface
            .write_bits(self.line, commands::CONVERT_T as u32, 8)?;
        self.interface
            .delay_ms(self.resolution.conversion_wait_ms());
        Ok(())
    }

    /// Reads the latest conversion result in degrees Celsius.
    pub fn temperature(&mut self) -> Result<f32, SensorError<IF::Error>> {
        self.address_device()?;
        self.interface
            .write_bits(self.line, commands::READ_SCRATCHPAD as u32, 8)?;
        let low = self.interface.read_bits(self.line, 8)?;
        let high = self.interface.read_bits(self.line, 8)?;
        let raw = (((high & 0xff) << 8) | (low & 0xff)) as u16 as i16;
        Ok(raw as f32 * 0.0625)
    }

    /// Writes the scratchpad to change the conversion resolution.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), SensorError<IF::Error>> {
        self.address_device()?;
        self.interface
            .write_bits(self.line, commands::WRITE_SCRATCHPAD as u32, 8)?;
        self.interface
            .write_bits(self.line, ALARM_TRIGGER_HIGH_C as u32, 8)?;
        self.interface
            .write_bits(self.line, ALARM_TRIGGER_LOW_C as u32, 8)?;
        self.interface
            .write_bits(self.line, resolution.config_byte() as u32, 8)?;
        self.resolution = resolution;
        Ok(())
    }

    /// Currently configured resolution (the device default is 12 bits).
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    /// Releases the underlying interface.
    pub fn free(self) -> IF {
        self.interface
    }

    /// Reset plus ROM addressing, shared by every function command.
    fn address_device(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.interface.reset(self.line)?;
        match self.selected {
            Some(code) => {
                self.interface
                    .write_bits(self.line, commands::MATCH_ROM as u32, 8)?;
                for byte in code.to_le_bytes() {
                    self.interface.write_bits(self.line, byte as u32, 8)?;
                }
            }
            None => {
                self.interface
                    .write_bits(self.line, commands::SKIP_ROM as u32, 8)?;
            }
        }
        Ok(())
    }
}
