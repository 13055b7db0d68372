// src/onewire/mod.rs

//! Single-wire bus enumeration and the DS18B20 temperature driver.
//!
//! The bus master primitives (reset, write bits, read bits) live in
//! [`OneWireBus`](crate::common::hal_traits::OneWireBus); everything here
//! is protocol sequencing on top of them. Holding the `&mut` borrow of
//! the bus for the duration of a sequence is what keeps concurrent
//! traffic off the wire.

pub mod commands;
pub mod ds18b20;
pub mod rom;
pub mod search;

pub use ds18b20::{Ds18b20, Resolution};
pub use rom::RomCode;
pub use search::{enumerate, RomList, MAX_DEVICES};
