// src/lib.rs

#![no_std] // Specify no_std at the crate root

#[cfg(feature = "std")]
extern crate std;

pub mod common;
pub mod onewire;
pub mod sensor;

// Re-export key types for convenience
pub use common::SensorError;
pub use common::{Edge, EdgeEvent, PinId};
pub use onewire::RomCode;
