// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod crc;
pub mod error;
pub mod events;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From crc.rs
pub use crc::{calculate_crc8, verify_rom_crc};

// From error.rs
pub use error::{BusFault, SensorError};

// From events.rs
pub use events::{DispatcherFull, Edge, EdgeDispatcher, EdgeEvent, EdgeSink, Subscription};

// From hal_traits.rs
pub use hal_traits::{Gpio, MonotonicInstant, OneWireBus, SensorTimer};

// From timing.rs (constants - users can access via common::timing::*)

// From types.rs
pub use types::{EdgeFilter, Level, LineId, PinId, PinMode};
