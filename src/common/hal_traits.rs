// src/common/hal_traits.rs

use super::events::EdgeEvent;
use super::types::{EdgeFilter, Level, LineId, PinId, PinMode};
use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A point on the platform's monotonic clock.
///
/// Implemented automatically for anything that supports the arithmetic the
/// deadline checks need; platform code never implements it by hand.
pub trait MonotonicInstant:
    Copy + Add<Duration, Output = Self> + Sub<Self, Output = Duration> + PartialOrd
{
}

impl<T> MonotonicInstant for T where
    T: Copy + Add<Duration, Output = Self> + Sub<Self, Output = Duration> + PartialOrd
{
}

/// Abstraction for timer/delay operations required by the blocking
/// measurement calls.
pub trait SensorTimer {
    /// Monotonic timestamp type used for deadlines.
    type Instant: MonotonicInstant;

    /// Current monotonic time.
    fn now(&self) -> Self::Instant;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Abstraction over the port-level GPIO controller.
///
/// This is a pin-id addressed interface rather than an owned-pin one
/// because the decoders juggle notification setup and level writes on the
/// same shared controller, and because edge events arrive tagged with the
/// pin they belong to.
pub trait Gpio {
    /// Associated error type for GPIO operations.
    type Error: Debug;

    /// Applies an electrical configuration to a pin.
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error>;

    /// Drives an output (or open-drain) pin to the given level.
    fn write_pin(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error>;

    /// Samples the current level of a pin.
    fn read_pin(&mut self, pin: PinId) -> Result<Level, Self::Error>;

    /// Starts reporting the selected transitions of `pin` through
    /// [`poll_edge`](Self::poll_edge). Transitions closer together than
    /// `min_interval_us` are treated as noise and dropped.
    fn set_edge_notification(
        &mut self,
        pin: PinId,
        filter: EdgeFilter,
        min_interval_us: u32,
    ) -> Result<(), Self::Error>;

    /// Stops reporting transitions for `pin`.
    fn clear_edge_notification(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Pulls the next queued edge event.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while no edge is pending.
    /// Events for different registered pins may interleave; per pin they
    /// are monotonic in time.
    fn poll_edge(&mut self) -> nb::Result<EdgeEvent, Self::Error>;
}

/// Abstraction over a single-wire bus master.
///
/// All three primitives are blocking and bus-exclusive: the electrical
/// slot timing is the controller's business, the protocol logic above only
/// sequences values. Exclusive ownership of the implementing value is the
/// per-bus lock the search and measurement sequences rely on.
pub trait OneWireBus {
    /// Associated error type for bus operations.
    type Error: Debug;

    /// Issues a bus reset / presence cycle.
    fn reset(&mut self, line: LineId) -> Result<(), Self::Error>;

    /// Writes the low `bit_count` bits of `value`, LSB first.
    fn write_bits(&mut self, line: LineId, value: u32, bit_count: u8) -> Result<(), Self::Error>;

    /// Reads `bit_count` bits, LSB first, and returns them right-aligned.
    fn read_bits(&mut self, line: LineId, bit_count: u8) -> Result<u32, Self::Error>;
}
