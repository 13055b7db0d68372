// src/common/types.rs

use core::fmt;

/// Identifies a GPIO pin monitored or driven by a decoder.
///
/// Pin numbering is whatever the underlying [`Gpio`](super::hal_traits::Gpio)
/// implementation uses; the crate never interprets the value beyond equality.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub u8);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin {}", self.0)
    }
}

/// Identifies a single-wire bus line on a
/// [`OneWireBus`](super::hal_traits::OneWireBus) controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(pub u8);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}

/// Logic level of a digital pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// Electrical configuration requested for a pin.
///
/// Only the modes the decoders actually need are modeled; anything more
/// exotic belongs to the platform layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input (infrared receivers, echo pins).
    InputFloating,
    /// Input with the internal pull-up enabled (active-low buttons).
    InputPullUp,
    /// Push-pull output (trigger pins).
    OutputPushPull,
    /// Open-drain output with external pull-up (shared data lines).
    OutputOpenDrain,
}

/// Which transitions a pin should report through
/// [`Gpio::poll_edge`](super::hal_traits::Gpio::poll_edge).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeFilter {
    Rising,
    Falling,
    Both,
    /// Stop reporting edges for the pin.
    None,
}
