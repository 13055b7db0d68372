// src/sensor/button.rs

//! Debounced push button.
//!
//! The debounce happens in the edge-notification layer: the button
//! subscribes with a minimum inter-event interval, so contact bounce
//! collapses into a single edge per actuation. The decoder itself only
//! maps edge direction to press/release through the wiring polarity and
//! drops repeated events in the same direction.

use crate::common::{
    error::SensorError,
    events::{Edge, EdgeEvent, EdgeSink},
    hal_traits::Gpio,
    timing,
    types::{EdgeFilter, PinId, PinMode},
};

/// How the button is wired.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonPolarity {
    /// Pressing drives the line high (external pull-down).
    ActiveHigh,
    /// Pressing pulls the line low against the internal pull-up.
    ActiveLow,
}

/// Callback interface for button actuations.
pub trait ButtonListener {
    fn pressed(&mut self, pin: PinId);
    fn released(&mut self, _pin: PinId) {}
}

impl ButtonListener for () {
    fn pressed(&mut self, _pin: PinId) {}
}

/// Push-button facade. Feed it through an
/// [`EdgeDispatcher`](crate::common::events::EdgeDispatcher).
#[derive(Debug)]
pub struct Button<IF, L = ()>
where
    IF: Gpio,
    L: ButtonListener,
{
    interface: IF,
    pin: PinId,
    polarity: ButtonPolarity,
    listener: Option<L>,
    pressed: bool,
    last_event: Option<core::time::Duration>,
}

impl<IF, L> Button<IF, L>
where
    IF: Gpio,
    L: ButtonListener,
{
    /// Claims the pin. Active-low buttons get the internal pull-up;
    /// active-high wiring is expected to provide its own pull-down.
    pub fn new(
        mut interface: IF,
        pin: PinId,
        polarity: ButtonPolarity,
    ) -> Result<Self, SensorError<IF::Error>> {
        let mode = match polarity {
            ButtonPolarity::ActiveHigh => PinMode::InputFloating,
            ButtonPolarity::ActiveLow => PinMode::InputPullUp,
        };
        interface.configure_pin(pin, mode)?;
        Ok(Button {
            interface,
            pin,
            polarity,
            listener: None,
            pressed: false,
            last_event: None,
        })
    }

    /// Attaches the listener and enables debounced both-edge
    /// notification.
    pub fn listen(&mut self, listener: L) -> Result<(), SensorError<IF::Error>> {
        if self.listener.is_none() {
            self.interface.set_edge_notification(
                self.pin,
                EdgeFilter::Both,
                timing::BUTTON_DEBOUNCE_US,
            )?;
        }
        self.listener = Some(listener);
        Ok(())
    }

    /// Detaches the listener and disables edge notification.
    pub fn unlisten(&mut self) -> Result<Option<L>, SensorError<IF::Error>> {
        if self.listener.is_some() {
            self.interface.clear_edge_notification(self.pin)?;
        }
        Ok(self.listener.take())
    }

    /// Whether the button is currently held, as tracked from edges.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    /// Timestamp of the last accepted press or release.
    pub fn last_event(&self) -> Option<core::time::Duration> {
        self.last_event
    }

    pub fn listener(&self) -> Option<&L> {
        self.listener.as_ref()
    }

    /// Releases the underlying interface.
    pub fn free(self) -> IF {
        self.interface
    }
}

impl<IF, L> EdgeSink for Button<IF, L>
where
    IF: Gpio,
    L: ButtonListener,
{
    fn on_edge(&mut self, event: EdgeEvent) {
        if event.pin != self.pin {
            return;
        }
        let pressed = match (self.polarity, event.edge) {
            (ButtonPolarity::ActiveHigh, Edge::Rising) => true,
            (ButtonPolarity::ActiveHigh, Edge::Falling) => false,
            (ButtonPolarity::ActiveLow, Edge::Falling) => true,
            (ButtonPolarity::ActiveLow, Edge::Rising) => false,
        };
        if pressed == self.pressed {
            // Residual bounce in the same direction.
            return;
        }
        self.pressed = pressed;
        self.last_event = Some(event.timestamp);
        if let Some(listener) = self.listener.as_mut() {
            if pressed {
                listener.pressed(self.pin);
            } else {
                listener.released(self.pin);
            }
        }
    }
}
