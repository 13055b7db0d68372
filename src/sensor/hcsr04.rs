// src/sensor/hcsr04.rs

//! HC-SR04 ultrasonic range finder.
//!
//! The host raises the trigger pin, the module emits an ultrasonic burst
//! and answers with an echo pulse whose width equals the round-trip time
//! of flight. One measurement is two edges on the echo pin: rising at
//! burst start, falling when the reflection returns.

use crate::common::{
    error::SensorError,
    events::{Edge, EdgeEvent, EdgeSink},
    hal_traits::{Gpio, SensorTimer},
    timing,
    types::{EdgeFilter, Level, PinId, PinMode},
};

use super::{pump_until_disarmed, ArmedCapture};

/// Captures the echo pulse boundaries for one ranging cycle.
#[derive(Debug)]
pub struct EchoState {
    pin: PinId,
    armed: bool,
    rise_us: Option<u64>,
    fall_us: Option<u64>,
}

impl EchoState {
    pub fn new(pin: PinId) -> Self {
        EchoState {
            pin,
            armed: false,
            rise_us: None,
            fall_us: None,
        }
    }

    /// Prepares for a fresh echo pulse, discarding any previous capture.
    pub fn arm(&mut self) {
        self.rise_us = None;
        self.fall_us = None;
        self.armed = true;
    }

    /// Echo pulse width in microseconds, once both edges are in.
    ///
    /// A falling timestamp at or before the rising one means the capture
    /// picked up a stale or truncated pulse.
    pub fn pulse_width_us<E>(&self) -> Result<u64, SensorError<E>>
    where
        E: core::fmt::Debug,
    {
        match (self.rise_us, self.fall_us) {
            (Some(rise), Some(fall)) if fall > rise => Ok(fall - rise),
            (Some(_), Some(_)) => Err(SensorError::DataError),
            _ => Err(SensorError::Timeout),
        }
    }
}

impl EdgeSink for EchoState {
    fn on_edge(&mut self, event: EdgeEvent) {
        if !self.armed || event.pin != self.pin {
            return;
        }
        match event.edge {
            Edge::Rising => {
                if self.rise_us.is_none() {
                    self.rise_us = Some(event.micros());
                }
            }
            Edge::Falling => {
                if self.rise_us.is_some() && self.fall_us.is_none() {
                    self.fall_us = Some(event.micros());
                    self.armed = false;
                }
            }
        }
    }
}

impl ArmedCapture for EchoState {
    fn is_armed(&self) -> bool {
        self.armed
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

/// HC-SR04 facade owning the trigger and echo pins.
#[derive(Debug)]
pub struct Hcsr04<IF>
where
    IF: Gpio + SensorTimer,
{
    interface: IF,
    trigger_pin: PinId,
    state: EchoState,
    speed_of_sound_m_s: f32,
    distance_m: Option<f32>,
}

impl<IF> Hcsr04<IF>
where
    IF: Gpio + SensorTimer,
{
    /// Claims both pins: trigger as push-pull output held low, echo as a
    /// floating input with both-edge notification.
    pub fn new(
        mut interface: IF,
        trigger_pin: PinId,
        echo_pin: PinId,
    ) -> Result<Self, SensorError<IF::Error>> {
        interface.configure_pin(trigger_pin, PinMode::OutputPushPull)?;
        interface.write_pin(trigger_pin, Level::Low)?;
        interface.configure_pin(echo_pin, PinMode::InputFloating)?;
        interface.set_edge_notification(echo_pin, EdgeFilter::Both, 0)?;
        Ok(Hcsr04 {
            interface,
            trigger_pin,
            state: EchoState::new(echo_pin),
            speed_of_sound_m_s: timing::HCSR_SPEED_OF_SOUND_M_S,
            distance_m: None,
        })
    }

    /// Overrides the propagation speed, e.g. for temperature compensation.
    pub fn set_speed_of_sound(&mut self, meters_per_second: f32) {
        self.speed_of_sound_m_s = meters_per_second;
    }

    /// Runs one ranging cycle.
    ///
    /// Returns the distance in meters, or `None` when the echo came back
    /// beyond the module's rated range. The result is also cached for
    /// [`distance_m`](Self::distance_m).
    pub fn measure(&mut self) -> Result<Option<f32>, SensorError<IF::Error>> {
        self.state.arm();
        if let Err(e) = self.send_trigger() {
            self.state.disarm();
            return Err(e);
        }
        pump_until_disarmed(&mut self.interface, &mut self.state, timing::HCSR_ECHO_TIMEOUT)?;

        let width_us = self.state.pulse_width_us()?;
        // Divide by two: the pulse covers the round trip.
        let distance = width_us as f32 * (self.speed_of_sound_m_s / 1_000_000.0) / 2.0;
        if distance > timing::HCSR_MAX_RANGE_M {
            self.distance_m = None;
        } else {
            self.distance_m = Some(distance);
        }
        Ok(self.distance_m)
    }

    /// Result of the last successful in-range measurement.
    pub fn distance_m(&self) -> Option<f32> {
        self.distance_m
    }

    pub fn trigger_pin(&self) -> PinId {
        self.trigger_pin
    }

    pub fn echo_pin(&self) -> PinId {
        self.state.pin
    }

    /// Releases the underlying interface.
    pub fn free(self) -> IF {
        self.interface
    }

    fn send_trigger(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.interface.write_pin(self.trigger_pin, Level::High)?;
        self.interface
            .delay_ms(timing::HCSR_TRIGGER_PULSE.as_millis() as u32);
        self.interface.write_pin(self.trigger_pin, Level::Low)?;
        Ok(())
    }
}
