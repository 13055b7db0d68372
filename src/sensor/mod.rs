// src/sensor/mod.rs

// Declare the modules within the sensor directory.
// One module per supported sensor protocol.
pub mod button;
pub mod dht;
pub mod hcsr04;
#[cfg(test)]
pub(crate) mod mock;
pub mod nec;

pub use button::{Button, ButtonListener, ButtonPolarity};
pub use dht::{Dht, DhtFrame, DhtModel, DhtState};
pub use hcsr04::{EchoState, Hcsr04};
pub use nec::{Nec, NecEvent, NecFrame, NecListener, NecState};

use crate::common::{
    error::SensorError,
    events::EdgeSink,
    hal_traits::{Gpio, SensorTimer},
    timing,
};
use core::time::Duration;

/// Decoders that capture a bounded edge sequence for a blocking
/// measurement call.
pub(crate) trait ArmedCapture: EdgeSink {
    fn is_armed(&self) -> bool;
    fn disarm(&mut self);
}

/// Drives a request/response capture to completion.
///
/// Pulls queued edge events and feeds them to the decoder state until it
/// disarms itself, backing off with a short delay while the queue is
/// empty. Exceeding `timeout` disarms the decoder and fails; the caller
/// can re-arm and retry.
pub(crate) fn pump_until_disarmed<IF, S>(
    interface: &mut IF,
    state: &mut S,
    timeout: Duration,
) -> Result<(), SensorError<IF::Error>>
where
    IF: Gpio + SensorTimer,
    S: ArmedCapture,
{
    let deadline = interface.now() + timeout;
    while state.is_armed() {
        match interface.poll_edge() {
            Ok(event) => state.on_edge(event),
            Err(nb::Error::WouldBlock) => {
                if interface.now() >= deadline {
                    state.disarm();
                    return Err(SensorError::Timeout);
                }
                interface.delay_us(timing::MEASURE_POLL_INTERVAL_US);
            }
            Err(nb::Error::Other(e)) => {
                state.disarm();
                return Err(SensorError::Io(e));
            }
        }
    }
    Ok(())
}
