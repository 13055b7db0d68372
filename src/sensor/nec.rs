// src/sensor/nec.rs

//! NEC infrared remote decoder for VS1838B class receivers.
//!
//! Free-running, unlike the request/response decoders: the receiver idles
//! high and every burst produces a falling edge, so the state machine
//! classifies the interval since the previous falling edge. A frame is a
//! 9 ms leader burst, a 4.5 ms space, then 32 bits (address, inverted
//! address, command, inverted command, LSB first). A 2.25 ms space after
//! the leader instead signals "repeat the previous command". Malformed
//! timing never raises an error; the machine simply returns to idle.

use crate::common::{
    error::SensorError,
    events::{Edge, EdgeEvent, EdgeSink},
    hal_traits::Gpio,
    timing,
    types::{EdgeFilter, PinId, PinMode},
};

/// A validated 32-bit NEC frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NecFrame {
    pub address: u8,
    pub command: u8,
}

impl NecFrame {
    /// Splits a raw 32-bit accumulator into its four bytes and checks
    /// both complement pairs.
    pub fn parse(raw: u32) -> Result<NecFrame, SensorError> {
        let address = (raw & 0xff) as u8;
        let address_inv = ((raw >> 8) & 0xff) as u8;
        let command = ((raw >> 16) & 0xff) as u8;
        let command_inv = ((raw >> 24) & 0xff) as u8;

        if address_inv != !address {
            return Err(SensorError::ComplementMismatch {
                value: address,
                complement: address_inv,
            });
        }
        if command_inv != !command {
            return Err(SensorError::ComplementMismatch {
                value: command,
                complement: command_inv,
            });
        }
        Ok(NecFrame { address, command })
    }
}

/// Notification fired by the decoder.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NecEvent {
    /// A full frame passed both complement checks.
    CommandReceived { address: u8, command: u8 },
    /// A repeat code arrived while a decoded command was still current.
    Repeat { address: u8, command: u8 },
}

/// Callback interface for decoder notifications.
pub trait NecListener {
    fn command_received(&mut self, address: u8, command: u8);
    fn command_repeated(&mut self, _address: u8, _command: u8) {}
}

/// No-op listener for integrations that only poll the accessors.
impl NecListener for () {
    fn command_received(&mut self, _address: u8, _command: u8) {}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum NecPhase {
    Idle,
    AwaitingFrameType,
    AccumulatingBits,
}

/// The hardware-free NEC state machine.
///
/// [`handle_edge`](Self::handle_edge) is the transition function: it
/// consumes one falling-edge timestamp and reports the notification the
/// transition fired, if any.
#[derive(Debug)]
pub struct NecState {
    pin: PinId,
    phase: NecPhase,
    shift: u32,
    bit_count: u8,
    restart: bool,
    /// Timestamp of the last edge seen while idle (frame leader edges).
    idle_ref_us: u64,
    /// Timestamp of the previous qualifying edge, whatever the phase.
    prev_edge_us: u64,
    decoded: Option<(u8, u8)>,
}

impl NecState {
    pub fn new(pin: PinId) -> Self {
        NecState {
            pin,
            phase: NecPhase::Idle,
            shift: 0,
            bit_count: 0,
            restart: false,
            idle_ref_us: 0,
            prev_edge_us: 0,
            decoded: None,
        }
    }

    /// Address of the last decoded frame, until a restart gap follows a
    /// repeat code.
    pub fn address(&self) -> Option<u8> {
        self.decoded.map(|(address, _)| address)
    }

    /// Command of the last decoded frame.
    pub fn command(&self) -> Option<u8> {
        self.decoded.map(|(_, command)| command)
    }

    /// Feeds one edge event through the state machine.
    pub fn handle_edge(&mut self, event: EdgeEvent) -> Option<NecEvent> {
        if event.pin != self.pin || event.edge != Edge::Falling {
            return None;
        }
        let time = event.micros();
        let mut fired = None;

        match self.phase {
            NecPhase::Idle => {
                let delta = time.saturating_sub(self.idle_ref_us);
                self.idle_ref_us = time;
                if delta >= timing::NEC_FRAME_GAP_US {
                    self.shift = 0;
                    self.restart = false;
                    self.phase = NecPhase::AwaitingFrameType;
                }
                if delta >= timing::NEC_RESTART_GAP_US {
                    self.restart = true;
                }
            }
            NecPhase::AwaitingFrameType => {
                let delta = time.saturating_sub(self.prev_edge_us);
                if timing::NEC_DATA_LEADER_US.contains(&delta) {
                    // A full frame follows; whatever was decoded before is
                    // stale from here on.
                    self.decoded = None;
                    self.bit_count = 0;
                    self.phase = NecPhase::AccumulatingBits;
                } else {
                    if timing::NEC_REPEAT_LEADER_US.contains(&delta) {
                        if self.restart {
                            self.decoded = None;
                        } else if let Some((address, command)) = self.decoded {
                            fired = Some(NecEvent::Repeat { address, command });
                        }
                    }
                    self.phase = NecPhase::Idle;
                }
            }
            NecPhase::AccumulatingBits => {
                let delta = time.saturating_sub(self.prev_edge_us);
                self.shift >>= 1;
                self.bit_count += 1;
                if timing::NEC_ONE_BIT_US.contains(&delta) {
                    self.shift |= 0x8000_0000;
                } else if !timing::NEC_ZERO_BIT_US.contains(&delta) {
                    // Out-of-spec pulse: abort the frame.
                    self.phase = NecPhase::Idle;
                    self.prev_edge_us = time;
                    return None;
                }
                if self.bit_count >= timing::NEC_FRAME_BITS {
                    self.phase = NecPhase::Idle;
                    if let Ok(frame) = NecFrame::parse(self.shift) {
                        self.decoded = Some((frame.address, frame.command));
                        fired = Some(NecEvent::CommandReceived {
                            address: frame.address,
                            command: frame.command,
                        });
                    }
                }
            }
        }

        self.prev_edge_us = time;
        fired
    }
}

/// Infrared receiver facade owning the pin configuration and an optional
/// listener. Feed it through an
/// [`EdgeDispatcher`](crate::common::events::EdgeDispatcher) or call
/// [`NecState::handle_edge`] directly.
#[derive(Debug)]
pub struct Nec<IF, L = ()>
where
    IF: Gpio,
    L: NecListener,
{
    interface: IF,
    state: NecState,
    listener: Option<L>,
}

impl<IF, L> Nec<IF, L>
where
    IF: Gpio,
    L: NecListener,
{
    /// Claims the receiver pin as a floating input. Edge notification
    /// stays off until a listener is attached.
    pub fn new(mut interface: IF, pin: PinId) -> Result<Self, SensorError<IF::Error>> {
        interface.configure_pin(pin, PinMode::InputFloating)?;
        Ok(Nec {
            interface,
            state: NecState::new(pin),
            listener: None,
        })
    }

    /// Attaches the listener and enables falling-edge notification.
    pub fn listen(&mut self, listener: L) -> Result<(), SensorError<IF::Error>> {
        if self.listener.is_none() {
            self.interface.set_edge_notification(
                self.state.pin,
                EdgeFilter::Falling,
                timing::NEC_EDGE_FILTER_US,
            )?;
        }
        self.listener = Some(listener);
        Ok(())
    }

    /// Detaches the listener and disables edge notification.
    pub fn unlisten(&mut self) -> Result<Option<L>, SensorError<IF::Error>> {
        if self.listener.is_some() {
            self.interface.clear_edge_notification(self.state.pin)?;
        }
        Ok(self.listener.take())
    }

    /// Address of the last decoded frame, or `None` if nothing valid has
    /// arrived yet.
    pub fn address(&self) -> Option<u8> {
        self.state.address()
    }

    /// Command of the last decoded frame.
    pub fn command(&self) -> Option<u8> {
        self.state.command()
    }

    pub fn data_pin(&self) -> PinId {
        self.state.pin
    }

    pub fn listener(&self) -> Option<&L> {
        self.listener.as_ref()
    }

    /// Releases the underlying interface.
    pub fn free(self) -> IF {
        self.interface
    }
}

impl<IF, L> EdgeSink for Nec<IF, L>
where
    IF: Gpio,
    L: NecListener,
{
    fn on_edge(&mut self, event: EdgeEvent) {
        let fired = self.state.handle_edge(event);
        if let (Some(event), Some(listener)) = (fired, self.listener.as_mut()) {
            match event {
                NecEvent::CommandReceived { address, command } => {
                    listener.command_received(address, command)
                }
                NecEvent::Repeat { address, command } => {
                    listener.command_repeated(address, command)
                }
            }
        }
    }
}
