// src/sensor/dht.rs

//! Humidity/temperature pulse decoder for DHT11/DHT22 class sensors.
//!
//! The sensor answers an 18 ms start signal with two presence pulses and a
//! 40-bit frame on a shared open-drain line. Every bit is a fixed-width
//! low period followed by a high period whose width encodes the bit, so
//! one falling edge per bit is enough: the inter-edge delta is short for a
//! 0 and long for a 1. A capture is 43 falling edges (the release edge,
//! two presence pulses, then the 40 data bits).

use crate::common::{
    error::SensorError,
    events::{Edge, EdgeEvent, EdgeSink},
    hal_traits::{Gpio, SensorTimer},
    timing,
    types::{EdgeFilter, Level, PinId, PinMode},
};

use super::{pump_until_disarmed, ArmedCapture};

/// Output scaling variant, selected at construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhtModel {
    /// Integer-part / fractional-part byte pairs.
    Dht11,
    /// Signed tenths-of-a-unit 16-bit words.
    Dht22,
}

impl DhtModel {
    /// Scales a raw 16-bit humidity word to percent relative humidity.
    pub fn scale_humidity(self, raw: u16) -> f32 {
        match self {
            DhtModel::Dht11 => (raw >> 8) as f32 + (raw & 0xff) as f32 * 0.1,
            DhtModel::Dht22 => raw as f32 * 0.1,
        }
    }

    /// Scales a raw 16-bit temperature word to degrees Celsius.
    pub fn scale_temperature(self, raw: u16) -> f32 {
        match self {
            DhtModel::Dht11 => (raw >> 8) as f32 + (raw & 0xff) as f32 * 0.1,
            DhtModel::Dht22 => (raw as i16) as f32 * 0.1,
        }
    }
}

/// One validated 40-bit frame, still in raw sensor words.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DhtFrame {
    pub humidity: u16,
    pub temperature: u16,
}

/// The hardware-free accumulation state machine.
///
/// Owns the bounded delta buffer and the armed flag; [`Dht`] wraps it with
/// the start-signal handshake. Kept public so integrations with their own
/// event delivery can feed it directly, and so it can be tested without
/// any hardware.
#[derive(Debug)]
pub struct DhtState {
    pin: PinId,
    deltas: [u32; timing::DHT_FRAME_EDGES],
    count: usize,
    armed: bool,
    last_edge_us: u64,
    bit_one_threshold_us: u32,
    frame: Option<DhtFrame>,
}

impl DhtState {
    pub fn new(pin: PinId) -> Self {
        DhtState {
            pin,
            deltas: [0; timing::DHT_FRAME_EDGES],
            count: 0,
            armed: false,
            last_edge_us: 0,
            bit_one_threshold_us: timing::DHT_BIT_ONE_THRESHOLD_US,
            frame: None,
        }
    }

    /// Resets the accumulation buffer and starts accepting edges.
    pub fn arm(&mut self) {
        self.count = 0;
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Adjusts the microsecond threshold above which a data pulse decodes
    /// as a 1 bit. Deployed decoders for these parts disagree between 110
    /// and 100 for the same physical protocol, hence the knob.
    pub fn set_bit_one_threshold(&mut self, us: u32) {
        self.bit_one_threshold_us = us;
    }

    /// Last validated frame, if any capture has succeeded yet.
    pub fn frame(&self) -> Option<DhtFrame> {
        self.frame
    }

    fn capture_complete(&self) -> bool {
        !self.armed && self.count == timing::DHT_FRAME_EDGES
    }

    /// Decodes and validates the captured delta buffer, caching the frame.
    ///
    /// The checksum byte must equal the low eight bits of the sum of the
    /// four data bytes; on mismatch the previously cached frame survives.
    fn decode<E>(&mut self) -> Result<DhtFrame, SensorError<E>>
    where
        E: core::fmt::Debug,
    {
        if !self.capture_complete() {
            return Err(SensorError::DataError);
        }

        let mut humidity: u16 = 0;
        let mut temperature: u16 = 0;
        for i in 0..16 {
            humidity <<= 1;
            temperature <<= 1;
            if self.deltas[3 + i] >= self.bit_one_threshold_us {
                humidity |= 1;
            }
            if self.deltas[3 + 16 + i] >= self.bit_one_threshold_us {
                temperature |= 1;
            }
        }
        let mut checksum: u8 = 0;
        for i in 0..8 {
            checksum <<= 1;
            if self.deltas[3 + 32 + i] >= self.bit_one_threshold_us {
                checksum |= 1;
            }
        }

        let sum = (humidity >> 8) + (humidity & 0xff) + (temperature >> 8) + (temperature & 0xff);
        let computed = (sum & 0xff) as u8;
        if checksum != computed {
            return Err(SensorError::Checksum {
                expected: checksum,
                computed,
            });
        }

        let frame = DhtFrame {
            humidity,
            temperature,
        };
        self.frame = Some(frame);
        Ok(frame)
    }
}

impl EdgeSink for DhtState {
    fn on_edge(&mut self, event: EdgeEvent) {
        if !self.armed || event.pin != self.pin || event.edge != Edge::Falling {
            return;
        }
        let time = event.micros();
        if self.count == 0 {
            self.last_edge_us = time;
        }
        let delta = time.saturating_sub(self.last_edge_us);
        self.deltas[self.count] = u32::try_from(delta).unwrap_or(u32::MAX);
        self.count += 1;
        self.last_edge_us = time;
        if self.count >= self.deltas.len() {
            self.armed = false;
        }
    }
}

impl ArmedCapture for DhtState {
    fn is_armed(&self) -> bool {
        DhtState::is_armed(self)
    }

    fn disarm(&mut self) {
        DhtState::disarm(self)
    }
}

/// Blocking measurement facade over a DHT data pin.
#[derive(Debug)]
pub struct Dht<IF>
where
    IF: Gpio + SensorTimer,
{
    interface: IF,
    model: DhtModel,
    state: DhtState,
}

impl<IF> Dht<IF>
where
    IF: Gpio + SensorTimer,
{
    /// Claims the data pin: open-drain, released high, falling edges
    /// reported with the noise filter applied.
    pub fn new(
        mut interface: IF,
        pin: PinId,
        model: DhtModel,
    ) -> Result<Self, SensorError<IF::Error>> {
        interface.configure_pin(pin, PinMode::OutputOpenDrain)?;
        interface.write_pin(pin, Level::High)?;
        interface.set_edge_notification(pin, EdgeFilter::Falling, timing::DHT_EDGE_FILTER_US)?;
        Ok(Dht {
            interface,
            model,
            state: DhtState::new(pin),
        })
    }

    /// See [`DhtState::set_bit_one_threshold`].
    pub fn set_bit_one_threshold(&mut self, us: u32) {
        self.state.set_bit_one_threshold(us);
    }

    /// Runs one measurement cycle: start signal, capture, decode.
    ///
    /// Blocks (polling with a cooperative back-off) until the frame is
    /// complete or the 500 ms deadline expires. On success the reading is
    /// cached for the accessors; on any failure the previous reading
    /// survives and the decoder is left disarmed.
    pub fn measure(&mut self) -> Result<(), SensorError<IF::Error>> {
        let pin = self.state.pin;
        self.state.arm();

        // Start signal: hold the line low for 18 ms, then release it and
        // let the sensor answer.
        if let Err(e) = self.start_signal(pin) {
            self.state.disarm();
            return Err(e);
        }

        pump_until_disarmed(
            &mut self.interface,
            &mut self.state,
            timing::DHT_RESPONSE_TIMEOUT,
        )?;

        self.state.decode()?;
        Ok(())
    }

    fn start_signal(&mut self, pin: PinId) -> Result<(), SensorError<IF::Error>> {
        self.interface.write_pin(pin, Level::Low)?;
        self.interface
            .delay_ms(timing::DHT_START_LOW.as_millis() as u32);
        self.interface.write_pin(pin, Level::High)?;
        Ok(())
    }

    /// Relative humidity in percent, or `None` before the first
    /// successful measurement.
    pub fn humidity(&self) -> Option<f32> {
        self.state
            .frame()
            .map(|f| self.model.scale_humidity(f.humidity))
    }

    /// Temperature in degrees Celsius, or `None` before the first
    /// successful measurement.
    pub fn temperature(&self) -> Option<f32> {
        self.state
            .frame()
            .map(|f| self.model.scale_temperature(f.temperature))
    }

    pub fn data_pin(&self) -> PinId {
        self.state.pin
    }

    /// Releases the underlying interface.
    pub fn free(self) -> IF {
        self.interface
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::events::Edge;
    use core::time::Duration;

    // --- Synthetic frame construction ---

    const BIT_ONE_US: u32 = 122;
    const BIT_ZERO_US: u32 = 76;
    const PRESENCE_US: u32 = 130;

    /// Builds the 43 inter-edge deltas for a frame carrying the given
    /// words (checksum byte included by the caller).
    fn frame_deltas(humidity: u16, temperature: u16, checksum: u8) -> [u32; 43] {
        let mut deltas = [0u32; 43];
        deltas[1] = PRESENCE_US;
        deltas[2] = PRESENCE_US;
        for i in 0..16 {
            deltas[3 + i] = if humidity & (1 << (15 - i)) != 0 {
                BIT_ONE_US
            } else {
                BIT_ZERO_US
            };
            deltas[3 + 16 + i] = if temperature & (1 << (15 - i)) != 0 {
                BIT_ONE_US
            } else {
                BIT_ZERO_US
            };
        }
        for i in 0..8 {
            deltas[3 + 32 + i] = if checksum & (1 << (7 - i)) != 0 {
                BIT_ONE_US
            } else {
                BIT_ZERO_US
            };
        }
        deltas
    }

    fn checksum_for(humidity: u16, temperature: u16) -> u8 {
        let sum =
            (humidity >> 8) + (humidity & 0xff) + (temperature >> 8) + (temperature & 0xff);
        (sum & 0xff) as u8
    }

    fn feed_deltas(state: &mut DhtState, pin: PinId, deltas: &[u32], start_us: u64) {
        let mut time = start_us;
        for (i, delta) in deltas.iter().enumerate() {
            if i > 0 {
                time += *delta as u64;
            }
            state.on_edge(EdgeEvent {
                pin,
                edge: Edge::Falling,
                timestamp: Duration::from_micros(time),
            });
        }
    }

    // --- State machine tests (no hardware) ---

    #[test]
    fn test_decode_known_dht11_frame() {
        // 47.0 %RH, 24.5 degC in DHT11 integer/fraction encoding.
        let humidity = 0x2F00;
        let temperature = 0x1805;
        let checksum = checksum_for(humidity, temperature);

        let mut state = DhtState::new(PinId(4));
        state.arm();
        feed_deltas(
            &mut state,
            PinId(4),
            &frame_deltas(humidity, temperature, checksum),
            10_000,
        );
        assert!(!state.is_armed());

        let frame = state.decode::<()>().unwrap();
        assert_eq!(frame.humidity, humidity);
        assert_eq!(frame.temperature, temperature);
        assert_eq!(DhtModel::Dht11.scale_humidity(frame.humidity), 47.0);
        assert_eq!(DhtModel::Dht11.scale_temperature(frame.temperature), 24.5);
    }

    #[test]
    fn test_decode_dht22_scaling_incl_negative() {
        // 65.2 %RH and -10.5 degC as signed tenths.
        let humidity = 652u16;
        let temperature = (-105i16) as u16;
        let checksum = checksum_for(humidity, temperature);

        let mut state = DhtState::new(PinId(4));
        state.arm();
        feed_deltas(
            &mut state,
            PinId(4),
            &frame_deltas(humidity, temperature, checksum),
            10_000,
        );

        let frame = state.decode::<()>().unwrap();
        let rh = DhtModel::Dht22.scale_humidity(frame.humidity);
        let t = DhtModel::Dht22.scale_temperature(frame.temperature);
        assert!((rh - 65.2).abs() < 1e-4);
        assert!((t + 10.5).abs() < 1e-4);
    }

    #[test]
    fn test_checksum_corruption_detected() {
        let humidity = 0x2F00;
        let temperature = 0x1805;
        // Flip the lowest checksum bit.
        let checksum = checksum_for(humidity, temperature) ^ 0x01;

        let mut state = DhtState::new(PinId(4));
        state.arm();
        feed_deltas(
            &mut state,
            PinId(4),
            &frame_deltas(humidity, temperature, checksum),
            10_000,
        );

        let result = state.decode::<()>();
        assert!(matches!(result, Err(SensorError::Checksum { .. })));
        // Nothing gets cached from a bad frame.
        assert_eq!(state.frame(), None);
    }

    #[test]
    fn test_edges_ignored_when_disarmed_or_foreign() {
        let mut state = DhtState::new(PinId(4));

        // Disarmed: nothing accumulates.
        state.on_edge(EdgeEvent {
            pin: PinId(4),
            edge: Edge::Falling,
            timestamp: Duration::from_micros(100),
        });
        assert_eq!(state.count, 0);

        state.arm();
        // Wrong pin and rising edges are not qualifying events.
        state.on_edge(EdgeEvent {
            pin: PinId(5),
            edge: Edge::Falling,
            timestamp: Duration::from_micros(200),
        });
        state.on_edge(EdgeEvent {
            pin: PinId(4),
            edge: Edge::Rising,
            timestamp: Duration::from_micros(300),
        });
        assert_eq!(state.count, 0);
    }

    #[test]
    fn test_buffer_never_grows_past_frame_length() {
        let humidity = 0x2F00;
        let temperature = 0x1805;
        let checksum = checksum_for(humidity, temperature);
        let deltas = frame_deltas(humidity, temperature, checksum);

        let mut state = DhtState::new(PinId(4));
        state.arm();
        feed_deltas(&mut state, PinId(4), &deltas, 10_000);
        assert_eq!(state.count, 43);

        // A 44th edge is dropped because the capture disarmed itself.
        state.on_edge(EdgeEvent {
            pin: PinId(4),
            edge: Edge::Falling,
            timestamp: Duration::from_micros(1_000_000),
        });
        assert_eq!(state.count, 43);
    }

    // --- Facade tests over the shared mock interface ---

    use crate::sensor::mock::MockInterface;

    fn stage_frame(interface: &mut MockInterface, pin: PinId, deltas: &[u32], start_us: u64) {
        let mut staged = [EdgeEvent {
            pin,
            edge: Edge::Falling,
            timestamp: Duration::ZERO,
        }; 43];
        let mut time = start_us;
        for (i, delta) in deltas.iter().enumerate() {
            if i > 0 {
                time += *delta as u64;
            }
            staged[i].timestamp = Duration::from_micros(time);
        }
        interface.stage_events(&staged);
    }

    #[test]
    fn test_measure_end_to_end() {
        let humidity = 0x2F00;
        let temperature = 0x1805;
        let checksum = checksum_for(humidity, temperature);

        let mut interface = MockInterface::new();
        stage_frame(
            &mut interface,
            PinId(4),
            &frame_deltas(humidity, temperature, checksum),
            25_000,
        );

        let mut dht = Dht::new(interface, PinId(4), DhtModel::Dht11).unwrap();
        assert_eq!(dht.humidity(), None);
        assert_eq!(dht.temperature(), None);

        dht.measure().unwrap();
        assert_eq!(dht.humidity(), Some(47.0));
        assert_eq!(dht.temperature(), Some(24.5));

        // Handshake drove the line low then released it.
        let interface = dht.free();
        assert_eq!(interface.level_log[0], Some((PinId(4), Level::High))); // constructor release
        assert_eq!(interface.level_log[1], Some((PinId(4), Level::Low)));
        assert_eq!(interface.level_log[2], Some((PinId(4), Level::High)));
        // The 18 ms start signal advanced the clock.
        assert!(interface.now_us >= 18_000);
    }

    #[test]
    fn test_measure_timeout_leaves_decoder_rearmable() {
        let interface = MockInterface::new(); // no staged edges
        let mut dht = Dht::new(interface, PinId(4), DhtModel::Dht11).unwrap();

        let result = dht.measure();
        assert!(matches!(result, Err(SensorError::Timeout)));
        assert!(!dht.state.is_armed());
        assert_eq!(dht.humidity(), None);

        // A subsequent cycle with real edges succeeds cleanly.
        let humidity = 0x2F00;
        let temperature = 0x1805;
        let checksum = checksum_for(humidity, temperature);
        stage_frame(
            &mut dht.interface,
            PinId(4),
            &frame_deltas(humidity, temperature, checksum),
            600_000,
        );
        dht.measure().unwrap();
        assert_eq!(dht.humidity(), Some(47.0));
    }

    #[test]
    fn test_measure_is_idempotent_for_identical_timing() {
        let humidity = 652u16;
        let temperature = 251u16; // 25.1 degC
        let checksum = checksum_for(humidity, temperature);
        let deltas = frame_deltas(humidity, temperature, checksum);

        let mut interface = MockInterface::new();
        stage_frame(&mut interface, PinId(2), &deltas, 25_000);
        let mut dht = Dht::new(interface, PinId(2), DhtModel::Dht22).unwrap();

        dht.measure().unwrap();
        let first = (dht.humidity(), dht.temperature());

        stage_frame(&mut dht.interface, PinId(2), &deltas, 900_000);
        dht.measure().unwrap();
        assert_eq!((dht.humidity(), dht.temperature()), first);
    }

    #[test]
    fn test_checksum_error_preserves_cached_reading() {
        let humidity = 0x2F00;
        let temperature = 0x1805;
        let checksum = checksum_for(humidity, temperature);
        let mut interface = MockInterface::new();
        stage_frame(
            &mut interface,
            PinId(4),
            &frame_deltas(humidity, temperature, checksum),
            25_000,
        );
        let mut dht = Dht::new(interface, PinId(4), DhtModel::Dht11).unwrap();
        dht.measure().unwrap();

        // Second cycle delivers a corrupted frame.
        stage_frame(
            &mut dht.interface,
            PinId(4),
            &frame_deltas(humidity, temperature, checksum ^ 0x80),
            900_000,
        );
        let result = dht.measure();
        assert!(matches!(result, Err(SensorError::Checksum { .. })));
        assert_eq!(dht.humidity(), Some(47.0));
        assert_eq!(dht.temperature(), Some(24.5));
    }
}
