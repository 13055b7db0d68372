// src/common/timing.rs

use core::time::Duration;

// Nominal protocol timings. Decoders compare captured inter-edge deltas
// against these windows; the windows already include the slack the
// sensors tolerate, so implementations use them as-is.

// === DHT11 / DHT22 handshake and frame (datasheet "single-bus" timing) ===

/// Host start signal: data line held low before release.
pub const DHT_START_LOW: Duration = Duration::from_millis(18);
/// Deadline for a complete 40-bit frame after the start signal.
pub const DHT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);
/// Noise filter for falling-edge notification on the data pin.
pub const DHT_EDGE_FILTER_US: u32 = 45;
/// Falling edges in one capture: first edge, two presence pulses, 40 bits.
pub const DHT_FRAME_EDGES: usize = 43;
/// Data deltas at or above this many microseconds decode as a 1 bit.
/// Deployed decoders disagree on this constant (110 vs 100), so it is
/// configurable per instance; this is the default.
pub const DHT_BIT_ONE_THRESHOLD_US: u32 = 110;

// === NEC infrared frames (VS1838B receiver, falling edges) ===

/// Idle gap that starts a new frame (leader burst observed).
pub const NEC_FRAME_GAP_US: u64 = 80_000;
/// Idle gap long enough to also invalidate repeat tracking.
pub const NEC_RESTART_GAP_US: u64 = 110_000;
/// Leader-to-first-edge window for a full data frame: 9 ms burst + 4.5 ms
/// space, measured falling edge to falling edge.
pub const NEC_DATA_LEADER_US: core::ops::RangeInclusive<u64> = 12_001..=15_000;
/// Leader window for a repeat code: 9 ms burst + 2.25 ms space.
pub const NEC_REPEAT_LEADER_US: core::ops::RangeInclusive<u64> = 9_001..=12_000;
/// Bit window decoding as logical 1 (2.25 ms period).
pub const NEC_ONE_BIT_US: core::ops::RangeInclusive<u64> = 2_001..=2_500;
/// Bit window decoding as logical 0 (1.12 ms period).
pub const NEC_ZERO_BIT_US: core::ops::RangeInclusive<u64> = 560..=2_000;
/// Bits in a data frame: address, ~address, command, ~command.
pub const NEC_FRAME_BITS: u8 = 32;
/// Noise filter for the receiver pin.
pub const NEC_EDGE_FILTER_US: u32 = 1_000;

// === HC-SR04 ultrasonic ranging ===

/// Trigger pulse width. The sensor needs >= 10 us; 1 ms keeps the pulse
/// reliable on coarse-grained delay implementations.
pub const HCSR_TRIGGER_PULSE: Duration = Duration::from_millis(1);
/// Deadline for the echo pulse to complete.
pub const HCSR_ECHO_TIMEOUT: Duration = Duration::from_millis(500);
/// Speed of sound used by default, meters per second at ~15 degC.
pub const HCSR_SPEED_OF_SOUND_M_S: f32 = 340.0;
/// Ranging beyond this many meters reads as "no data".
pub const HCSR_MAX_RANGE_M: f32 = 4.0;

// === Debounced button ===

/// Debounce filter applied to button edges.
pub const BUTTON_DEBOUNCE_US: u32 = 10_000;

// === Shared measurement plumbing ===

/// Back-off between event-queue polls while a measurement waits.
pub const MEASURE_POLL_INTERVAL_US: u32 = 100;
