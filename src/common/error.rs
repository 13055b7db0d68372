// src/common/error.rs

/// Errors surfaced by the blocking sensor calls.
///
/// The edge-event handlers themselves never fail: malformed timing simply
/// resets the protocol state machine. Everything listed here is reported
/// synchronously from `measure()`-style calls or from bus enumeration, and
/// none of it is fatal to the process.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E = ()>
where
    E: core::fmt::Debug, // Debug is the minimum bound for the Io format string
{
    /// Underlying I/O error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// Measurement did not complete within its deadline. The decoder is
    /// left disarmed; retrying is always safe.
    #[error("measurement timed out")]
    Timeout,

    /// A captured frame failed its additive checksum. The cached reading
    /// keeps its previous value.
    #[error("checksum mismatch: expected {expected:#04x}, computed {computed:#04x}")]
    Checksum { expected: u8, computed: u8 },

    /// A byte and its paired complement byte disagree.
    #[error("complement mismatch: {value:#04x} vs {complement:#04x}")]
    ComplementMismatch { value: u8, complement: u8 },

    /// Physically implausible timing was captured (e.g. an echo ending
    /// before it began).
    #[error("implausible timing captured")]
    DataError,

    /// A single-wire bus transaction went wrong. Fatal for the current
    /// enumeration pass only.
    #[error("one-wire bus fault: {0}")]
    Bus(BusFault),
}

/// The ways a single-wire bus search can go wrong.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusFault {
    /// A 2-bit read slot answered `11`: no device drove the bus.
    #[error("no device responded")]
    NoResponse,

    /// Every retry of a search pass produced a CRC-invalid ROM code.
    #[error("search passes exhausted on invalid ROM codes")]
    SearchExhausted,
}

// Allow mapping from the underlying HAL error with `?`.
impl<E: core::fmt::Debug> From<E> for SensorError<E> {
    fn from(e: E) -> Self {
        SensorError::Io(e)
    }
}
