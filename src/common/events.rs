// src/common/events.rs

use super::types::PinId;
use core::time::Duration;

/// Direction of a monitored signal transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

/// A timestamped transition reported for a monitored pin.
///
/// Produced by the platform's [`Gpio`](super::hal_traits::Gpio)
/// implementation and consumed exactly once by the owning decoder. The
/// timestamp is time since an arbitrary epoch at microsecond resolution;
/// only differences between timestamps of the same pin are meaningful.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    pub pin: PinId,
    pub edge: Edge,
    pub timestamp: Duration,
}

impl EdgeEvent {
    /// Timestamp in whole microseconds.
    #[inline]
    pub fn micros(&self) -> u64 {
        self.timestamp.as_micros() as u64
    }
}

/// Consumer side of the edge stream.
///
/// Handlers run on the dispatch path shared by all sensors: they must run
/// to completion quickly and must not block. They never report errors to
/// the dispatcher; malformed input resets the protocol state instead.
pub trait EdgeSink {
    fn on_edge(&mut self, event: EdgeEvent);
}

/// Handle returned by [`EdgeDispatcher::subscribe`], used to cancel the
/// subscription later.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Subscription(usize);

/// Returned when the dispatcher's fixed listener table is full.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("edge dispatcher listener table is full")]
pub struct DispatcherFull;

/// Fans incoming edge events out to the decoders registered for each pin.
///
/// An explicit list owned by whoever pumps the event source, rather than
/// a process-wide registry: the integration loop pulls events from
/// [`Gpio::poll_edge`](super::hal_traits::Gpio::poll_edge) and hands them
/// to [`dispatch`](Self::dispatch). Capacity is fixed; no allocation.
pub struct EdgeDispatcher<'a, const N: usize = 8> {
    slots: [Option<(PinId, &'a mut dyn EdgeSink)>; N],
}

impl<'a, const N: usize> EdgeDispatcher<'a, N> {
    pub fn new() -> Self {
        EdgeDispatcher {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Registers `sink` for events on `pin` and returns the cancellation
    /// handle. Several sinks may watch the same pin.
    pub fn subscribe(
        &mut self,
        pin: PinId,
        sink: &'a mut dyn EdgeSink,
    ) -> Result<Subscription, DispatcherFull> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some((pin, sink));
                return Ok(Subscription(index));
            }
        }
        Err(DispatcherFull)
    }

    /// Cancels a subscription. Unknown or already-cancelled handles are
    /// ignored.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        if let Some(slot) = self.slots.get_mut(subscription.0) {
            *slot = None;
        }
    }

    /// Delivers one event to every sink registered for its pin.
    pub fn dispatch(&mut self, event: EdgeEvent) {
        for slot in self.slots.iter_mut() {
            if let Some((pin, sink)) = slot {
                if *pin == event.pin {
                    sink.on_edge(event);
                }
            }
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }
}

impl<'a, const N: usize> Default for EdgeDispatcher<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSink {
        seen: usize,
        last: Option<EdgeEvent>,
    }

    impl EdgeSink for CountingSink {
        fn on_edge(&mut self, event: EdgeEvent) {
            self.seen += 1;
            self.last = Some(event);
        }
    }

    fn event(pin: u8, micros: u64) -> EdgeEvent {
        EdgeEvent {
            pin: PinId(pin),
            edge: Edge::Falling,
            timestamp: Duration::from_micros(micros),
        }
    }

    #[test]
    fn test_dispatch_routes_by_pin() {
        let mut a = CountingSink::default();
        let mut b = CountingSink::default();
        {
            let mut dispatcher: EdgeDispatcher<'_, 4> = EdgeDispatcher::new();
            dispatcher.subscribe(PinId(1), &mut a).unwrap();
            dispatcher.subscribe(PinId(2), &mut b).unwrap();

            dispatcher.dispatch(event(1, 100));
            dispatcher.dispatch(event(1, 200));
            dispatcher.dispatch(event(2, 300));
            dispatcher.dispatch(event(7, 400));
        }
        assert_eq!(a.seen, 2);
        assert_eq!(b.seen, 1);
        assert_eq!(b.last, Some(event(2, 300)));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut a = CountingSink::default();
        {
            let mut dispatcher: EdgeDispatcher<'_, 4> = EdgeDispatcher::new();
            let handle = dispatcher.subscribe(PinId(5), &mut a).unwrap();
            dispatcher.dispatch(event(5, 10));
            dispatcher.unsubscribe(handle);
            dispatcher.dispatch(event(5, 20));
            assert!(dispatcher.is_empty());
        }
        assert_eq!(a.seen, 1);
    }

    #[test]
    fn test_capacity_bound() {
        let mut a = CountingSink::default();
        let mut b = CountingSink::default();
        let mut c = CountingSink::default();
        let mut dispatcher: EdgeDispatcher<'_, 2> = EdgeDispatcher::new();
        dispatcher.subscribe(PinId(1), &mut a).unwrap();
        dispatcher.subscribe(PinId(2), &mut b).unwrap();
        assert_eq!(dispatcher.subscribe(PinId(3), &mut c), Err(DispatcherFull));
        assert_eq!(dispatcher.len(), 2);
    }

    #[test]
    fn test_slot_reuse_after_unsubscribe() {
        let mut a = CountingSink::default();
        let mut b = CountingSink::default();
        {
            let mut dispatcher: EdgeDispatcher<'_, 1> = EdgeDispatcher::new();
            let handle = dispatcher.subscribe(PinId(1), &mut a).unwrap();
            dispatcher.unsubscribe(handle);
            dispatcher.subscribe(PinId(1), &mut b).unwrap();
            dispatcher.dispatch(event(1, 50));
        }
        assert_eq!(a.seen, 0);
        assert_eq!(b.seen, 1);
    }
}
