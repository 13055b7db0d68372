// src/sensor/mock.rs
//
// Shared mock GPIO/timer interface for the sensor unit tests. Staged edge
// events play back through poll_edge in order; delays advance the mock
// clock so deadline logic is observable.

use crate::common::{
    events::EdgeEvent,
    hal_traits::{Gpio, SensorTimer},
    types::{EdgeFilter, Level, PinId, PinMode},
};
use core::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MockInstant(pub u64);

impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockIoError;

pub(crate) struct MockInterface {
    pub now_us: u64,
    pub events: [Option<EdgeEvent>; 64],
    pub event_pos: usize,
    pub level_log: [Option<(PinId, Level)>; 16],
    pub level_pos: usize,
    pub mode_log: [Option<(PinId, PinMode)>; 8],
    pub mode_pos: usize,
    pub filters: [Option<(PinId, EdgeFilter, u32)>; 8],
    pub filter_pos: usize,
}

impl MockInterface {
    pub fn new() -> Self {
        MockInterface {
            now_us: 0,
            events: [None; 64],
            event_pos: 0,
            level_log: [None; 16],
            level_pos: 0,
            mode_log: [None; 8],
            mode_pos: 0,
            filters: [None; 8],
            filter_pos: 0,
        }
    }

    pub fn stage_events(&mut self, events: &[EdgeEvent]) {
        self.events = [None; 64];
        self.event_pos = 0;
        assert!(events.len() <= self.events.len());
        for (i, event) in events.iter().enumerate() {
            self.events[i] = Some(*event);
        }
    }

    /// Most recent filter configuration for `pin`.
    pub fn filter_for(&self, pin: PinId) -> Option<(EdgeFilter, u32)> {
        self.filters[..self.filter_pos]
            .iter()
            .rev()
            .flatten()
            .find(|(p, _, _)| *p == pin)
            .map(|(_, f, us)| (*f, *us))
    }
}

impl SensorTimer for MockInterface {
    type Instant = MockInstant;

    fn now(&self) -> MockInstant {
        MockInstant(self.now_us)
    }

    fn delay_us(&mut self, us: u32) {
        self.now_us = self.now_us.saturating_add(us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_us = self.now_us.saturating_add(ms as u64 * 1000);
    }
}

impl Gpio for MockInterface {
    type Error = MockIoError;

    fn configure_pin(&mut self, pin: PinId, mode: PinMode) -> Result<(), MockIoError> {
        if self.mode_pos < self.mode_log.len() {
            self.mode_log[self.mode_pos] = Some((pin, mode));
            self.mode_pos += 1;
        }
        Ok(())
    }

    fn write_pin(&mut self, pin: PinId, level: Level) -> Result<(), MockIoError> {
        if self.level_pos < self.level_log.len() {
            self.level_log[self.level_pos] = Some((pin, level));
            self.level_pos += 1;
        }
        Ok(())
    }

    fn read_pin(&mut self, _pin: PinId) -> Result<Level, MockIoError> {
        Ok(Level::High)
    }

    fn set_edge_notification(
        &mut self,
        pin: PinId,
        filter: EdgeFilter,
        min_interval_us: u32,
    ) -> Result<(), MockIoError> {
        if self.filter_pos < self.filters.len() {
            self.filters[self.filter_pos] = Some((pin, filter, min_interval_us));
            self.filter_pos += 1;
        }
        Ok(())
    }

    fn clear_edge_notification(&mut self, pin: PinId) -> Result<(), MockIoError> {
        if self.filter_pos < self.filters.len() {
            self.filters[self.filter_pos] = Some((pin, EdgeFilter::None, 0));
            self.filter_pos += 1;
        }
        Ok(())
    }

    fn poll_edge(&mut self) -> nb::Result<EdgeEvent, MockIoError> {
        if self.event_pos < self.events.len() {
            if let Some(event) = self.events[self.event_pos] {
                self.event_pos += 1;
                return Ok(event);
            }
        }
        Err(nb::Error::WouldBlock)
    }
}
