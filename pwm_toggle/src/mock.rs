//! A recording PWM driver and a delay that advances a virtual clock instead of sleeping.

use crate::config::{ChannelConfig, ChannelNumber, PwmConfig, SpeedMode};
use crate::driver::PwmDriver;
use core::cell::{Cell, RefCell};
use embassy_futures::yield_now;
use embedded_hal_async::delay::DelayNs;
use std::vec::Vec;

const NANOS_PER_MILLI: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ConfigureTimer(PwmConfig),
    ConfigureChannel(ChannelConfig),
    Assign(SpeedMode, ChannelNumber, u32),
    Commit(SpeedMode, ChannelNumber),
}

/// Shared record of everything that happened to the mock peripheral, together with the virtual
/// time at which it happened.
#[derive(Default)]
pub struct Timeline {
    now_ns: Cell<u64>,
    events: RefCell<Vec<Event>>,
    commits: RefCell<Vec<(u64, u32)>>,
    delays_ms: RefCell<Vec<u32>>,
    output: Cell<Option<u32>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ns.get() / NANOS_PER_MILLI
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    /// Committed duty values with the virtual time in milliseconds at which they became visible.
    pub fn commits(&self) -> Vec<(u64, u32)> {
        self.commits.borrow().clone()
    }

    pub fn delays_ms(&self) -> Vec<u32> {
        self.delays_ms.borrow().clone()
    }

    /// The duty that is currently visible on the output pin.
    pub fn output(&self) -> Option<u32> {
        self.output.get()
    }

    /// Completes once the virtual clock reached `ms`.
    pub async fn wait_until_ms(&self, ms: u64) {
        while self.now_ms() < ms {
            yield_now().await;
        }
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn advance(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get() + ns);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    ConfigureTimer,
    ConfigureChannel,
    Assign,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub MockFailure);

pub struct MockDriver<'a> {
    timeline: &'a Timeline,
    staged: Option<u32>,
    failure: Option<MockFailure>,
}

impl<'a> MockDriver<'a> {
    pub fn new(timeline: &'a Timeline) -> Self {
        Self {
            timeline,
            staged: None,
            failure: None,
        }
    }

    /// Makes the given operation fail every time it is called.
    pub fn fail(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn recover(&mut self) {
        self.failure = None;
    }

    fn check(&self, operation: MockFailure) -> Result<(), MockError> {
        match self.failure {
            Some(failure) if failure == operation => Err(MockError(failure)),
            _ => Ok(()),
        }
    }
}

impl PwmDriver for MockDriver<'_> {
    type Error = MockError;

    fn configure_timer(&mut self, config: &PwmConfig) -> Result<(), Self::Error> {
        self.timeline.record(Event::ConfigureTimer(*config));
        self.check(MockFailure::ConfigureTimer)
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), Self::Error> {
        self.timeline.record(Event::ConfigureChannel(*config));
        self.check(MockFailure::ConfigureChannel)?;
        self.timeline.output.set(Some(config.duty));
        Ok(())
    }

    fn assign_duty(
        &mut self,
        mode: SpeedMode,
        channel: ChannelNumber,
        duty: u32,
    ) -> Result<(), Self::Error> {
        self.timeline.record(Event::Assign(mode, channel, duty));
        self.check(MockFailure::Assign)?;
        self.staged = Some(duty);
        Ok(())
    }

    fn commit_duty(&mut self, mode: SpeedMode, channel: ChannelNumber) -> Result<(), Self::Error> {
        self.timeline.record(Event::Commit(mode, channel));
        self.check(MockFailure::Commit)?;
        if let Some(duty) = self.staged.take() {
            self.timeline.output.set(Some(duty));
            self.timeline
                .commits
                .borrow_mut()
                .push((self.timeline.now_ms(), duty));
        }
        Ok(())
    }
}

/// Advances the virtual clock of a [`Timeline`] by the requested time and then yields once, so
/// that other futures polled alongside get a chance to observe the new time.
pub struct VirtualDelay<'a> {
    timeline: &'a Timeline,
}

impl<'a> VirtualDelay<'a> {
    pub fn new(timeline: &'a Timeline) -> Self {
        Self { timeline }
    }
}

impl DelayNs for VirtualDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.timeline.advance(ns as u64);
        yield_now().await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.timeline.delays_ms.borrow_mut().push(ms);
        self.timeline.advance(ms as u64 * NANOS_PER_MILLI);
        yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use std::vec;

    #[test]
    fn commit_applies_staged_duty() {
        let timeline = Timeline::new();
        let mut driver = MockDriver::new(&timeline);
        driver
            .assign_duty(SpeedMode::High, ChannelNumber::Channel0, 10)
            .unwrap();
        assert_eq!(timeline.output(), None);
        driver
            .commit_duty(SpeedMode::High, ChannelNumber::Channel0)
            .unwrap();
        assert_eq!(timeline.output(), Some(10));
        assert_eq!(timeline.commits(), vec![(0, 10)]);
    }

    #[test]
    fn only_the_selected_operation_fails() {
        let timeline = Timeline::new();
        let mut driver = MockDriver::new(&timeline).fail(MockFailure::Assign);
        assert_eq!(
            driver.assign_duty(SpeedMode::High, ChannelNumber::Channel0, 10),
            Err(MockError(MockFailure::Assign))
        );
        assert_eq!(
            driver.commit_duty(SpeedMode::High, ChannelNumber::Channel0),
            Ok(())
        );
        assert!(timeline.commits().is_empty());
    }

    #[test]
    fn failed_commit_keeps_staged_duty() {
        let timeline = Timeline::new();
        let mut driver = MockDriver::new(&timeline).fail(MockFailure::Commit);
        driver
            .assign_duty(SpeedMode::High, ChannelNumber::Channel0, 191)
            .unwrap();
        assert_eq!(
            driver.commit_duty(SpeedMode::High, ChannelNumber::Channel0),
            Err(MockError(MockFailure::Commit))
        );
        assert_eq!(timeline.output(), None);

        driver.recover();
        driver
            .commit_duty(SpeedMode::High, ChannelNumber::Channel0)
            .unwrap();
        assert_eq!(timeline.output(), Some(191));
        assert_eq!(timeline.commits(), vec![(0, 191)]);
    }

    #[test]
    fn virtual_delay_advances_clock() {
        let timeline = Timeline::new();
        let mut delay = VirtualDelay::new(&timeline);
        block_on(delay.delay_ms(1250));
        block_on(delay.delay_us(500));
        assert_eq!(timeline.now_ms(), 1250);
        assert_eq!(timeline.delays_ms(), vec![1250]);
        block_on(delay.delay_us(500));
        assert_eq!(timeline.now_ms(), 1251);
    }
}
