use crate::config::{ConfigError, DutyLevel};
use embassy_time::Duration;

/// Splits a fixed cycle period into the time spent at the on level and the time spent at the off
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleTiming {
    /// Time from the start of one on phase to the start of the next one.
    pub period: Duration,
    /// Share of the period spent at the on level, in percent.
    pub on_percent: u8,
}

impl CycleTiming {
    pub const fn new(period: Duration, on_percent: u8) -> Self {
        Self { period, on_percent }
    }

    pub const fn on_time(&self) -> Duration {
        Duration::from_millis(self.period.as_millis() * self.on_percent as u64 / 100)
    }

    /// The remainder of the period after the on phase, so both phases always add up to exactly one
    /// period.
    pub const fn off_time(&self) -> Duration {
        Duration::from_millis(self.period.as_millis() - self.on_time().as_millis())
    }

    pub const fn hold_time(&self, level: DutyLevel) -> Duration {
        match level {
            DutyLevel::On => self.on_time(),
            DutyLevel::Off => self.off_time(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period.as_millis() == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if u32::try_from(self.period.as_millis()).is_err() {
            return Err(ConfigError::PeriodTooLong);
        }
        if !(1..=99).contains(&self.on_percent) {
            return Err(ConfigError::InvalidOnPercent {
                percent: self.on_percent,
            });
        }
        Ok(())
    }
}
