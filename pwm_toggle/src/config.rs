//! Static configuration of the PWM output.
//!
//! Everything in here is constructed once, usually as a `const`, and handed to the
//! [`Toggler`](crate::Toggler) by reference. Nothing is reconfigured at runtime.

use crate::timing::CycleTiming;
use derive_more::Display;
use embassy_time::Duration;

/// Clock domain of the PWM timer and channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    /// Duty changes take effect through the hardware update mechanism of the high speed domain.
    #[display("high speed")]
    High,
    #[display("low speed")]
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerNumber {
    Timer0,
    Timer1,
    Timer2,
    Timer3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelNumber {
    Channel0,
    Channel1,
    Channel2,
    Channel3,
    Channel4,
    Channel5,
    Channel6,
    Channel7,
}

/// Source clock of the PWM timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Lets the driver pick a source that can reach the requested frequency and resolution.
    Auto,
    /// The APB bus clock.
    Apb,
    /// The 1 MHz reference tick.
    RefTick,
}

/// Bit width of the duty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution(u8);

impl Resolution {
    /// Widest duty range that PWM timers commonly support.
    pub const MAX_BITS: u8 = 20;

    pub const BITS_8: Self = Self(8);

    /// Creates a resolution of `bits` bits.
    ///
    /// Returns [`None`] if `bits` is zero or larger than [`MAX_BITS`](Self::MAX_BITS).
    pub const fn new(bits: u8) -> Option<Self> {
        if bits == 0 || bits > Self::MAX_BITS {
            None
        } else {
            Some(Self(bits))
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The largest duty value that is valid for this resolution (`2^bits - 1`).
    pub const fn max_duty(self) -> u32 {
        (1 << self.0) - 1
    }

    pub const fn contains(self, duty: u32) -> bool {
        duty <= self.max_duty()
    }
}

/// Configuration of the PWM timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    pub timer: TimerNumber,
    pub speed_mode: SpeedMode,
    pub resolution: Resolution,
    /// Carrier frequency in Hz.
    pub frequency_hz: u32,
    pub clock_source: ClockSource,
}

/// Configuration of the PWM channel and the pin it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub channel: ChannelNumber,
    /// The timer that clocks this channel. Must match [`PwmConfig::timer`].
    pub timer: TimerNumber,
    /// GPIO number of the output pin.
    pub pin: u8,
    /// Duty value that is output as soon as the channel is configured.
    pub duty: u32,
    /// Point within one carrier period at which the output goes high.
    pub hpoint: u32,
    /// Must match [`PwmConfig::speed_mode`].
    pub speed_mode: SpeedMode,
}

/// One of the two duty levels the output alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DutyLevel {
    #[display("on")]
    On,
    #[display("off")]
    Off,
}

/// Raw duty values of the two levels.
///
/// The values are stored as they are written to the hardware and never derived from percentages
/// at runtime, e.g. 25 % of 255 is 63.75 which floors to 63 while the off level is 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyLevels {
    pub on: u32,
    pub off: u32,
}

impl DutyLevels {
    pub const fn duty(&self, level: DutyLevel) -> u32 {
        match level {
            DutyLevel::On => self.on,
            DutyLevel::Off => self.off,
        }
    }
}

/// Everything the toggler needs to know, composed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub pwm: PwmConfig,
    pub channel: ChannelConfig,
    pub levels: DutyLevels,
    pub timing: CycleTiming,
}

impl Config {
    pub const LED_GPIO: u8 = 18;
    pub const DUTY_ON: u32 = 191;
    pub const DUTY_OFF: u32 = 64;
    pub const FREQUENCY_HZ: u32 = 1000;
    pub const CYCLE_PERIOD: Duration = Duration::from_millis(5000);
    pub const ON_PERCENT: u8 = 75;

    /// An LED on GPIO 18 driven by high speed timer 0 and channel 0 with an 8 bit, 1 kHz carrier,
    /// on for 75 % and off for 25 % of a 5 second cycle. The channel starts at the off level.
    pub const DEFAULT: Self = Self {
        pwm: PwmConfig {
            timer: TimerNumber::Timer0,
            speed_mode: SpeedMode::High,
            resolution: Resolution::BITS_8,
            frequency_hz: Self::FREQUENCY_HZ,
            clock_source: ClockSource::Auto,
        },
        channel: ChannelConfig {
            channel: ChannelNumber::Channel0,
            timer: TimerNumber::Timer0,
            pin: Self::LED_GPIO,
            duty: Self::DUTY_OFF,
            hpoint: 0,
            speed_mode: SpeedMode::High,
        },
        levels: DutyLevels {
            on: Self::DUTY_ON,
            off: Self::DUTY_OFF,
        },
        timing: CycleTiming::new(Self::CYCLE_PERIOD, Self::ON_PERCENT),
    };

    /// Checks that the parts of the configuration are consistent with each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolution = self.pwm.resolution;
        if self.pwm.frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.channel.speed_mode != self.pwm.speed_mode {
            return Err(ConfigError::SpeedModeMismatch {
                timer: self.pwm.speed_mode,
                channel: self.channel.speed_mode,
            });
        }
        if self.channel.timer != self.pwm.timer {
            return Err(ConfigError::TimerMismatch {
                timer: self.pwm.timer,
                channel: self.channel.timer,
            });
        }
        for duty in [self.levels.on, self.levels.off, self.channel.duty] {
            if !resolution.contains(duty) {
                return Err(ConfigError::DutyOutOfRange {
                    duty,
                    max: resolution.max_duty(),
                });
            }
        }
        if !resolution.contains(self.channel.hpoint) {
            return Err(ConfigError::HpointOutOfRange {
                hpoint: self.channel.hpoint,
                max: resolution.max_duty(),
            });
        }
        self.timing.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Inconsistent or out of range configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[display("carrier frequency must not be zero")]
    ZeroFrequency,
    #[display("channel uses {channel} mode but the timer uses {timer} mode")]
    SpeedModeMismatch { timer: SpeedMode, channel: SpeedMode },
    #[display("channel is bound to {channel} but {timer} is configured")]
    TimerMismatch {
        timer: TimerNumber,
        channel: TimerNumber,
    },
    #[display("duty {duty} exceeds the maximum of {max}")]
    DutyOutOfRange { duty: u32, max: u32 },
    #[display("hpoint {hpoint} exceeds the maximum of {max}")]
    HpointOutOfRange { hpoint: u32, max: u32 },
    #[display("cycle period must not be zero")]
    ZeroPeriod,
    #[display("on percentage {percent} is outside of 1..=99")]
    InvalidOnPercent { percent: u8 },
    #[display("cycle period does not fit into a millisecond delay")]
    PeriodTooLong,
}

impl core::error::Error for ConfigError {}
