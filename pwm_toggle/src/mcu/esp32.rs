//! [`PwmDriver`] for the LED controller (LEDC) of the ESP32.
//!
//! Only the high speed timers and channels are supported. Writing a duty to the hardware applies
//! it immediately, so assigned duty values are staged in the driver and only written on commit.

use crate::config::{
    ChannelConfig, ChannelNumber, ClockSource, PwmConfig, Resolution, SpeedMode, TimerNumber,
};
use crate::driver::PwmDriver;
use crate::util::debug;
use esp_hal::gpio::{AnyPin, DriveMode, Pin};
use esp_hal::ledc::channel::{self, ChannelHW, ChannelIFace};
use esp_hal::ledc::timer::{self, HSClockSource, TimerIFace};
use esp_hal::ledc::{HighSpeed, Ledc};
use esp_hal::peripherals::LEDC;
use esp_hal::time::Rate;
use static_cell::StaticCell;

// A configured channel keeps a reference to its timer for as long as it exists.
static TIMER: StaticCell<timer::Timer<'static, HighSpeed>> = StaticCell::new();

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedcError {
    UnsupportedSpeedMode(SpeedMode),
    UnsupportedClockSource(ClockSource),
    UnsupportedResolution(u8),
    /// The LEDC HAL always starts the high period at the beginning of a carrier period.
    UnsupportedHpoint(u32),
    PinMismatch {
        configured: u8,
        available: u8,
    },
    /// The driver already handed out its timer. Only one timer can be configured.
    TimerAlreadyConfigured,
    TimerNotConfigured(TimerNumber),
    /// The output pin is already connected to a channel.
    ChannelAlreadyConfigured,
    ChannelNotConfigured(ChannelNumber),
    Timer(timer::Error),
    Channel(channel::Error),
}

/// Drives one LEDC channel and the high speed timer it is bound to.
pub struct LedcDriver {
    ledc: Ledc<'static>,
    pin: Option<AnyPin<'static>>,
    pin_number: u8,
    timer: Option<(TimerNumber, &'static timer::Timer<'static, HighSpeed>)>,
    channel: Option<(ChannelNumber, channel::Channel<'static, HighSpeed>)>,
    staged_duty: Option<u32>,
}

impl LedcDriver {
    /// Creates the driver for the output `pin`.
    ///
    /// The pin is connected to the channel when the channel gets configured. Its GPIO number
    /// must match [`ChannelConfig::pin`].
    pub fn new(ledc: LEDC<'static>, pin: impl Into<AnyPin<'static>>) -> Self {
        let pin = pin.into();
        Self {
            ledc: Ledc::new(ledc),
            pin_number: pin.number(),
            pin: Some(pin),
            timer: None,
            channel: None,
            staged_duty: None,
        }
    }
}

fn configured_channel(
    configured: &Option<(ChannelNumber, channel::Channel<'static, HighSpeed>)>,
    mode: SpeedMode,
    number: ChannelNumber,
) -> Result<&channel::Channel<'static, HighSpeed>, LedcError> {
    check_speed_mode(mode)?;
    match configured {
        Some((configured, channel)) if *configured == number => Ok(channel),
        _ => Err(LedcError::ChannelNotConfigured(number)),
    }
}

fn check_speed_mode(mode: SpeedMode) -> Result<(), LedcError> {
    match mode {
        SpeedMode::High => Ok(()),
        SpeedMode::Low => Err(LedcError::UnsupportedSpeedMode(mode)),
    }
}

fn clock_source(source: ClockSource) -> Result<HSClockSource, LedcError> {
    match source {
        ClockSource::Auto | ClockSource::Apb => Ok(HSClockSource::APBClk),
        ClockSource::RefTick => Err(LedcError::UnsupportedClockSource(source)),
    }
}

fn timer_number(number: TimerNumber) -> timer::Number {
    match number {
        TimerNumber::Timer0 => timer::Number::Timer0,
        TimerNumber::Timer1 => timer::Number::Timer1,
        TimerNumber::Timer2 => timer::Number::Timer2,
        TimerNumber::Timer3 => timer::Number::Timer3,
    }
}

fn channel_number(number: ChannelNumber) -> channel::Number {
    match number {
        ChannelNumber::Channel0 => channel::Number::Channel0,
        ChannelNumber::Channel1 => channel::Number::Channel1,
        ChannelNumber::Channel2 => channel::Number::Channel2,
        ChannelNumber::Channel3 => channel::Number::Channel3,
        ChannelNumber::Channel4 => channel::Number::Channel4,
        ChannelNumber::Channel5 => channel::Number::Channel5,
        ChannelNumber::Channel6 => channel::Number::Channel6,
        ChannelNumber::Channel7 => channel::Number::Channel7,
    }
}

fn duty_resolution(resolution: Resolution) -> Result<timer::config::Duty, LedcError> {
    timer::config::Duty::try_from(u32::from(resolution.bits()))
        .map_err(|()| LedcError::UnsupportedResolution(resolution.bits()))
}

impl PwmDriver for LedcDriver {
    type Error = LedcError;

    fn configure_timer(&mut self, config: &PwmConfig) -> Result<(), Self::Error> {
        check_speed_mode(config.speed_mode)?;
        if self.timer.is_some() {
            return Err(LedcError::TimerAlreadyConfigured);
        }
        let mut hw_timer = self.ledc.timer::<HighSpeed>(timer_number(config.timer));
        hw_timer
            .configure(timer::config::Config {
                duty: duty_resolution(config.resolution)?,
                clock_source: clock_source(config.clock_source)?,
                frequency: Rate::from_hz(config.frequency_hz),
            })
            .map_err(LedcError::Timer)?;
        let hw_timer: &'static timer::Timer<'static, HighSpeed> = TIMER
            .try_init(hw_timer)
            .ok_or(LedcError::TimerAlreadyConfigured)?;
        self.timer = Some((config.timer, hw_timer));
        debug!("Configured LEDC timer {}", config.timer);
        Ok(())
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), Self::Error> {
        check_speed_mode(config.speed_mode)?;
        if config.hpoint != 0 {
            return Err(LedcError::UnsupportedHpoint(config.hpoint));
        }
        if config.pin != self.pin_number {
            return Err(LedcError::PinMismatch {
                configured: config.pin,
                available: self.pin_number,
            });
        }
        let hw_timer = match self.timer {
            Some((number, hw_timer)) if number == config.timer => hw_timer,
            _ => return Err(LedcError::TimerNotConfigured(config.timer)),
        };
        let pin = self
            .pin
            .take()
            .ok_or(LedcError::ChannelAlreadyConfigured)?;
        let mut hw_channel = self
            .ledc
            .channel::<HighSpeed>(channel_number(config.channel), pin);
        hw_channel
            .configure(channel::config::Config {
                timer: hw_timer,
                duty_pct: 0,
                drive_mode: DriveMode::PushPull,
            })
            .map_err(LedcError::Channel)?;
        // The percentage based configuration can't express every raw duty value
        hw_channel.set_duty_hw(config.duty);
        self.channel = Some((config.channel, hw_channel));
        debug!(
            "Configured LEDC channel {} on GPIO {}",
            config.channel, config.pin
        );
        Ok(())
    }

    fn assign_duty(
        &mut self,
        mode: SpeedMode,
        channel: ChannelNumber,
        duty: u32,
    ) -> Result<(), Self::Error> {
        configured_channel(&self.channel, mode, channel)?;
        self.staged_duty = Some(duty);
        Ok(())
    }

    fn commit_duty(&mut self, mode: SpeedMode, channel: ChannelNumber) -> Result<(), Self::Error> {
        // A failed commit keeps the staged duty
        let hw_channel = configured_channel(&self.channel, mode, channel)?;
        if let Some(duty) = self.staged_duty.take() {
            hw_channel.set_duty_hw(duty);
        }
        Ok(())
    }
}
