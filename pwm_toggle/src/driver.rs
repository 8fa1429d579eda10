//! The interface of the PWM peripheral that the toggler drives.

use crate::config::{ChannelConfig, ChannelNumber, PwmConfig, SpeedMode};

/// Error type of a [`PwmDriver`].
///
/// With the `defmt` feature enabled the error also has to be loggable via `defmt`.
#[cfg(feature = "defmt")]
pub trait DriverError: core::fmt::Debug + defmt::Format {}

#[cfg(feature = "defmt")]
impl<T: core::fmt::Debug + defmt::Format> DriverError for T {}

/// Error type of a [`PwmDriver`].
#[cfg(not(feature = "defmt"))]
pub trait DriverError: core::fmt::Debug {}

#[cfg(not(feature = "defmt"))]
impl<T: core::fmt::Debug> DriverError for T {}

/// A PWM peripheral with separately configured timers and channels.
///
/// Duty changes are two-step: [`assign_duty`](Self::assign_duty) only stages a value and
/// [`commit_duty`](Self::commit_duty) makes the staged value visible on the output pin.
pub trait PwmDriver {
    type Error: DriverError;

    /// Configures the timer described by `config`.
    fn configure_timer(&mut self, config: &PwmConfig) -> Result<(), Self::Error>;

    /// Binds the channel to its timer and output pin and starts outputting the initial duty.
    ///
    /// Must be called after [`configure_timer`](Self::configure_timer).
    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), Self::Error>;

    /// Stages a new duty value for the channel.
    fn assign_duty(
        &mut self,
        mode: SpeedMode,
        channel: ChannelNumber,
        duty: u32,
    ) -> Result<(), Self::Error>;

    /// Applies the staged duty value to the output.
    ///
    /// If the commit fails the staged value stays staged.
    fn commit_duty(&mut self, mode: SpeedMode, channel: ChannelNumber) -> Result<(), Self::Error>;
}

impl<T: PwmDriver + ?Sized> PwmDriver for &mut T {
    type Error = T::Error;

    fn configure_timer(&mut self, config: &PwmConfig) -> Result<(), Self::Error> {
        T::configure_timer(self, config)
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), Self::Error> {
        T::configure_channel(self, config)
    }

    fn assign_duty(
        &mut self,
        mode: SpeedMode,
        channel: ChannelNumber,
        duty: u32,
    ) -> Result<(), Self::Error> {
        T::assign_duty(self, mode, channel, duty)
    }

    fn commit_duty(&mut self, mode: SpeedMode, channel: ChannelNumber) -> Result<(), Self::Error> {
        T::commit_duty(self, mode, channel)
    }
}
