use crate::config::ConfigError;
use derive_more::Display;

/// Errors of the [`Toggler`](crate::Toggler), generic over the error type of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The configuration is inconsistent. Nothing was written to the driver.
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    /// The driver rejected the timer configuration.
    #[display("failed to configure timer: {_0:?}")]
    Timer(E),
    /// The driver rejected the channel configuration.
    #[display("failed to configure channel: {_0:?}")]
    Channel(E),
    /// A duty value outside of the configured resolution was requested.
    #[display("duty {duty} exceeds the maximum of {max}")]
    DutyOutOfRange { duty: u32, max: u32 },
    #[display("failed to assign duty: {_0:?}")]
    Assign(E),
    #[display("failed to commit duty: {_0:?}")]
    Commit(E),
}

impl<E> From<ConfigError> for Error<E> {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}
