//! Drives an LED through a PWM peripheral, alternating between a bright and a dim duty level on a
//! fixed cycle.
//!
//! The peripheral is accessed through the [`PwmDriver`] trait and time passes through
//! [`DelayNs`](embedded_hal_async::delay::DelayNs), so the [`Toggler`] runs on any MCU that has
//! an implementation of both, and on the host in tests.
//!
//! ## Feature flags
#![doc = document_features::document_features!(feature_label = r#"<span class="stab portability"><code>{feature}</code></span>"#)]
#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod driver;
mod error;
pub mod mcu;
#[cfg(test)]
mod mock;
mod timing;
mod toggler;
pub(crate) mod util;

pub use config::{Config, ConfigError, DutyLevel, DutyLevels};
pub use driver::PwmDriver;
pub use error::Error;
pub use timing::CycleTiming;
pub use toggler::{Phase, Toggler, run_forever};
