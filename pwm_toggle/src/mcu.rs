//! Implementations of [`PwmDriver`](crate::PwmDriver) for specific microcontrollers.

#[cfg(feature = "esp32")]
pub mod esp32;
