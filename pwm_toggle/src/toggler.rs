use crate::config::{Config, DutyLevel};
use crate::driver::PwmDriver;
use crate::error::Error;
use crate::util::{debug, error, info, panic};
use core::convert::Infallible;
use embedded_hal_async::delay::DelayNs;

/// The two phases of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    High,
    Low,
}

impl Phase {
    pub const fn level(self) -> DutyLevel {
        match self {
            Phase::High => DutyLevel::On,
            Phase::Low => DutyLevel::Off,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Phase::High => Phase::Low,
            Phase::Low => Phase::High,
        }
    }
}

/// Alternates the duty cycle of a single PWM channel between the on and the off level.
///
/// A `Toggler` can only be obtained through [`initialize`](Self::initialize), so the timer and
/// the channel are always configured before the first duty change.
pub struct Toggler<'a, D> {
    driver: D,
    config: &'a Config,
    duty: u32,
}

impl<'a, D: PwmDriver> Toggler<'a, D> {
    /// Configures the timer and then the channel, which starts out at the initial duty of the
    /// channel configuration.
    ///
    /// An error means that the output is not usable and must not be driven any further.
    pub fn initialize(mut driver: D, config: &'a Config) -> Result<Self, Error<D::Error>> {
        config.validate()?;
        driver.configure_timer(&config.pwm).map_err(Error::Timer)?;
        driver
            .configure_channel(&config.channel)
            .map_err(Error::Channel)?;
        info!(
            "PWM output on GPIO {} armed ({} Hz, {} bit, duty {})",
            config.channel.pin,
            config.pwm.frequency_hz,
            config.pwm.resolution.bits(),
            config.channel.duty
        );
        Ok(Self {
            driver,
            config,
            duty: config.channel.duty,
        })
    }

    /// The duty value that was last committed to the output.
    pub fn duty(&self) -> u32 {
        self.duty
    }

    /// Stages `duty` and commits it to the output.
    pub fn set_duty(&mut self, duty: u32) -> Result<(), Error<D::Error>> {
        let resolution = self.config.pwm.resolution;
        if !resolution.contains(duty) {
            return Err(Error::DutyOutOfRange {
                duty,
                max: resolution.max_duty(),
            });
        }
        let mode = self.config.channel.speed_mode;
        let channel = self.config.channel.channel;
        self.driver
            .assign_duty(mode, channel, duty)
            .map_err(Error::Assign)?;
        self.driver
            .commit_duty(mode, channel)
            .map_err(Error::Commit)?;
        self.duty = duty;
        Ok(())
    }

    pub fn set_level(&mut self, level: DutyLevel) -> Result<(), Error<D::Error>> {
        self.set_duty(self.config.levels.duty(level))
    }

    /// Sets the level of `phase` and holds it for the phase's share of the cycle.
    pub async fn run_phase(
        &mut self,
        phase: Phase,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<D::Error>> {
        let level = phase.level();
        self.set_level(level)?;
        let hold_time = self.config.timing.hold_time(level);
        debug!("Holding {} level for {} ms", level, hold_time.as_millis());
        // The timing is validated during initialization, so the hold time fits into u32
        delay.delay_ms(hold_time.as_millis() as u32).await;
        Ok(())
    }

    /// Runs one full cycle: the on phase followed by the off phase.
    pub async fn run_cycle(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<D::Error>> {
        let mut phase = Phase::High;
        loop {
            self.run_phase(phase, delay).await?;
            phase = phase.next();
            if phase == Phase::High {
                return Ok(());
            }
        }
    }

    /// Toggles the output forever.
    ///
    /// This only returns if the driver fails to change the duty.
    pub async fn run(&mut self, delay: &mut impl DelayNs) -> Result<Infallible, Error<D::Error>> {
        loop {
            if let Err(e) = self.run_cycle(delay).await {
                error!("Stopped toggling the PWM output: {}", e);
                return Err(e);
            }
        }
    }
}

/// Initializes the output described by `config` and toggles it forever.
///
/// Any failure is fatal and results in a panic. In particular no duty change happens if the
/// timer or the channel could not be configured.
pub async fn run_forever<D: PwmDriver>(
    driver: D,
    config: &Config,
    delay: &mut impl DelayNs,
) -> Infallible {
    let mut toggler = match Toggler::initialize(driver, config) {
        Ok(v) => v,
        Err(e) => panic!("Failed to initialize the PWM output: {}", e),
    };
    match toggler.run(delay).await {
        Ok(never) => never,
        Err(e) => panic!("Failed to toggle the PWM output: {}", e),
    }
}
