//! Symmetric motor throttle ramp.

use core::iter::StepBy;
use core::ops::Range;

use crate::driver::MotorDriver;
use crate::error::{ConfigError, Error, Peripheral, PeripheralError, driver_error};
use crate::task::Actuator;
use crate::time::Clock;
use crate::types::{ActuatorKind, DecayMode};

/// Shape of the motor ramp. Duty values are percent of full throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorConfig {
    /// First duty of the ramp.
    pub low: u8,

    /// Exclusive upper bound of the ramp.
    pub high: u8,

    /// Duty increment per step.
    pub step: u8,

    /// Delay after each step.
    pub step_delay_ms: u64,

    /// How long the peak duty is held.
    pub hold_ms: u64,

    /// Decay mode applied when the motor is set up.
    pub decay_mode: DecayMode,
}

impl MotorConfig {
    /// A slow sweep up to half throttle (16 → 50 → 16).
    pub const fn gentle() -> Self {
        Self {
            low: 16,
            high: 50,
            step: 4,
            step_delay_ms: 300,
            hold_ms: 2000,
            decay_mode: DecayMode::Slow,
        }
    }

    /// A sweep up to full throttle (16 → 100 → 16).
    pub const fn full() -> Self {
        Self {
            high: 100,
            ..Self::gentle()
        }
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// * `ZeroStep` - `step` is zero
    /// * `InvalidRange` - `low >= high` or `high > 100`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::ZeroStep { what: "motor step" });
        }
        if self.low >= self.high || self.high > 100 {
            return Err(ConfigError::InvalidRange { what: "motor duty" });
        }
        Ok(())
    }

    /// Duty values of the upward ramp: `low, low + step, ...` while below
    /// `high`. The downward ramp is the same sequence reversed.
    pub fn ramp(&self) -> StepBy<Range<u8>> {
        (self.low..self.high).step_by(usize::from(self.step.max(1)))
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self::gentle()
    }
}

/// Ramps a motor up, holds, ramps it back down and stops it.
pub struct MotorRamp<'c, D: MotorDriver, C: Clock> {
    motor: D,
    clock: &'c C,
    config: MotorConfig,
}

impl<'c, D: MotorDriver, C: Clock> MotorRamp<'c, D, C> {
    /// Creates a motor ramp, applying the decay mode and stopping the motor.
    ///
    /// # Errors
    /// * `Config` - whatever [`MotorConfig::validate`] rejects
    /// * `Peripheral` - the driver refused the decay mode or the zero throttle
    pub fn new(mut motor: D, clock: &'c C, config: MotorConfig) -> Result<Self, Error> {
        config.validate()?;

        motor
            .set_decay_mode(config.decay_mode)
            .map_err(driver_error(Peripheral::Actuator(ActuatorKind::Motor)))?;
        motor
            .set_throttle(0.0)
            .map_err(driver_error(Peripheral::Actuator(ActuatorKind::Motor)))?;

        Ok(Self {
            motor,
            clock,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    /// Returns the motor driver.
    pub fn driver(&self) -> &D {
        &self.motor
    }

    async fn ramp(&mut self) -> Result<(), PeripheralError> {
        for duty in self.config.ramp() {
            self.throttle(duty)?;
            self.clock.sleep_millis(self.config.step_delay_ms).await;
        }

        self.clock.sleep_millis(self.config.hold_ms).await;

        for duty in self.config.ramp().rev() {
            self.throttle(duty)?;
            self.clock.sleep_millis(self.config.step_delay_ms).await;
        }

        self.throttle(0)
    }

    fn throttle(&mut self, duty: u8) -> Result<(), PeripheralError> {
        let throttle = f32::from(duty) / 100.0;
        trace!("motor: throttle {}", throttle);
        self.motor
            .set_throttle(throttle)
            .map_err(driver_error(Peripheral::Actuator(ActuatorKind::Motor)))
    }
}

impl<D: MotorDriver, C: Clock> Actuator for MotorRamp<'_, D, C> {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Motor
    }

    async fn run_animation(&mut self) -> Result<(), PeripheralError> {
        let result = self.ramp().await;
        if result.is_err() {
            // Never leave the motor running after a failed step.
            if self.motor.set_throttle(0.0).is_err() {
                error!("motor: could not stop after failure");
            }
        }
        result
    }
}
