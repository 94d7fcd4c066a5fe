//! Hardware capability traits.
//!
//! Implement these for your board. The motion sensor and the optional
//! indicator output use `embedded-hal`'s digital pin traits directly.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::time::TimeInstant;
use crate::types::{Color, DecayMode};

/// Trait for abstracting RGB light hardware.
pub trait LightDriver {
    /// Driver error.
    type Error: core::fmt::Debug;

    /// Sets the light to `color`. Takes effect immediately.
    fn set_color(&mut self, color: Color) -> Result<(), Self::Error>;
}

/// Trait for abstracting a sound clip player.
pub trait AudioDriver {
    /// Driver error, e.g. clip not found.
    type Error: core::fmt::Debug;

    /// Starts playing `clip` in the background and returns without waiting
    /// for playback to finish.
    fn play(&mut self, clip: &str) -> Result<(), Self::Error>;
}

/// Trait for abstracting a DC motor driver.
pub trait MotorDriver {
    /// Driver error.
    type Error: core::fmt::Debug;

    /// Sets the throttle, `-1.0..=1.0` (negative values reverse).
    fn set_throttle(&mut self, throttle: f32) -> Result<(), Self::Error>;

    /// Selects coasting or braking between PWM pulses.
    fn set_decay_mode(&mut self, mode: DecayMode) -> Result<(), Self::Error>;
}

/// Trait for platform low-power facilities.
///
/// `suspend_until` is a hint: implementations without a low-power mode
/// return immediately.
#[allow(async_fn_in_trait)]
pub trait PowerManager<I: TimeInstant> {
    /// Suspends the processor until `deadline`, or returns right away.
    async fn suspend_until(&mut self, deadline: I);
}

/// Power manager for platforms without a low-power mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerManager;

impl<I: TimeInstant> PowerManager<I> for NoPowerManager {
    async fn suspend_until(&mut self, _deadline: I) {}
}

/// Stand-in output pin for a motion trigger without an indicator LED.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl ErrorType for NoIndicator {
    type Error = Infallible;
}

impl OutputPin for NoIndicator {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
