//! RGB light animation.

use rand::{Rng, RngCore};

use crate::driver::LightDriver;
use crate::error::{ConfigError, Peripheral, PeripheralError, driver_error};
use crate::task::Actuator;
use crate::time::Clock;
use crate::types::{ActuatorKind, COLOR_OFF, COLOR_RED, Color, LightPolicy};

/// Timing and shape of a light animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightConfig {
    /// Color selection policy.
    pub policy: LightPolicy,

    /// Random targets visited before homing in on red (fade).
    pub cycles: u32,

    /// Increments per fade segment.
    pub steps: u16,

    /// Delay after each fade increment.
    pub step_delay_ms: u64,

    /// Pause after each fade segment.
    pub pause_ms: u64,

    /// How long the final red is held before the light goes dark.
    pub hold_ms: u64,

    /// Random colors shown by the flicker policy.
    pub flicker_ticks: u32,

    /// Delay between flicker colors.
    pub flicker_delay_ms: u64,
}

impl LightConfig {
    /// Checks the configuration.
    ///
    /// # Errors
    /// * `ZeroStep` - `steps` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::ZeroStep { what: "light steps" });
        }
        Ok(())
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            policy: LightPolicy::Fade,
            cycles: 20,
            steps: 20,
            step_delay_ms: 25,
            pause_ms: 1000,
            hold_ms: 1000,
            flicker_ticks: 40,
            flicker_delay_ms: 100,
        }
    }
}

/// Animates an RGB light with random colors, always ending on a red flash
/// followed by darkness.
///
/// The fade policy keeps the running color between segments. Each increment
/// is `(target - current) / steps` rounded toward negative infinity, so a
/// rising segment usually stops a little short of its target and a falling
/// one a little past it; the error carries into the next segment. Channels
/// that overshoot below zero are clamped when written.
pub struct LightAnimation<'c, L: LightDriver, C: Clock, R: RngCore> {
    light: L,
    clock: &'c C,
    rng: R,
    config: LightConfig,
    current: [i32; 3],
}

impl<'c, L: LightDriver, C: Clock, R: RngCore> LightAnimation<'c, L, C, R> {
    /// Creates a light animation.
    ///
    /// # Errors
    /// Whatever [`LightConfig::validate`] rejects.
    pub fn new(light: L, clock: &'c C, rng: R, config: LightConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            light,
            clock,
            rng,
            config,
            current: [0; 3],
        })
    }

    /// Returns the color most recently written to the light.
    pub fn current_color(&self) -> Color {
        Color::new(
            channel(self.current[0]),
            channel(self.current[1]),
            channel(self.current[2]),
        )
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    /// Returns the light driver.
    pub fn driver(&self) -> &L {
        &self.light
    }

    async fn fade(&mut self) -> Result<(), PeripheralError> {
        self.current = [0; 3];

        for _ in 0..self.config.cycles {
            let target = self.random_color();
            self.step_toward(target).await?;
            self.clock.sleep_millis(self.config.pause_ms).await;
        }

        self.step_toward(COLOR_RED).await?;
        self.clock.sleep_millis(self.config.pause_ms).await;
        self.finish().await
    }

    async fn flicker(&mut self) -> Result<(), PeripheralError> {
        for _ in 0..self.config.flicker_ticks {
            let color = self.random_color();
            self.show(color)?;
            self.clock.sleep_millis(self.config.flicker_delay_ms).await;
        }
        self.finish().await
    }

    async fn finish(&mut self) -> Result<(), PeripheralError> {
        self.show(COLOR_RED)?;
        self.clock.sleep_millis(self.config.hold_ms).await;
        self.show(COLOR_OFF)
    }

    async fn step_toward(&mut self, target: Color) -> Result<(), PeripheralError> {
        let steps = i32::from(self.config.steps);
        let target = [
            i32::from(target.red),
            i32::from(target.green),
            i32::from(target.blue),
        ];
        let delta: [i32; 3] = core::array::from_fn(|i| (target[i] - self.current[i]).div_euclid(steps));

        for _ in 0..steps {
            for (value, delta) in self.current.iter_mut().zip(delta) {
                *value += delta;
            }
            self.write()?;
            self.clock.sleep_millis(self.config.step_delay_ms).await;
        }
        Ok(())
    }

    fn show(&mut self, color: Color) -> Result<(), PeripheralError> {
        self.current = [
            i32::from(color.red),
            i32::from(color.green),
            i32::from(color.blue),
        ];
        self.write()
    }

    fn write(&mut self) -> Result<(), PeripheralError> {
        let color = self.current_color();
        trace!("light: {} {} {}", color.red, color.green, color.blue);
        self.light
            .set_color(color)
            .map_err(driver_error(Peripheral::Actuator(ActuatorKind::Light)))
    }

    fn random_color(&mut self) -> Color {
        Color::new(self.rng.r#gen(), self.rng.r#gen(), self.rng.r#gen())
    }
}

impl<L: LightDriver, C: Clock, R: RngCore> Actuator for LightAnimation<'_, L, C, R> {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Light
    }

    async fn run_animation(&mut self) -> Result<(), PeripheralError> {
        match self.config.policy {
            LightPolicy::Fade => self.fade().await,
            LightPolicy::Flicker => self.flicker().await,
        }
    }
}

fn channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
