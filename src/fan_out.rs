//! Staggered start of the three actuator channels.
//!
//! Every trigger starts the channels in the same order: the light first
//! (the eyes open), then the audio after a short random pause, then the motor
//! after a fixed pause.

use embassy_sync::blocking_mutex::raw::RawMutex;
use rand::{Rng, RngCore};

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::task::TaskSignals;
use crate::time::Clock;

/// Task names and pauses used by a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FanOutConfig {
    /// Registry name of the light task.
    pub light: &'static str,

    /// Registry name of the audio task.
    pub audio: &'static str,

    /// Registry name of the motor task.
    pub motor: &'static str,

    /// Shortest pause between the light and audio starts.
    pub light_to_audio_min_ms: u64,

    /// Longest pause between the light and audio starts.
    pub light_to_audio_max_ms: u64,

    /// Pause between the audio and motor starts.
    pub audio_to_motor_ms: u64,
}

impl FanOutConfig {
    /// Checks the configuration.
    ///
    /// # Errors
    /// * `InvalidRange` - the light-to-audio minimum exceeds the maximum
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.light_to_audio_min_ms > self.light_to_audio_max_ms {
            return Err(ConfigError::InvalidRange {
                what: "light-to-audio delay",
            });
        }
        Ok(())
    }
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            light: "led",
            audio: "speaker",
            motor: "motor",
            light_to_audio_min_ms: 1000,
            light_to_audio_max_ms: 2000,
            audio_to_motor_ms: 3000,
        }
    }
}

/// The three channels a trigger starts, resolved from a [`Registry`].
pub struct FanOut<'s, M: RawMutex> {
    light: &'s TaskSignals<M>,
    audio: &'s TaskSignals<M>,
    motor: &'s TaskSignals<M>,
    config: FanOutConfig,
}

impl<'s, M: RawMutex> FanOut<'s, M> {
    /// Resolves the configured task names.
    ///
    /// # Errors
    /// * `UnknownTask` - a configured name is not registered
    /// * `InvalidRange` - see [`FanOutConfig::validate`]
    pub fn resolve<const N: usize>(
        registry: &Registry<'s, M, N>,
        config: FanOutConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            light: registry.get(config.light)?,
            audio: registry.get(config.audio)?,
            motor: registry.get(config.motor)?,
            config,
        })
    }

    /// Starts light, audio and motor, in that order, with the configured
    /// pauses in between.
    ///
    /// Starting a channel whose previous trigger is still pending has no
    /// extra effect: triggers do not queue.
    pub async fn fire<C: Clock, R: RngCore>(&self, clock: &C, rng: &mut R) {
        info!("fan-out: {}", self.config.light);
        self.light.trigger.set();

        let pause = rng.gen_range(
            self.config.light_to_audio_min_ms..=self.config.light_to_audio_max_ms,
        );
        clock.sleep_millis(pause).await;

        info!("fan-out: {}", self.config.audio);
        self.audio.trigger.set();

        clock.sleep_millis(self.config.audio_to_motor_ms).await;

        info!("fan-out: {}", self.config.motor);
        self.motor.trigger.set();
    }

    /// Waits until every channel has raised its done signal, in any order,
    /// then clears all three.
    pub async fn join_done(&self) {
        embassy_futures::join::join3(
            self.light.done.wait(),
            self.audio.done.wait(),
            self.motor.done.wait(),
        )
        .await;

        self.light.done.clear();
        self.audio.done.clear();
        self.motor.done.clear();
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FanOutConfig {
        &self.config
    }
}
