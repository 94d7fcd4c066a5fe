//! Motion-sensor trigger.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::digital::{InputPin, OutputPin};
use rand::RngCore;

use crate::driver::NoIndicator;
use crate::error::{ConfigError, Peripheral, driver_error};
use crate::fan_out::{FanOut, FanOutConfig};
use crate::registry::Registry;
use crate::task::Task;
use crate::time::Clock;

/// Timing of a [`MotionTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Sensor polling period.
    pub poll_interval_ms: u64,

    /// Channel names and stagger.
    pub fan_out: FanOutConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            fan_out: FanOutConfig::default(),
        }
    }
}

/// Fires the prop on every rising edge of a motion sensor.
///
/// The sensor has no interrupt line, so it is polled. The trigger does not
/// wait for the channels to finish: an edge during a running show re-raises
/// trigger signals, and a channel that has not consumed its previous trigger
/// yet simply keeps the one it has.
///
/// An optional indicator pin mirrors the sensor level.
pub struct MotionTrigger<'a, M, C, R, S, P = NoIndicator>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
    S: InputPin,
    P: OutputPin,
{
    fan_out: FanOut<'a, M>,
    clock: &'a C,
    rng: R,
    sensor: S,
    indicator: P,
    config: MotionConfig,
    previous: bool,
    fired: u32,
}

impl<'a, M, C, R, S> MotionTrigger<'a, M, C, R, S>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
    S: InputPin,
{
    /// Creates a motion trigger reading `sensor`.
    ///
    /// # Errors
    /// * `UnknownTask` - a fan-out name is not in `registry`
    /// * `InvalidRange` - see [`FanOutConfig::validate`]
    /// * `ZeroStep` - the poll interval is zero
    pub fn new<const N: usize>(
        registry: &Registry<'a, M, N>,
        clock: &'a C,
        rng: R,
        sensor: S,
        config: MotionConfig,
    ) -> Result<Self, ConfigError> {
        if config.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroStep {
                what: "poll interval",
            });
        }

        Ok(Self {
            fan_out: FanOut::resolve(registry, config.fan_out)?,
            clock,
            rng,
            sensor,
            indicator: NoIndicator,
            config,
            previous: false,
            fired: 0,
        })
    }

    /// Mirrors the sensor level onto `indicator`.
    pub fn with_indicator<P: OutputPin>(self, indicator: P) -> MotionTrigger<'a, M, C, R, S, P> {
        MotionTrigger {
            fan_out: self.fan_out,
            clock: self.clock,
            rng: self.rng,
            sensor: self.sensor,
            indicator,
            config: self.config,
            previous: self.previous,
            fired: self.fired,
        }
    }
}

impl<'a, M, C, R, S, P> MotionTrigger<'a, M, C, R, S, P>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
    S: InputPin,
    P: OutputPin,
{
    /// Number of fan-outs started so far.
    pub fn fired(&self) -> u32 {
        self.fired
    }

    /// Sensor level seen by the last successful poll.
    pub fn last_reading(&self) -> bool {
        self.previous
    }

    /// Returns the indicator pin.
    pub fn indicator(&self) -> &P {
        &self.indicator
    }

    /// Returns the sensor pin.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Reads the sensor once and fans out on a rising edge.
    ///
    /// Returns true if a fan-out ran. A failed read leaves the previous level
    /// in place.
    pub async fn poll(&mut self) -> bool {
        let Some(level) = self.read() else {
            return false;
        };

        let rising = level && !self.previous;
        if level != self.previous {
            if level {
                info!("motion detected");
            } else {
                info!("motion ended");
            }
            self.show(level);
        }
        self.previous = level;

        if rising {
            self.fired += 1;
            self.fan_out.fire(self.clock, &mut self.rng).await;
        }
        rising
    }

    fn read(&mut self) -> Option<bool> {
        self.sensor
            .is_high()
            .map_err(driver_error(Peripheral::Sensor))
            .ok()
    }

    fn show(&mut self, level: bool) {
        let result = if level {
            self.indicator.set_high()
        } else {
            self.indicator.set_low()
        };
        // The indicator is cosmetic; a failure is only logged.
        let _ = result.map_err(driver_error(Peripheral::Indicator));
    }
}

impl<M, C, R, S, P> Task for MotionTrigger<'_, M, C, R, S, P>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
    S: InputPin,
    P: OutputPin,
{
    fn name(&self) -> &'static str {
        "motion"
    }

    async fn run(&mut self) -> ! {
        // Someone already standing in front of the prop at power-up is not
        // an edge.
        if let Some(level) = self.read() {
            self.previous = level;
            self.show(level);
        }

        loop {
            self.poll().await;
            self.clock.sleep_millis(self.config.poll_interval_ms).await;
        }
    }
}
