//! Periodic trigger that waits for the whole prop before resting.

use embassy_sync::blocking_mutex::raw::RawMutex;
use rand::{Rng, RngCore};

use crate::driver::{NoPowerManager, PowerManager};
use crate::error::ConfigError;
use crate::fan_out::{FanOut, FanOutConfig};
use crate::registry::Registry;
use crate::task::Task;
use crate::time::{Clock, ClockDuration, TimeDuration, TimeInstant};
use crate::types::TimerState;

/// Timing of a [`TimerTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// One-off delay after power-up before the first firing.
    pub settle_ms: u64,

    /// Shortest rest between the end of one show and the next firing.
    pub cooldown_min_ms: u64,

    /// Longest rest between the end of one show and the next firing.
    pub cooldown_max_ms: u64,

    /// Channel names and stagger.
    pub fan_out: FanOutConfig,
}

impl TimerConfig {
    /// Checks the configuration.
    ///
    /// # Errors
    /// * `InvalidRange` - the cooldown minimum exceeds the maximum, or the
    ///   fan-out configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooldown_min_ms > self.cooldown_max_ms {
            return Err(ConfigError::InvalidRange { what: "cooldown" });
        }
        self.fan_out.validate()
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            settle_ms: 5_000,
            cooldown_min_ms: 60_000,
            cooldown_max_ms: 120_000,
            fan_out: FanOutConfig::default(),
        }
    }
}

/// Fires the prop, waits until every channel is done, rests for a random
/// interval and fires again.
///
/// ```text
/// Idle --settle--> Firing --> WaitingAllDone --> Cooldown --> Firing ...
/// ```
///
/// During cooldown the power manager is asked to suspend until the end of the
/// interval, after which the trigger also sleeps the interval on the clock.
pub struct TimerTrigger<'a, M, C, R, P = NoPowerManager>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
    P: PowerManager<C::Instant>,
{
    fan_out: FanOut<'a, M>,
    clock: &'a C,
    rng: R,
    power: P,
    config: TimerConfig,
    state: TimerState,
    cycles: u32,
}

impl<'a, M, C, R> TimerTrigger<'a, M, C, R>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
{
    /// Creates a timer trigger without low-power support.
    ///
    /// # Errors
    /// * `UnknownTask` - a fan-out name is not in `registry`
    /// * `InvalidRange` - see [`TimerConfig::validate`]
    pub fn new<const N: usize>(
        registry: &Registry<'a, M, N>,
        clock: &'a C,
        rng: R,
        config: TimerConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_power_manager(registry, clock, rng, NoPowerManager, config)
    }
}

impl<'a, M, C, R, P> TimerTrigger<'a, M, C, R, P>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
    P: PowerManager<C::Instant>,
{
    /// Creates a timer trigger that rests through `power`.
    ///
    /// # Errors
    /// * `UnknownTask` - a fan-out name is not in `registry`
    /// * `InvalidRange` - see [`TimerConfig::validate`]
    pub fn with_power_manager<const N: usize>(
        registry: &Registry<'a, M, N>,
        clock: &'a C,
        rng: R,
        power: P,
        config: TimerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fan_out: FanOut::resolve(registry, config.fan_out)?,
            clock,
            rng,
            power,
            config,
            state: TimerState::Idle,
            cycles: 0,
        })
    }

    /// Returns the current state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Number of completed fire-join-rest cycles.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Returns the power manager.
    pub fn power_manager(&self) -> &P {
        &self.power
    }

    /// Waits out the power-up settle delay.
    pub async fn settle(&mut self) {
        self.state = TimerState::Idle;
        debug!("timer: settling for {} ms", self.config.settle_ms);
        self.clock.sleep_millis(self.config.settle_ms).await;
    }

    /// Starts light, audio and motor in order.
    pub async fn fire(&mut self) {
        self.state = TimerState::Firing;
        self.fan_out.fire(self.clock, &mut self.rng).await;
    }

    /// Waits for all three done signals, then clears them.
    pub async fn wait_all_done(&mut self) {
        self.state = TimerState::WaitingAllDone;
        self.fan_out.join_done().await;
        debug!("timer: all channels done");
    }

    /// Rests for a random interval.
    pub async fn cool_down(&mut self) {
        self.state = TimerState::Cooldown;

        let millis = self
            .rng
            .gen_range(self.config.cooldown_min_ms..=self.config.cooldown_max_ms);
        let interval = ClockDuration::<C>::from_millis(millis);
        info!("timer: resting for {} ms", millis);

        match self.clock.now().checked_add(interval) {
            Some(deadline) => self.power.suspend_until(deadline).await,
            None => warn!("timer: rest deadline overflows, not suspending"),
        }
        self.clock.sleep(interval).await;
    }

    /// Runs one fire, join and rest cycle.
    pub async fn run_cycle(&mut self) {
        self.fire().await;
        self.wait_all_done().await;
        self.cool_down().await;
        self.cycles += 1;
    }
}

impl<M, C, R, P> Task for TimerTrigger<'_, M, C, R, P>
where
    M: RawMutex,
    C: Clock,
    R: RngCore,
    P: PowerManager<C::Instant>,
{
    fn name(&self) -> &'static str {
        "timer"
    }

    async fn run(&mut self) -> ! {
        self.settle().await;
        loop {
            self.run_cycle().await;
        }
    }
}
