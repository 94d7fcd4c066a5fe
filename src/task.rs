//! The actuator task loop shared by every channel.
//!
//! Each actuator runs forever as
//! `wait for trigger -> clear trigger -> run one animation -> raise done`.
//! The loop is written once in [`ActuatorTask`]; channels only provide the
//! bounded animation through the [`Actuator`] trait.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::error::PeripheralError;
use crate::signal::Signal;
use crate::types::ActuatorKind;

/// One bounded animation on a single peripheral.
#[allow(async_fn_in_trait)]
pub trait Actuator {
    /// Channel this actuator drives.
    fn kind(&self) -> ActuatorKind;

    /// Runs one complete animation.
    ///
    /// # Errors
    /// The first driver failure. The animation stops at the failing step.
    async fn run_animation(&mut self) -> Result<(), PeripheralError>;
}

/// A long-running task driven by a cooperative executor.
#[allow(async_fn_in_trait)]
pub trait Task {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the task forever.
    async fn run(&mut self) -> !;
}

/// The handshake signals of one actuator task.
///
/// `trigger` is raised by a trigger and consumed (cleared) by the task;
/// `done` is raised by the task and cleared by whoever joins on it.
pub struct TaskSignals<M: RawMutex> {
    /// Start request.
    pub trigger: Signal<M>,
    /// Animation finished (or was skipped after a failure).
    pub done: Signal<M>,
}

impl<M: RawMutex> TaskSignals<M> {
    /// Creates a pair of cleared signals.
    pub const fn new() -> Self {
        Self {
            trigger: Signal::new(),
            done: Signal::new(),
        }
    }
}

impl<M: RawMutex> Default for TaskSignals<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs an [`Actuator`] each time its trigger signal is raised.
///
/// A failed animation is logged and treated as skipped: `done` is raised
/// anyway so a joining trigger never hangs on a broken peripheral.
pub struct ActuatorTask<'s, M: RawMutex, A: Actuator> {
    name: &'static str,
    signals: &'s TaskSignals<M>,
    actuator: A,
    completed: u32,
    failed: u32,
}

impl<'s, M: RawMutex, A: Actuator> ActuatorTask<'s, M, A> {
    /// Creates a task named `name` listening on `signals`.
    pub fn new(name: &'static str, signals: &'s TaskSignals<M>, actuator: A) -> Self {
        Self {
            name,
            signals,
            actuator,
            completed: 0,
            failed: 0,
        }
    }

    /// Waits for the trigger signal, then clears it.
    ///
    /// A trigger raised while the animation runs is kept and starts the next
    /// cycle right away; several raises collapse into one.
    pub async fn wait_for_trigger(&self) {
        self.signals.trigger.wait().await;
        self.signals.trigger.clear();
    }

    /// Runs the actuator's animation once.
    pub async fn run_animation(&mut self) -> Result<(), PeripheralError> {
        self.actuator.run_animation().await
    }

    /// Raises the done signal.
    pub fn signal_done(&self) {
        self.signals.done.set();
    }

    /// One full iteration of the task loop.
    pub async fn run_once(&mut self) {
        self.wait_for_trigger().await;
        debug!("{}: triggered", self.name);

        match self.run_animation().await {
            Ok(()) => {
                self.completed += 1;
                debug!("{}: animation complete", self.name);
            }
            Err(err) => {
                self.failed += 1;
                warn!("{}: animation skipped: {}", self.name, err);
            }
        }

        self.signal_done();
    }

    /// Channel driven by this task.
    pub fn kind(&self) -> ActuatorKind {
        self.actuator.kind()
    }

    /// Number of animations that ran to the end.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Number of animations cut short by a driver failure.
    pub fn failed(&self) -> u32 {
        self.failed
    }

    /// The wrapped actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// The wrapped actuator, mutably.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }
}

impl<M: RawMutex, A: Actuator> Task for ActuatorTask<'_, M, A> {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&mut self) -> ! {
        info!("{}: {} task started", self.name, self.kind());
        loop {
            self.run_once().await;
        }
    }
}
