//! The whole prop: three actuator tasks and one trigger.

use embassy_futures::join::join4;

use crate::task::Task;

/// The ensemble run by the top-level executor.
///
/// All four tasks are joined into a single future, so they share one
/// executor task and interleave only at their suspension points. On embassy,
/// spawn one task that awaits [`TaskSet::run`] (or spawn the four tasks
/// separately, which behaves the same).
pub struct TaskSet<L: Task, A: Task, Mo: Task, T: Task> {
    /// Light task.
    pub light: L,
    /// Audio task.
    pub audio: A,
    /// Motor task.
    pub motor: Mo,
    /// Trigger driving the three actuator tasks.
    pub trigger: T,
}

impl<L: Task, A: Task, Mo: Task, T: Task> TaskSet<L, A, Mo, T> {
    /// Groups the four tasks.
    pub fn new(light: L, audio: A, motor: Mo, trigger: T) -> Self {
        Self {
            light,
            audio,
            motor,
            trigger,
        }
    }

    /// Runs every task until the device is reset.
    pub async fn run(&mut self) -> ! {
        info!(
            "starting {}, {}, {} and {}",
            self.light.name(),
            self.audio.name(),
            self.motor.name(),
            self.trigger.name()
        );

        let (never, ..) = join4(
            self.light.run(),
            self.audio.run(),
            self.motor.run(),
            self.trigger.run(),
        )
        .await;
        never
    }
}
