//! Time abstraction traits for platform-agnostic timing.
//!
//! Every suspension point in the prop's tasks is either a signal wait or a
//! [`Clock::sleep`], so the same task code runs on an embassy executor and on
//! the host's virtual-time simulation.

/// A span of time on some [`Clock`].
pub trait TimeDuration: Copy {
    /// Creates a duration of `millis` milliseconds.
    fn from_millis(millis: u64) -> Self;
}

/// A point in time on some [`Clock`].
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// The instant `duration` later, or `None` on overflow.
    fn checked_add(self, duration: Self::Duration) -> Option<Self>;
}

/// Monotonic time source with cooperative sleeping.
///
/// `sleep` must yield to the executor instead of blocking the processor.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Instant type produced by this clock.
    type Instant: TimeInstant;

    /// Returns the current time instant.
    fn now(&self) -> Self::Instant;

    /// Suspends the calling task for `duration`.
    async fn sleep(&self, duration: <Self::Instant as TimeInstant>::Duration);

    /// Suspends the calling task for `millis` milliseconds.
    async fn sleep_millis(&self, millis: u64) {
        self.sleep(TimeDuration::from_millis(millis)).await
    }
}

/// Duration type of a [`Clock`].
pub type ClockDuration<C> = <<C as Clock>::Instant as TimeInstant>::Duration;

