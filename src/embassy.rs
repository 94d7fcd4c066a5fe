//! [`Clock`] on top of `embassy-time`.
//!
//! The embassy time types implement the crate's time traits directly, so no
//! wrapper types are needed; the tasks sleep on `embassy_time::Timer`.

use embassy_time::{Duration, Instant, Timer};

use crate::time::{Clock, TimeDuration, TimeInstant};

impl TimeDuration for Duration {
    fn from_millis(millis: u64) -> Self {
        Duration::from_millis(millis)
    }
}

impl TimeInstant for Instant {
    type Duration = Duration;

    fn checked_add(self, duration: Duration) -> Option<Self> {
        Instant::checked_add(&self, duration)
    }
}

/// Clock for tasks running on an embassy executor with a time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        Timer::after(duration).await
    }
}
