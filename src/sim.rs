//! Virtual-time runtime for running prop tasks off the hardware.
//!
//! [`SimClock`] is a [`Clock`] whose time only moves when the
//! [`Simulation`] executor finds every task suspended. The executor polls a
//! single future (usually several tasks joined together) on the calling
//! thread, re-polls it as long as something woke it, and otherwise jumps the
//! clock straight to the next sleeping task's deadline. Runs are therefore
//! deterministic and take no wall-clock time.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Wake, Waker};
use std::vec::Vec;

use crate::time::{Clock, TimeDuration, TimeInstant};

/// Simulated duration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimDuration(pub u64);

impl SimDuration {
    /// Creates a duration of `secs` seconds.
    pub const fn from_secs(secs: u64) -> Self {
        SimDuration(secs * 1000)
    }
}

impl TimeDuration for SimDuration {
    fn from_millis(millis: u64) -> Self {
        SimDuration(millis)
    }
}

/// Simulated instant, milliseconds since the clock was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(pub u64);

impl TimeInstant for SimInstant {
    type Duration = SimDuration;

    fn checked_add(self, duration: SimDuration) -> Option<Self> {
        self.0.checked_add(duration.0).map(SimInstant)
    }
}

struct Timer {
    id: u64,
    deadline: u64,
    waker: Waker,
}

/// Clock driven by the [`Simulation`] executor.
#[derive(Default)]
pub struct SimClock {
    now: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
}

impl SimClock {
    /// Creates a clock at `t = 0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the clock was created.
    pub fn millis(&self) -> u64 {
        self.now.get()
    }

    /// Moves time forward to `millis` and wakes every sleeper that is due.
    /// Time never moves backwards.
    pub fn advance_to(&self, millis: u64) {
        if millis > self.now.get() {
            self.now.set(millis);
        }
        let now = self.now.get();

        let due: Vec<Waker> = {
            let mut timers = self.timers.borrow_mut();
            let mut due = Vec::new();
            timers.retain(|timer| {
                if timer.deadline <= now {
                    due.push(timer.waker.clone());
                    false
                } else {
                    true
                }
            });
            due
        };
        due.into_iter().for_each(Waker::wake);
    }

    /// Moves time forward by `duration`.
    pub fn advance(&self, duration: SimDuration) {
        self.advance_to(self.now.get() + duration.0);
    }

    /// Earliest pending sleep deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.borrow().iter().map(|timer| timer.deadline).min()
    }

    fn register(&self, id: u64, deadline: u64, waker: &Waker) {
        let mut timers = self.timers.borrow_mut();
        match timers.iter_mut().find(|timer| timer.id == id) {
            Some(timer) if timer.waker.will_wake(waker) => {}
            Some(timer) => timer.waker = waker.clone(),
            None => timers.push(Timer {
                id,
                deadline,
                waker: waker.clone(),
            }),
        }
    }

    fn cancel(&self, id: u64) {
        self.timers.borrow_mut().retain(|timer| timer.id != id);
    }
}

/// Future returned by [`SimClock`]'s `sleep`. Dropping it cancels the timer.
struct Sleep<'a> {
    clock: &'a SimClock,
    id: u64,
    deadline: u64,
}

impl Future for Sleep<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.clock.now.get() >= self.deadline {
            Poll::Ready(())
        } else {
            self.clock.register(self.id, self.deadline, cx.waker());
            Poll::Pending
        }
    }
}

impl Drop for Sleep<'_> {
    fn drop(&mut self) {
        self.clock.cancel(self.id);
    }
}

impl Clock for SimClock {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.now.get())
    }

    async fn sleep(&self, duration: SimDuration) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Sleep {
            clock: self,
            id,
            deadline: self.now.get().saturating_add(duration.0),
        }
        .await
    }
}

/// Why a simulation stopped before its future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// Every task is waiting on a signal and nobody is sleeping, so nothing
    /// can ever happen again.
    Stalled {
        /// Simulated time of the stall, in milliseconds.
        at: u64,
    },
}

impl core::fmt::Display for SimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SimError::Stalled { at } => write!(f, "simulation stalled at t={}ms", at),
        }
    }
}

impl std::error::Error for SimError {}

#[derive(Default)]
struct WakeFlag(AtomicBool);

impl Wake for WakeFlag {
    fn wake(self: Arc<Self>) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.store(true, Ordering::SeqCst);
    }
}

enum Outcome<T> {
    Completed(T),
    TimedOut,
    Stalled,
}

/// Single-threaded cooperative executor over a [`SimClock`].
pub struct Simulation<'c> {
    clock: &'c SimClock,
}

impl<'c> Simulation<'c> {
    /// Creates an executor that advances `clock`.
    pub fn new(clock: &'c SimClock) -> Self {
        Self { clock }
    }

    /// Runs `future` to completion.
    ///
    /// # Errors
    /// [`SimError::Stalled`] if the future can no longer make progress.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output, SimError> {
        match self.drive(future, None) {
            Outcome::Completed(output) => Ok(output),
            Outcome::TimedOut | Outcome::Stalled => Err(SimError::Stalled {
                at: self.clock.millis(),
            }),
        }
    }

    /// Runs `future` for at most `duration` of simulated time.
    ///
    /// Returns `None` if the future did not complete in time, in which case
    /// the clock ends exactly `duration` after the start.
    pub fn run_for<F: Future>(&self, future: F, duration: SimDuration) -> Option<F::Output> {
        let limit = self.clock.millis() + duration.0;
        match self.drive(future, Some(limit)) {
            Outcome::Completed(output) => Some(output),
            Outcome::TimedOut | Outcome::Stalled => {
                self.clock.advance_to(limit);
                None
            }
        }
    }

    fn drive<F: Future>(&self, future: F, limit: Option<u64>) -> Outcome<F::Output> {
        let flag = Arc::new(WakeFlag::default());
        let waker = Waker::from(flag.clone());
        let mut cx = Context::from_waker(&waker);
        let mut future = pin!(future);

        loop {
            flag.0.store(false, Ordering::SeqCst);
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return Outcome::Completed(output);
            }
            if flag.0.load(Ordering::SeqCst) {
                continue;
            }

            match (self.clock.next_deadline(), limit) {
                (Some(deadline), Some(limit)) if deadline > limit => return Outcome::TimedOut,
                (Some(deadline), _) => self.clock.advance_to(deadline),
                (None, _) => return Outcome::Stalled,
            }
        }
    }
}
