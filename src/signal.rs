//! Broadcast set/wait/clear event flag.
//!
//! Unlike `embassy_sync::signal::Signal`, waiting does not consume the flag:
//! it stays raised until somebody calls [`Signal::clear`], and a single
//! [`Signal::set`] releases every task currently waiting on it.

use core::cell::RefCell;
use core::future::{Future, poll_fn};
use core::task::Poll;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

/// Default number of distinct waiters a signal tracks before it falls back to
/// waking everyone and letting them re-register.
pub const DEFAULT_WAITERS: usize = 4;

struct State<const W: usize> {
    raised: bool,
    waiters: MultiWakerRegistration<W>,
}

/// A binary event shared between cooperative tasks.
///
/// The mutex type `M` decides where the signal may live: `NoopRawMutex` for
/// signals owned by a single executor, `ThreadModeRawMutex` or
/// `CriticalSectionRawMutex` for `static` signals.
///
/// # Type Parameters
/// * `M` - Raw mutex guarding the flag
/// * `W` - Number of waker slots
pub struct Signal<M: RawMutex, const W: usize = DEFAULT_WAITERS> {
    state: Mutex<M, RefCell<State<W>>>,
}

impl<M: RawMutex, const W: usize> Signal<M, W> {
    /// Creates a cleared signal.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                raised: false,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Raises the flag and wakes every waiter.
    ///
    /// Idempotent: raising an already raised signal changes nothing.
    pub fn set(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.raised = true;
            state.waiters.wake();
        });
    }

    /// Lowers the flag. Subsequent [`wait`](Self::wait) calls block again.
    pub fn clear(&self) {
        self.state.lock(|state| state.borrow_mut().raised = false);
    }

    /// Returns true if the flag is currently raised.
    pub fn is_set(&self) -> bool {
        self.state.lock(|state| state.borrow().raised)
    }

    /// Waits until the flag is raised.
    ///
    /// Completes on first poll when the flag is already raised. The flag is
    /// left untouched.
    pub fn wait(&self) -> impl Future<Output = ()> + '_ {
        poll_fn(move |cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if state.raised {
                    Poll::Ready(())
                } else {
                    state.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
    }
}

impl<M: RawMutex, const W: usize> Default for Signal<M, W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Waker};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    extern crate std;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::Wake;

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting_waker() -> (Arc<CountingWaker>, Waker) {
        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(counter.clone());
        (counter, waker)
    }

    #[test]
    fn wait_after_set_is_ready_immediately() {
        let signal = Signal::<NoopRawMutex>::new();
        signal.set();

        let mut cx = Context::from_waker(Waker::noop());
        let mut wait = pin!(signal.wait());
        assert_eq!(wait.as_mut().poll(&mut cx), Poll::Ready(()));
        assert!(signal.is_set());
    }

    #[test]
    fn wait_blocks_after_clear() {
        let signal = Signal::<NoopRawMutex>::new();
        signal.set();
        signal.clear();

        let mut cx = Context::from_waker(Waker::noop());
        let mut wait = pin!(signal.wait());
        assert_eq!(wait.as_mut().poll(&mut cx), Poll::Pending);
    }

    #[test]
    fn set_wakes_every_waiter() {
        let signal = Signal::<NoopRawMutex>::new();
        let (first_count, first) = counting_waker();
        let (second_count, second) = counting_waker();
        let (third_count, third) = counting_waker();

        let mut a = pin!(signal.wait());
        let mut b = pin!(signal.wait());
        let mut c = pin!(signal.wait());
        assert!(a.as_mut().poll(&mut Context::from_waker(&first)).is_pending());
        assert!(b.as_mut().poll(&mut Context::from_waker(&second)).is_pending());
        assert!(c.as_mut().poll(&mut Context::from_waker(&third)).is_pending());

        signal.set();

        assert_eq!(first_count.0.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.0.load(Ordering::SeqCst), 1);
        assert_eq!(third_count.0.load(Ordering::SeqCst), 1);
        assert!(a.as_mut().poll(&mut Context::from_waker(&first)).is_ready());
        assert!(b.as_mut().poll(&mut Context::from_waker(&second)).is_ready());
        assert!(c.as_mut().poll(&mut Context::from_waker(&third)).is_ready());
    }

    #[test]
    fn overflowing_waiter_slots_loses_no_wakeup() {
        let signal = Signal::<NoopRawMutex, 2>::new();
        let wakers: std::vec::Vec<_> = (0..3).map(|_| counting_waker()).collect();

        for (_, waker) in &wakers {
            let mut wait = pin!(signal.wait());
            assert!(wait.as_mut().poll(&mut Context::from_waker(waker)).is_pending());
        }
        signal.set();

        for (count, _) in &wakers {
            assert!(count.0.load(Ordering::SeqCst) >= 1);
        }
    }

    #[test]
    fn double_set_equals_single_set() {
        let once = Signal::<NoopRawMutex>::new();
        let twice = Signal::<NoopRawMutex>::new();
        once.set();
        twice.set();
        twice.set();
        assert_eq!(once.is_set(), twice.is_set());

        once.clear();
        twice.clear();
        assert!(!twice.is_set());
    }
}
