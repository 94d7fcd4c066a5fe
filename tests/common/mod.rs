//! Shared test infrastructure for prop-sequencer integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::ops::Range;
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};
use prop_sequencer::sim::{SimClock, SimInstant};
use prop_sequencer::{AudioDriver, Color, DecayMode, LightDriver, MotorDriver, PowerManager};

pub type Signals = prop_sequencer::TaskSignals<NoopRawMutex>;

/// Timestamped record shared between a mock and the test body.
pub type Log<T> = Rc<RefCell<Vec<(u64, T)>>>;

pub fn log<T>() -> Log<T> {
    Rc::new(RefCell::new(Vec::new()))
}

/// Error returned by mocks with failure injection enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFault;

// ============================================================================
// Mock Light
// ============================================================================

/// Mock light that records every color with the time it was set
pub struct MockLight<'c> {
    clock: &'c SimClock,
    history: Log<Color>,
    fail: Rc<Cell<bool>>,
}

impl<'c> MockLight<'c> {
    pub fn new(clock: &'c SimClock, history: Log<Color>) -> Self {
        Self {
            clock,
            history,
            fail: Rc::new(Cell::new(false)),
        }
    }

    /// Handle that makes every following `set_color` fail while true
    pub fn fault_switch(&self) -> Rc<Cell<bool>> {
        self.fail.clone()
    }
}

impl LightDriver for MockLight<'_> {
    type Error = MockFault;

    fn set_color(&mut self, color: Color) -> Result<(), MockFault> {
        if self.fail.get() {
            return Err(MockFault);
        }
        self.history.borrow_mut().push((self.clock.millis(), color));
        Ok(())
    }
}

// ============================================================================
// Mock Audio
// ============================================================================

/// Mock clip player that records every started clip
pub struct MockAudio<'c> {
    clock: &'c SimClock,
    history: Log<String>,
    fail: bool,
}

impl<'c> MockAudio<'c> {
    pub fn new(clock: &'c SimClock, history: Log<String>) -> Self {
        Self {
            clock,
            history,
            fail: false,
        }
    }

    /// A player whose clips are all missing
    pub fn failing(clock: &'c SimClock, history: Log<String>) -> Self {
        Self {
            clock,
            history,
            fail: true,
        }
    }
}

impl AudioDriver for MockAudio<'_> {
    type Error = MockFault;

    fn play(&mut self, clip: &str) -> Result<(), MockFault> {
        if self.fail {
            return Err(MockFault);
        }
        self.history
            .borrow_mut()
            .push((self.clock.millis(), clip.to_owned()));
        Ok(())
    }
}

// ============================================================================
// Mock Motor
// ============================================================================

/// Mock motor driver that records throttle changes
pub struct MockMotor<'c> {
    clock: &'c SimClock,
    history: Log<f32>,
    decay_mode: Rc<Cell<Option<DecayMode>>>,
    fail_after: Option<usize>,
}

impl<'c> MockMotor<'c> {
    pub fn new(clock: &'c SimClock, history: Log<f32>) -> Self {
        Self {
            clock,
            history,
            decay_mode: Rc::new(Cell::new(None)),
            fail_after: None,
        }
    }

    /// Accepts `count` throttle writes, then refuses every non-zero one
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn decay_mode(&self) -> Rc<Cell<Option<DecayMode>>> {
        self.decay_mode.clone()
    }
}

impl MotorDriver for MockMotor<'_> {
    type Error = MockFault;

    fn set_throttle(&mut self, throttle: f32) -> Result<(), MockFault> {
        let mut history = self.history.borrow_mut();
        if let Some(limit) = self.fail_after {
            if history.len() >= limit && throttle != 0.0 {
                return Err(MockFault);
            }
        }
        history.push((self.clock.millis(), throttle));
        Ok(())
    }

    fn set_decay_mode(&mut self, mode: DecayMode) -> Result<(), MockFault> {
        self.decay_mode.set(Some(mode));
        Ok(())
    }
}

// ============================================================================
// Mock Pins
// ============================================================================

/// Motion sensor whose level follows a script of `(from_millis, level)` pairs
pub struct MockSensor<'c> {
    clock: &'c SimClock,
    script: Vec<(u64, bool)>,
    faults: Vec<Range<u64>>,
}

impl<'c> MockSensor<'c> {
    pub fn new(clock: &'c SimClock, script: &[(u64, bool)]) -> Self {
        Self {
            clock,
            script: script.to_vec(),
            faults: Vec::new(),
        }
    }

    /// Every read during `window` fails
    pub fn failing_during(mut self, window: Range<u64>) -> Self {
        self.faults.push(window);
        self
    }

    fn level(&self) -> Result<bool, MockFault> {
        let now = self.clock.millis();
        if self.faults.iter().any(|window| window.contains(&now)) {
            return Err(MockFault);
        }
        Ok(self
            .script
            .iter()
            .take_while(|(from, _)| *from <= now)
            .last()
            .is_some_and(|(_, level)| *level))
    }
}

impl embedded_hal::digital::Error for MockFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for MockSensor<'_> {
    type Error = MockFault;
}

impl InputPin for MockSensor<'_> {
    fn is_high(&mut self) -> Result<bool, MockFault> {
        self.level()
    }

    fn is_low(&mut self) -> Result<bool, MockFault> {
        self.level().map(|level| !level)
    }
}

/// Output pin that records every level written to it
#[derive(Default)]
pub struct MockPin {
    pub levels: Vec<bool>,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }
}

// ============================================================================
// Mock Power Manager
// ============================================================================

/// Power manager that records requested deadlines and returns at once
#[derive(Default)]
pub struct MockPower {
    pub deadlines: Vec<u64>,
}

impl PowerManager<SimInstant> for MockPower {
    async fn suspend_until(&mut self, deadline: SimInstant) {
        self.deadlines.push(deadline.0);
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Timestamps of a log
pub fn times<T>(log: &Log<T>) -> Vec<u64> {
    log.borrow().iter().map(|(at, _)| *at).collect()
}

/// Values of a log, without timestamps
pub fn values<T: Clone>(log: &Log<T>) -> Vec<T> {
    log.borrow().iter().map(|(_, value)| value.clone()).collect()
}
