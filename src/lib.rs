#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Signal`**: Broadcast set/wait/clear flag used for every handoff
//! - **`TaskSignals`**: The trigger/done signal pair of one actuator task
//! - **`Actuator`**: Trait for one bounded animation (`LightAnimation`, `AudioPlayback`, `MotorRamp`)
//! - **`ActuatorTask`**: The shared wait → clear → animate → done loop
//! - **`Registry`**: Immutable name → signals mapping built at startup
//! - **`FanOut`**: Starts light, audio and motor in that order with staggered pauses
//! - **`TimerTrigger`**: Fires, joins on every done signal, rests, repeats
//! - **`MotionTrigger`**: Fires on each rising edge of a polled motion sensor
//! - **`TaskSet`**: Joins the four tasks into one future for the executor
//! - **`Clock`**: Trait to implement for your timing system
//! - **`LightDriver`**, **`AudioDriver`**, **`MotorDriver`**, **`PowerManager`**: Traits to implement for your hardware
//!
//! The library uses `Srgb<u8>` for light colors and percent duty values for
//! the motor ramp. Everything runs on a single-threaded cooperative executor:
//! embassy on hardware, [`sim::Simulation`] on the host.

// Must stay first so the logging macros are visible to every module.
mod fmt;

pub mod audio;
pub mod driver;
#[cfg(feature = "embassy-time")]
pub mod embassy;
pub mod error;
pub mod fan_out;
pub mod light;
pub mod motion;
pub mod motor;
pub mod pwm;
pub mod registry;
pub mod signal;
#[cfg(feature = "std")]
pub mod sim;
pub mod task;
pub mod task_set;
pub mod time;
pub mod timer;
pub mod types;

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub use audio::{AudioPlayback, MAX_CLIPS, Playlist, PlaylistBuilder};
pub use driver::{AudioDriver, LightDriver, MotorDriver, NoIndicator, NoPowerManager, PowerManager};
#[cfg(feature = "embassy-time")]
pub use embassy::EmbassyClock;
pub use error::{ConfigError, Error, Peripheral, PeripheralError};
pub use fan_out::{FanOut, FanOutConfig};
pub use light::{LightAnimation, LightConfig};
pub use motion::{MotionConfig, MotionTrigger};
pub use motor::{MotorConfig, MotorRamp};
pub use pwm::{PwmDcMotor, PwmRgbLight};
pub use registry::{MAX_TASKS, Registry, RegistryBuilder};
pub use signal::{DEFAULT_WAITERS, Signal};
pub use task::{Actuator, ActuatorTask, Task, TaskSignals};
pub use task_set::TaskSet;
pub use time::{Clock, ClockDuration, TimeDuration, TimeInstant};
pub use timer::{TimerConfig, TimerTrigger};
pub use types::{ActuatorKind, COLOR_OFF, COLOR_RED, Color, DecayMode, LightPolicy, TimerState};
