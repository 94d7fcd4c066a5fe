//! Error types.
//!
//! Configuration problems are reported by constructors and are meant to stop
//! the firmware at startup. Peripheral errors are produced while an animation
//! runs and are absorbed at the task-loop boundary.

use crate::types::ActuatorKind;

/// Invalid construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A trigger referenced a task name that is not registered.
    UnknownTask(&'static str),

    /// Two tasks were registered under the same name.
    DuplicateTask(&'static str),

    /// The registry has no free slot left.
    RegistryFull,

    /// An audio playlist has no clips.
    EmptyPlaylist,

    /// A fixed-capacity list overflowed.
    CapacityExceeded,

    /// A `min..=max` or `low..high` pair is inverted or empty.
    InvalidRange {
        /// Name of the offending setting.
        what: &'static str,
    },

    /// A step count or increment is zero.
    ZeroStep {
        /// Name of the offending setting.
        what: &'static str,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::UnknownTask(name) => write!(f, "no task registered as \"{}\"", name),
            ConfigError::DuplicateTask(name) => {
                write!(f, "task \"{}\" is already registered", name)
            }
            ConfigError::RegistryFull => write!(f, "task registry is full"),
            ConfigError::EmptyPlaylist => write!(f, "playlist must have at least one clip"),
            ConfigError::CapacityExceeded => write!(f, "capacity exceeded"),
            ConfigError::InvalidRange { what } => write!(f, "invalid range for {}", what),
            ConfigError::ZeroStep { what } => write!(f, "{} must be non-zero", what),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Which peripheral a failed driver call belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    /// One of the actuator channels.
    Actuator(ActuatorKind),

    /// The motion sensor input.
    Sensor,

    /// The motion indicator output.
    Indicator,
}

/// A driver call failed.
///
/// The driver's own error is logged where it happens; this value only
/// records which peripheral failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralError {
    /// The failing peripheral.
    pub peripheral: Peripheral,
}

impl PeripheralError {
    /// Creates an error for `peripheral`.
    pub const fn new(peripheral: Peripheral) -> Self {
        Self { peripheral }
    }
}

impl core::fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.peripheral {
            Peripheral::Actuator(kind) => write!(f, "{} driver failed", kind),
            Peripheral::Sensor => write!(f, "motion sensor read failed"),
            Peripheral::Indicator => write!(f, "motion indicator write failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PeripheralError {}

/// Any error reported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid construction parameters.
    Config(ConfigError),

    /// A driver call failed.
    Peripheral(PeripheralError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(err) => write!(f, "configuration error: {}", err),
            Error::Peripheral(err) => write!(f, "peripheral error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<PeripheralError> for Error {
    fn from(err: PeripheralError) -> Self {
        Error::Peripheral(err)
    }
}

/// Maps a driver error into a [`PeripheralError`], logging the driver's
/// `Debug` output first.
pub(crate) fn driver_error<E: core::fmt::Debug>(peripheral: Peripheral) -> impl FnOnce(E) -> PeripheralError {
    move |err| {
        warn!("{:?} driver error: {:?}", peripheral, crate::fmt::Dbg(&err));
        PeripheralError::new(peripheral)
    }
}
