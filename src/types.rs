//! Core types shared by tasks, drivers and triggers.

use palette::Srgb;

/// 8-bit RGB color as written to the light driver.
pub type Color = Srgb<u8>;

/// Light off.
pub const COLOR_OFF: Color = Srgb::new(0, 0, 0);

/// Pure red, the color every light animation lands on.
pub const COLOR_RED: Color = Srgb::new(255, 0, 0);

/// Which actuator channel a task drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorKind {
    /// RGB light (the prop's eyes).
    Light,

    /// Sound clip player.
    Audio,

    /// DC motor.
    Motor,
}

impl core::fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ActuatorKind::Light => write!(f, "light"),
            ActuatorKind::Audio => write!(f, "audio"),
            ActuatorKind::Motor => write!(f, "motor"),
        }
    }
}

/// How a light animation picks its colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightPolicy {
    /// Jump to a random color every tick, then flash red and go dark.
    Flicker,

    /// Walk toward random targets in integer increments, then home in on red,
    /// hold it and go dark.
    #[default]
    Fade,
}

/// Current decay mode of an H-bridge driven DC motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecayMode {
    /// Coast between PWM pulses.
    #[default]
    Fast,

    /// Brake between PWM pulses.
    Slow,
}

/// States a [`TimerTrigger`](crate::TimerTrigger) moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// Settling after power-up. Left once.
    Idle,

    /// Setting the actuator trigger signals in order.
    Firing,

    /// Joining on the actuators' done signals.
    WaitingAllDone,

    /// Waiting out the randomized interval before the next firing.
    Cooldown,
}
