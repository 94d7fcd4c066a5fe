//! Logging macros.
//!
//! Forwards to `defmt` on firmware builds and to `tracing` on host builds.
//! With neither feature enabled the macros compile to nothing, but their
//! arguments are still type-checked.
#![macro_use]
#![allow(unused_macros)]

macro_rules! log_event {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(feature = "tracing")]
            ::tracing::$level!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "tracing")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! trace {
    ($($t:tt)*) => { log_event!(trace, $($t)*) };
}

macro_rules! debug {
    ($($t:tt)*) => { log_event!(debug, $($t)*) };
}

macro_rules! info {
    ($($t:tt)*) => { log_event!(info, $($t)*) };
}

macro_rules! warn {
    ($($t:tt)*) => { log_event!(warn, $($t)*) };
}

macro_rules! error {
    ($($t:tt)*) => { log_event!(error, $($t)*) };
}

/// Logs a driver error through `Debug`, whichever backend is active.
pub(crate) struct Dbg<'a, T: core::fmt::Debug>(pub &'a T);

impl<T: core::fmt::Debug> core::fmt::Debug for Dbg<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(feature = "defmt")]
impl<T: core::fmt::Debug> defmt::Format for Dbg<'_, T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", defmt::Debug2Format(self.0))
    }
}
