use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::Vec;

use crate::error::ConfigError;
use crate::task::TaskSignals;

/// Default registry capacity.
pub const MAX_TASKS: usize = 8;

/// Immutable mapping from task name to that task's signals.
///
/// Built once while the prop is assembled and then handed by reference to
/// trigger constructors, which resolve the names they need up front. The
/// registry never owns the signals; it only borrows them.
///
/// # Type Parameters
/// * `'s` - Lifetime of the borrowed signals
/// * `M` - Raw mutex type of the signals
/// * `N` - Maximum number of tasks
pub struct Registry<'s, M: RawMutex, const N: usize = MAX_TASKS> {
    entries: Vec<(&'static str, &'s TaskSignals<M>), N>,
}

impl<'s, M: RawMutex, const N: usize> Registry<'s, M, N> {
    /// Creates a new registry builder.
    pub fn builder() -> RegistryBuilder<'s, M, N> {
        RegistryBuilder::new()
    }

    /// Looks up the signals registered as `name`.
    ///
    /// # Errors
    /// * `UnknownTask` - no task has this name
    pub fn get(&self, name: &'static str) -> Result<&'s TaskSignals<M>, ConfigError> {
        self.entries
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, signals)| *signals)
            .ok_or(ConfigError::UnknownTask(name))
    }

    /// Returns true if a task is registered as `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(registered, _)| *registered == name)
    }

    /// Returns the number of registered tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

/// Builder for a [`Registry`].
pub struct RegistryBuilder<'s, M: RawMutex, const N: usize> {
    entries: Vec<(&'static str, &'s TaskSignals<M>), N>,
}

impl<'s, M: RawMutex, const N: usize> RegistryBuilder<'s, M, N> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `signals` under `name`.
    ///
    /// # Errors
    /// * `DuplicateTask` - `name` is already registered
    /// * `RegistryFull` - `N` tasks are already registered
    pub fn register(
        mut self,
        name: &'static str,
        signals: &'s TaskSignals<M>,
    ) -> Result<Self, ConfigError> {
        if self.entries.iter().any(|(registered, _)| *registered == name) {
            return Err(ConfigError::DuplicateTask(name));
        }

        self.entries
            .push((name, signals))
            .map_err(|_| ConfigError::RegistryFull)?;
        Ok(self)
    }

    /// Freezes the registry.
    pub fn build(self) -> Registry<'s, M, N> {
        Registry {
            entries: self.entries,
        }
    }
}

impl<'s, M: RawMutex, const N: usize> Default for RegistryBuilder<'s, M, N> {
    fn default() -> Self {
        Self::new()
    }
}
