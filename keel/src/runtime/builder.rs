use super::Runtime;
use crate::error::Result;

use std::time::Duration;

/// Default time a runnable may hold the scheduler before `maybe_yield` suspends.
const DEFAULT_TASK_QUOTA: Duration = Duration::from_micros(500);

/// Default number of readiness events collected per reactor turn.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Runtime settings collected by [`RuntimeBuilder`].
#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) task_quota: Duration,
    pub(crate) event_capacity: usize,
}

/// Builder for configuring and creating a runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .task_quota(Duration::from_micros(200))
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config: Config,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config {
                task_quota: DEFAULT_TASK_QUOTA,
                event_capacity: DEFAULT_EVENT_CAPACITY,
            },
        }
    }

    /// Sets how long a runnable may run before `maybe_yield` suspends it.
    ///
    /// `Duration::ZERO` makes every yield point suspend.
    pub fn task_quota(mut self, quota: Duration) -> Self {
        self.config.task_quota = quota;
        self
    }

    /// Sets the number of readiness events collected per reactor turn.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "event_capacity must be > 0");

        self.config.event_capacity = capacity;
        self
    }

    /// Builds the runtime with the configured options.
    ///
    /// # Errors
    ///
    /// Fails if the OS poller cannot be created.
    pub fn build(self) -> Result<Runtime> {
        Runtime::new(self.config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
