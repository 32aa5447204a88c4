use super::Handle;
use super::builder::Config;
use super::context::enter_context;
use super::scheduler::Scheduler;
use crate::error::Result;
use crate::future::Future;

use std::rc::Rc;

/// The main runtime handle.
///
/// `Runtime` is responsible for:
/// - owning the scheduler and its reactor,
/// - driving the loop through [`run`](Self::run), [`block_on`](Self::block_on)
///   and [`run_until_idle`](Self::run_until_idle),
/// - installing its [`Handle`] as the thread's current context while it runs.
///
/// Dropping the runtime drops every fiber, continuation and I/O wait still
/// pending.
pub struct Runtime {
    handle: Handle,
}

impl Runtime {
    pub(crate) fn new(config: Config) -> Result<Self> {
        let scheduler = Scheduler::new(&config)?;

        tracing::debug!(
            task_quota_us = config.task_quota.as_micros() as u64,
            event_capacity = config.event_capacity,
            "runtime created"
        );

        Ok(Self {
            handle: Handle::new(Rc::new(scheduler)),
        })
    }

    /// The handle used to create futures and spawn fibers on this runtime.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Builds the entry computation with `f` and runs the loop until it is
    /// terminal.
    ///
    /// # Errors
    ///
    /// Returns the entry's failure, or [`Error::Stalled`](crate::Error::Stalled)
    /// if the loop runs out of work first.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let value = runtime.run(|handle| handle.ready(20).map(|v| v + 1))?;
    /// assert_eq!(value, 21);
    /// ```
    pub fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: 'static,
        F: FnOnce(&Handle) -> Future<T>,
    {
        let entry = enter_context(&self.handle, || f(&self.handle));
        self.drive(entry)
    }

    /// Runs an `async` body as the entry fiber and returns its output.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let result = runtime.block_on(async {
    ///     42
    /// })?;
    /// assert_eq!(result, 42);
    /// ```
    pub fn block_on<F>(&self, body: F) -> Result<F::Output>
    where
        F: std::future::Future + 'static,
        F::Output: 'static,
    {
        let entry = self.handle.spawn(async move { Ok(body.await) });
        self.drive(entry)
    }

    /// Runs until no runnable work, timer or I/O wait is left.
    pub fn run_until_idle(&self) -> Result<()> {
        let scheduler = self.handle.scheduler();

        enter_context(&self.handle, || scheduler.run_until(&|| false, true))
    }

    fn drive<T: 'static>(&self, mut entry: Future<T>) -> Result<T> {
        let scheduler = self.handle.scheduler();

        enter_context(&self.handle, || {
            scheduler.run_until(&|| entry.is_ready(), false)
        })?;

        entry.get()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let scheduler = self.handle.scheduler();
        enter_context(&self.handle, || scheduler.shutdown());
    }
}
