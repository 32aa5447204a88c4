//! Single-producer, single-consumer futures and promises.
//!
//! A [`Promise`] and a [`Future`] share one result cell. The promise resolves
//! it exactly once; the future reads it exactly once, either synchronously
//! with [`Future::get`] or by attaching a continuation through one of the
//! combinators.
//!
//! Continuations never run inline: attaching to a ready future, or resolving
//! a promise whose future has a continuation, pushes the continuation onto the
//! scheduler's run queue.
//!
//! ```rust,ignore
//! let (promise, future) = make_pair::<u32>(&handle);
//! let doubled = future.map(|v| v * 2);
//! promise.resolve(21)?;
//! ```

mod combinators;
mod state;
mod wait;
mod when_all;

pub use combinators::Futurize;
pub use wait::Wait;
pub use when_all::{when_all, when_both};

use state::{Completion, Continuation, ResultCell};

use crate::error::{Error, Result};
use crate::runtime::Handle;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Creates a connected promise/future pair on `handle`.
pub fn make_pair<T: 'static>(handle: &Handle) -> (Promise<T>, Future<T>) {
    let cell = Rc::new(RefCell::new(ResultCell::new()));

    let promise = Promise {
        cell: cell.clone(),
        handle: handle.clone(),
        resolved: Cell::new(false),
    };

    let future = Future {
        cell,
        handle: handle.clone(),
        consumed: false,
    };

    (promise, future)
}

/// The write side of a result cell.
///
/// Dropping an unresolved promise fails its future with
/// [`Error::BrokenPromise`].
pub struct Promise<T: 'static> {
    cell: Rc<RefCell<ResultCell<T>>>,
    handle: Handle,
    resolved: Cell<bool>,
}

impl<T: 'static> Promise<T> {
    /// Resolves the future with a value.
    pub fn resolve(&self, value: T) -> Result<()> {
        self.complete(Ok(value))
    }

    /// Resolves the future with a failure.
    pub fn fail(&self, error: Error) -> Result<()> {
        self.complete(Err(error))
    }

    /// Resolves the future with either outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyResolved`] if the promise was resolved before.
    pub fn complete(&self, outcome: Result<T>) -> Result<()> {
        if self.resolved.replace(true) {
            return Err(Error::AlreadyResolved);
        }

        if self.cell.borrow().is_abandoned() {
            if let Err(err) = &outcome {
                if !self.handle.is_closing() {
                    tracing::warn!(error = %err, "exceptional future ignored");
                }
            }
            return Ok(());
        }

        let completion = self.cell.borrow_mut().complete(outcome)?;

        if let Completion::Wake(continuation, outcome) = completion {
            self.handle.schedule(move || continuation(outcome));
        }

        Ok(())
    }

    /// Returns `true` once `resolve`, `fail` or `complete` has succeeded.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }
}

impl<T: 'static> Drop for Promise<T> {
    fn drop(&mut self) {
        if self.resolved.get() {
            return;
        }

        if !self.cell.borrow().is_abandoned() && !self.handle.is_closing() {
            tracing::warn!("promise dropped without being resolved");
        }

        let _ = self.complete(Err(Error::BrokenPromise));
    }
}

/// The read side of a result cell.
///
/// A future is move-only and is consumed either by [`get`](Self::get) or by
/// one combinator. A failed future dropped without its failure being
/// observed is logged.
#[must_use = "futures do nothing unless a continuation is attached or they are awaited"]
pub struct Future<T: 'static> {
    cell: Rc<RefCell<ResultCell<T>>>,
    handle: Handle,
    consumed: bool,
}

impl<T: 'static> Future<T> {
    /// Builds an already-terminal future.
    pub(crate) fn from_outcome(handle: &Handle, outcome: Result<T>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(ResultCell::with_outcome(outcome))),
            handle: handle.clone(),
            consumed: false,
        }
    }

    /// Returns `true` when the future holds a value or a failure.
    pub fn is_ready(&self) -> bool {
        !self.consumed && self.cell.borrow().is_ready()
    }

    /// Returns `true` when the future holds a failure.
    pub fn is_failed(&self) -> bool {
        !self.consumed && self.cell.borrow().is_failed()
    }

    /// Reads the outcome synchronously.
    ///
    /// # Errors
    ///
    /// - [`Error::NotReady`] if the future has not reached a terminal state,
    /// - the stored error if the future failed,
    /// - [`Error::AlreadyConsumed`] on any call after the outcome was read.
    pub fn get(&mut self) -> Result<T> {
        if self.consumed {
            return Err(Error::AlreadyConsumed);
        }

        let outcome = self.cell.borrow_mut().take();

        match outcome {
            Some(outcome) => {
                self.consumed = true;
                outcome
            }
            None if self.cell.borrow().is_pending() => Err(Error::NotReady),
            None => {
                self.consumed = true;
                Err(Error::AlreadyConsumed)
            }
        }
    }

    /// Discards the outcome of a ready future, failure included, without
    /// reporting it.
    pub fn ignore_ready_future(mut self) {
        self.consumed = true;
        let _ = self.cell.borrow_mut().take();
    }

    /// The scheduler this future resolves on.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Attaches the single continuation.
    ///
    /// The continuation is always queued on the scheduler, never run in the
    /// caller's stack.
    pub(crate) fn on_complete<F>(mut self, f: F)
    where
        F: FnOnce(Result<T>) + 'static,
    {
        let continuation: Continuation<T> = if self.consumed {
            Box::new(move |_| f(Err(Error::AlreadyConsumed)))
        } else {
            Box::new(f)
        };

        self.consumed = true;

        let ready = self.cell.borrow_mut().attach(continuation);

        if let Some((continuation, outcome)) = ready {
            self.handle.schedule(move || continuation(outcome));
        }
    }
}

impl<T: 'static> Drop for Future<T> {
    fn drop(&mut self) {
        if self.consumed {
            return;
        }

        let mut cell = self.cell.borrow_mut();
        cell.abandon();

        if let Some(Err(err)) = cell.take() {
            if !self.handle.is_closing() {
                tracing::warn!(error = %err, "exceptional future ignored");
            }
        }
    }
}

impl Handle {
    /// Creates a connected promise/future pair on this scheduler.
    pub fn make_pair<T: 'static>(&self) -> (Promise<T>, Future<T>) {
        make_pair(self)
    }

    /// Returns a future that is already resolved with `value`.
    pub fn ready<T: 'static>(&self, value: T) -> Future<T> {
        Future::from_outcome(self, Ok(value))
    }

    /// Returns a future that has already failed with `error`.
    pub fn failed<T: 'static>(&self, error: Error) -> Future<T> {
        Future::from_outcome(self, Err(error))
    }

    /// Runs `f` now and captures its outcome, failure included, as a future.
    pub fn futurize<T, F>(&self, f: F) -> Future<T>
    where
        T: 'static,
        F: FnOnce() -> Result<T>,
    {
        Future::from_outcome(self, f())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeBuilder;

    #[test]
    fn test_get_twice_reports_already_consumed() {
        let runtime = RuntimeBuilder::new().build().unwrap();
        let handle = runtime.handle();

        let mut future = handle.ready(5);

        assert!(future.is_ready());
        assert_eq!(future.get().unwrap(), 5);
        assert!(matches!(future.get(), Err(Error::AlreadyConsumed)));
        assert!(!future.is_ready());
    }

    #[test]
    fn test_get_before_resolution_is_not_ready() {
        let runtime = RuntimeBuilder::new().build().unwrap();
        let (promise, mut future) = runtime.handle().make_pair::<&str>();

        assert!(matches!(future.get(), Err(Error::NotReady)));

        promise.resolve("done").unwrap();
        assert_eq!(future.get().unwrap(), "done");
    }

    #[test]
    fn test_double_resolution_keeps_first_outcome() {
        let runtime = RuntimeBuilder::new().build().unwrap();
        let handle = runtime.handle();

        let (promise, mut future) = handle.make_pair::<u8>();
        promise.resolve(1).unwrap();
        assert!(matches!(promise.resolve(2), Err(Error::AlreadyResolved)));
        assert_eq!(future.get().unwrap(), 1);

        let (promise, mut future) = handle.make_pair::<u8>();
        promise.resolve(1).unwrap();
        assert!(matches!(
            promise.fail(Error::msg("late")),
            Err(Error::AlreadyResolved)
        ));
        assert_eq!(future.get().unwrap(), 1);

        let (promise, mut future) = handle.make_pair::<u8>();
        promise.fail(Error::msg("first")).unwrap();
        assert!(matches!(
            promise.fail(Error::msg("second")),
            Err(Error::AlreadyResolved)
        ));
        assert_eq!(future.get().unwrap_err().to_string(), "first");
    }

    #[test]
    fn test_failed_get_consumes_the_future() {
        let runtime = RuntimeBuilder::new().build().unwrap();
        let mut future = runtime.handle().failed::<()>(Error::msg("fail now"));

        assert!(future.is_failed());
        assert_eq!(future.get().unwrap_err().to_string(), "fail now");
        assert!(matches!(future.get(), Err(Error::AlreadyConsumed)));
    }

    #[test]
    fn test_dropped_promise_breaks_future() {
        let runtime = RuntimeBuilder::new().build().unwrap();
        let (promise, mut future) = runtime.handle().make_pair::<u32>();

        drop(promise);

        assert!(matches!(future.get(), Err(Error::BrokenPromise)));
    }

    #[test]
    fn test_futurize_captures_failure() {
        let runtime = RuntimeBuilder::new().build().unwrap();
        let handle = runtime.handle();

        let sanity_check = |arg: i32| -> Result<i32> {
            if arg == 0 {
                return Err(Error::msg("invalid argument '0'"));
            }
            Ok(arg)
        };

        let mut ok = handle.futurize(|| sanity_check(3));
        let failed = handle.futurize(|| sanity_check(0));

        assert_eq!(ok.get().unwrap(), 3);
        assert!(failed.is_failed());
        failed.ignore_ready_future();
    }
}
