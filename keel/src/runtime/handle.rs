use super::context;
use super::scheduler::Scheduler;
use crate::error::Result;
use crate::future::{Future, Promise};
use crate::reactor::Direction;

use std::os::fd::RawFd;
use std::rc::Rc;
use std::time::Instant;

/// A cloneable reference to a scheduler.
///
/// Every component that enqueues work holds one: promises use it to queue
/// continuations, sockets and timers use it to reach the reactor. A `Handle`
/// is tied to the thread that built its runtime.
#[derive(Clone)]
pub struct Handle {
    inner: Rc<Scheduler>,
}

impl Handle {
    pub(crate) fn new(scheduler: Rc<Scheduler>) -> Self {
        Self { inner: scheduler }
    }

    /// Returns the handle of the runtime driving the current thread.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a running runtime.
    pub fn current() -> Self {
        Self::try_current().expect("Handle::current must be called within the context of a runtime")
    }

    /// Returns the handle of the runtime driving the current thread, if any.
    pub fn try_current() -> Option<Self> {
        context::current()
    }

    /// Spawns a fallible fiber and returns a future for its outcome.
    ///
    /// The fiber starts on a later turn of the loop, never inline.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let sum = handle.spawn(async move {
    ///     let a = first.await?;
    ///     let b = second.await?;
    ///     Ok(a + b)
    /// });
    /// ```
    pub fn spawn<F, T>(&self, fiber: F) -> Future<T>
    where
        F: std::future::Future<Output = Result<T>> + 'static,
        T: 'static,
    {
        let (promise, future) = self.make_pair();

        self.spawn_detached(async move {
            let _ = promise.complete(fiber.await);
        });

        future
    }

    /// Spawns a fiber whose completion nobody waits for.
    pub fn spawn_detached<F>(&self, fiber: F)
    where
        F: std::future::Future<Output = ()> + 'static,
    {
        self.inner.spawn(Box::pin(fiber));
    }

    /// Returns a future that resolves on a later turn when the current slice
    /// has used up the task quota, and a ready future otherwise.
    ///
    /// This is the yield point for continuation-style loops; fibers use
    /// [`maybe_yield`](crate::maybe_yield) instead.
    pub fn maybe_yield(&self) -> Future<()> {
        if !self.need_preempt() {
            return self.ready(());
        }

        let (promise, future) = self.make_pair();
        self.schedule(move || {
            let _ = promise.resolve(());
        });

        future
    }

    /// Returns `true` when a yield point reached now should suspend.
    pub fn need_preempt(&self) -> bool {
        self.inner.need_preempt()
    }

    pub(crate) fn schedule<F>(&self, continuation: F)
    where
        F: FnOnce() + 'static,
    {
        self.inner.schedule(Box::new(continuation));
    }

    /// Returns `true` once the runtime is tearing down its leftover work.
    pub(crate) fn is_closing(&self) -> bool {
        self.inner.is_closing()
    }

    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.inner
    }

    /// Resolves `promise` once `deadline` has passed.
    pub(crate) fn add_timer(&self, deadline: Instant, promise: Promise<()>) {
        self.inner
            .reactor()
            .borrow_mut()
            .add_timer(deadline, promise);
    }

    /// Returns a future resolved once `fd` is ready in `direction`.
    pub(crate) fn readiness(&self, fd: RawFd, direction: Direction) -> Future<()> {
        let (promise, future) = self.make_pair();

        self.inner
            .reactor()
            .borrow_mut()
            .register(fd, direction, promise);

        future
    }

    /// Fails every readiness wait registered for `fd` with `reason`.
    pub(crate) fn abort_io(&self, fd: RawFd, reason: std::io::ErrorKind) {
        let waiters = self.inner.reactor().borrow_mut().forget(fd);

        for promise in waiters {
            let _ = promise.fail(std::io::Error::from(reason).into());
        }
    }
}
