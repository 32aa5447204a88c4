use super::{Future, Promise, make_pair};
use crate::error::{Error, Result};
use crate::runtime::Handle;

/// Conversion of a continuation's return value into a future.
///
/// Continuations may return a future, a `Result`, or `()`; the result is
/// flattened one level so `then` always yields a `Future<T>`.
pub trait Futurize<T: 'static> {
    /// Lifts `self` into a future resolving on `handle`.
    fn futurize(self, handle: &Handle) -> Future<T>;
}

impl<T: 'static> Futurize<T> for Future<T> {
    fn futurize(self, _handle: &Handle) -> Future<T> {
        self
    }
}

impl<T: 'static> Futurize<T> for Result<T> {
    fn futurize(self, handle: &Handle) -> Future<T> {
        Future::from_outcome(handle, self)
    }
}

impl Futurize<()> for () {
    fn futurize(self, handle: &Handle) -> Future<()> {
        handle.ready(())
    }
}

impl<T: 'static> Future<T> {
    /// Chains `f` on the value of this future.
    ///
    /// A failure skips `f` and is forwarded unchanged.
    pub fn then<U, R, F>(self, f: F) -> Future<U>
    where
        U: 'static,
        R: Futurize<U>,
        F: FnOnce(T) -> R + 'static,
    {
        let handle = self.handle.clone();
        let (promise, future) = make_pair(&handle);

        self.on_complete(move |outcome| match outcome {
            Ok(value) => f(value).futurize(&handle).forward(promise),
            Err(err) => {
                let _ = promise.fail(err);
            }
        });

        future
    }

    /// Chains a plain transformation of the value.
    pub fn map<U, F>(self, f: F) -> Future<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        let (promise, future) = make_pair(&self.handle);

        self.on_complete(move |outcome| {
            let _ = promise.complete(outcome.map(f));
        });

        future
    }

    /// Chains `f` on the terminal future, failure included.
    ///
    /// `f` receives a ready future and is responsible for consuming it.
    pub fn then_wrapped<U, R, F>(self, f: F) -> Future<U>
    where
        U: 'static,
        R: Futurize<U>,
        F: FnOnce(Future<T>) -> R + 'static,
    {
        let handle = self.handle.clone();
        let (promise, future) = make_pair(&handle);

        self.on_complete(move |outcome| {
            let ready = Future::from_outcome(&handle, outcome);
            f(ready).futurize(&handle).forward(promise);
        });

        future
    }

    /// Recovers from a failure.
    ///
    /// Values pass through untouched; on failure `f` decides between a
    /// replacement value and a new failure.
    pub fn handle_exception<R, F>(self, f: F) -> Future<T>
    where
        R: Futurize<T>,
        F: FnOnce(Error) -> R + 'static,
    {
        let handle = self.handle.clone();
        let (promise, future) = make_pair(&handle);

        self.on_complete(move |outcome| match outcome {
            Ok(value) => {
                let _ = promise.resolve(value);
            }
            Err(err) => f(err).futurize(&handle).forward(promise),
        });

        future
    }

    /// Runs `f` once the future is terminal, whatever the outcome.
    ///
    /// The original outcome is forwarded once the future returned by `f`
    /// completes. A failure of `f` is logged and does not replace it.
    pub fn finally<R, F>(self, f: F) -> Future<T>
    where
        R: Futurize<()>,
        F: FnOnce() -> R + 'static,
    {
        let handle = self.handle.clone();
        let (promise, future) = make_pair(&handle);

        self.on_complete(move |outcome| {
            f().futurize(&handle).on_complete(move |cleanup| {
                if let Err(err) = cleanup {
                    tracing::warn!(error = %err, "finally callback failed");
                }
                let _ = promise.complete(outcome);
            });
        });

        future
    }

    /// Drops the value, keeping failures.
    pub fn discard_result(self) -> Future<()> {
        self.map(|_| ())
    }

    /// Pipes the outcome of this future into `promise`.
    pub(crate) fn forward(mut self, promise: Promise<T>) {
        if self.is_ready() {
            let _ = promise.complete(self.get());
            return;
        }

        self.on_complete(move |outcome| {
            let _ = promise.complete(outcome);
        });
    }
}
