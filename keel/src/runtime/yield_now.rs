use super::Handle;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that yields execution back to the scheduler exactly once.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    /// On the first poll the fiber wakes itself and returns `Pending`, which
    /// puts it at the back of the run queue. The second poll completes.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.0 {
            self.0 = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }

        Poll::Ready(())
    }
}

/// Yields execution back to the scheduler unconditionally.
///
/// # Examples
///
/// ```rust,ignore
/// async fn task() {
///     // Allow other fibers to run
///     yield_now().await;
/// }
/// ```
pub async fn yield_now() {
    YieldOnce(false).await
}

/// Yields only if the current slice has used up the task quota.
///
/// Long loops call this once per iteration: it costs a clock read while the
/// quota lasts and re-queues the fiber behind other runnables once it is
/// exceeded. Outside a runtime, or inside [`without_yield_check`], it never
/// suspends.
pub async fn maybe_yield() {
    let preempt = Handle::try_current().is_some_and(|handle| handle.need_preempt());

    if preempt {
        YieldOnce(false).await
    }
}

/// Runs `future` with yield points disabled.
///
/// Every poll of `future` happens with [`maybe_yield`] turned into a no-op,
/// so the section runs to completion without being re-queued. Unconditional
/// [`yield_now`] calls and real I/O waits still suspend.
pub fn without_yield_check<F: Future>(future: F) -> WithoutYieldCheck<F> {
    WithoutYieldCheck {
        future: Box::pin(future),
    }
}

/// Future returned by [`without_yield_check`].
pub struct WithoutYieldCheck<F> {
    future: Pin<Box<F>>,
}

/// Restores yield checks when the poll returns or unwinds.
struct Suppressed(Option<Handle>);

impl Suppressed {
    fn enter() -> Self {
        let handle = Handle::try_current();

        if let Some(handle) = &handle {
            handle.scheduler().suppress_preemption();
        }

        Self(handle)
    }
}

impl Drop for Suppressed {
    fn drop(&mut self) {
        if let Some(handle) = &self.0 {
            handle.scheduler().restore_preemption();
        }
    }
}

impl<F: Future> Future for WithoutYieldCheck<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _suppressed = Suppressed::enter();

        self.future.as_mut().poll(cx)
    }
}
