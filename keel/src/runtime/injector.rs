use crate::reactor::poller::Waker;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Wake-up queue shared between the scheduler and task wakers.
///
/// `std::task::Waker` must be `Send + Sync`, so fiber wake-ups cannot touch
/// the single-threaded run queue directly. Wakers push task ids here; the
/// scheduler moves them onto the run queue on its next iteration.
///
/// While the scheduler is parked in the poller, a push also interrupts the
/// poll so the wake-up is not delayed until the next timer or I/O event.
pub(crate) struct Injector {
    /// Ids of woken tasks, oldest first.
    woken: Mutex<VecDeque<usize>>,

    /// Set while the scheduler is blocked in the poller.
    parked: AtomicBool,

    /// Interrupts a blocking poll.
    waker: Arc<Waker>,
}

impl Injector {
    pub(crate) fn new(waker: Arc<Waker>) -> Self {
        Self {
            woken: Mutex::new(VecDeque::new()),
            parked: AtomicBool::new(false),
            waker,
        }
    }

    /// Records a wake-up for `task`.
    pub(crate) fn push(&self, task: usize) {
        self.woken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);

        if self.parked.load(Ordering::Acquire) {
            self.waker.wake();
        }
    }

    /// Moves every recorded wake-up out of the injector.
    pub(crate) fn drain(&self) -> VecDeque<usize> {
        std::mem::take(&mut *self.woken.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.woken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Marks the scheduler as parked or running.
    ///
    /// Callers must re-check [`is_empty`](Self::is_empty) after parking so a
    /// push racing with the flag is never lost.
    pub(crate) fn set_parked(&self, parked: bool) {
        self.parked.store(parked, Ordering::Release);
    }
}
