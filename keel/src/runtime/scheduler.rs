use super::builder::Config;
use super::injector::Injector;
use super::task::{Fiber, Task, make_waker};
use crate::error::{Error, Result};
use crate::reactor::Reactor;
use crate::utils::Slab;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Number of runnables executed between two non-blocking reactor turns.
const REACTOR_INTERVAL: usize = 64;

/// One entry of the run queue.
pub(crate) enum Runnable {
    /// A continuation released by a resolved promise.
    Continuation(Box<dyn FnOnce()>),

    /// A poll of the fiber with this id.
    Task(usize),
}

/// The single-threaded cooperative scheduler.
///
/// Everything runs to completion on the thread driving the loop: a runnable
/// is popped, executed, and the next one follows. The reactor is turned when
/// the queue is empty, and every [`REACTOR_INTERVAL`] runnables otherwise so
/// that a busy queue cannot starve I/O and timers.
pub(crate) struct Scheduler {
    /// FIFO of runnables.
    queue: RefCell<VecDeque<Runnable>>,

    /// Spawned fibers, indexed by the id their wakers carry.
    tasks: RefCell<Slab<Task>>,

    /// Cross-thread wake-ups for fibers.
    injector: Arc<Injector>,

    /// Timers and I/O readiness.
    reactor: RefCell<Reactor>,

    /// Time a runnable may hold the thread before yield points suspend.
    task_quota: Duration,

    /// Start of the current runnable's slice.
    slice_start: Cell<Instant>,

    /// Depth of `without_yield_check` sections currently being polled.
    suppressed: Cell<usize>,

    /// Set while a runtime drives the loop.
    running: Cell<bool>,

    /// Set once the owning runtime is being dropped.
    closing: Cell<bool>,
}

impl Scheduler {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let reactor = Reactor::new(config.event_capacity)?;
        let injector = Arc::new(Injector::new(reactor.waker()));

        Ok(Self {
            queue: RefCell::new(VecDeque::new()),
            tasks: RefCell::new(Slab::new(16)),
            injector,
            reactor: RefCell::new(reactor),
            task_quota: config.task_quota,
            slice_start: Cell::new(Instant::now()),
            suppressed: Cell::new(0),
            running: Cell::new(false),
            closing: Cell::new(false),
        })
    }

    /// Pushes a continuation at the back of the run queue.
    pub(crate) fn schedule(&self, continuation: Box<dyn FnOnce()>) {
        self.queue
            .borrow_mut()
            .push_back(Runnable::Continuation(continuation));
    }

    /// Registers a fiber and queues its first poll.
    pub(crate) fn spawn(&self, fiber: Fiber) {
        let id = self.tasks.borrow_mut().insert(Task::new(fiber));
        tracing::trace!(task = id, "fiber spawned");

        self.queue.borrow_mut().push_back(Runnable::Task(id));
    }

    pub(crate) fn reactor(&self) -> &RefCell<Reactor> {
        &self.reactor
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.closing.get()
    }

    /// Returns `true` once the running slice has used up the task quota.
    pub(crate) fn need_preempt(&self) -> bool {
        self.suppressed.get() == 0 && self.slice_start.get().elapsed() >= self.task_quota
    }

    pub(crate) fn suppress_preemption(&self) {
        self.suppressed.set(self.suppressed.get() + 1);
    }

    pub(crate) fn restore_preemption(&self) {
        self.suppressed.set(self.suppressed.get().saturating_sub(1));
    }

    /// Runs the loop until `done` holds.
    ///
    /// With `stop_when_idle`, running out of work ends the loop successfully;
    /// otherwise it is reported as [`Error::Stalled`].
    ///
    /// # Panics
    ///
    /// Panics if the loop is already running on this scheduler.
    pub(crate) fn run_until(&self, done: &dyn Fn() -> bool, stop_when_idle: bool) -> Result<()> {
        assert!(
            !self.running.replace(true),
            "the runtime loop cannot be entered recursively"
        );

        let outcome = self.run_loop(done, stop_when_idle);

        self.running.set(false);
        outcome
    }

    fn run_loop(&self, done: &dyn Fn() -> bool, stop_when_idle: bool) -> Result<()> {
        let mut ticks = 0usize;

        loop {
            if done() {
                return Ok(());
            }

            self.absorb_wakeups();

            let next = self.queue.borrow_mut().pop_front();

            if let Some(runnable) = next {
                self.slice_start.set(Instant::now());
                self.run(runnable);

                ticks += 1;
                if ticks % REACTOR_INTERVAL == 0 {
                    self.turn_reactor(Some(Duration::ZERO))?;
                }

                continue;
            }

            if !self.reactor.borrow().has_pending() && self.injector.is_empty() {
                if stop_when_idle {
                    return Ok(());
                }

                tracing::debug!("run queue empty with nothing pending");
                return Err(Error::Stalled);
            }

            self.park()?;
        }
    }

    fn run(&self, runnable: Runnable) {
        match runnable {
            Runnable::Continuation(continuation) => continuation(),
            Runnable::Task(id) => self.poll_task(id),
        }
    }

    fn poll_task(&self, id: usize) {
        let fiber = match self.tasks.borrow_mut().get_mut(id) {
            Some(task) => task.begin(),
            None => None,
        };

        let Some(mut fiber) = fiber else {
            return;
        };

        let waker = make_waker(id, self.injector.clone());
        let mut cx = Context::from_waker(&waker);

        match fiber.as_mut().poll(&mut cx) {
            Poll::Pending => {
                let requeue = match self.tasks.borrow_mut().get_mut(id) {
                    Some(task) => task.suspend(fiber),
                    None => false,
                };

                if requeue {
                    self.queue.borrow_mut().push_back(Runnable::Task(id));
                }
            }
            Poll::Ready(()) => {
                let finished = self.tasks.borrow_mut().remove(id);
                tracing::trace!(task = id, "fiber finished");

                drop(finished);
                drop(fiber);
            }
        }
    }

    /// Moves woken fibers onto the run queue, oldest wake-up first.
    fn absorb_wakeups(&self) {
        let woken = self.injector.drain();

        if woken.is_empty() {
            return;
        }

        let mut tasks = self.tasks.borrow_mut();
        let mut queue = self.queue.borrow_mut();

        for id in woken {
            if let Some(task) = tasks.get_mut(id) {
                if task.notify() {
                    queue.push_back(Runnable::Task(id));
                }
            }
        }
    }

    /// Blocks in the poller until the next timer, I/O event or wake-up.
    fn park(&self) -> Result<()> {
        let timeout = self.reactor.borrow().next_timeout();

        self.injector.set_parked(true);

        if !self.injector.is_empty() {
            self.injector.set_parked(false);
            return Ok(());
        }

        let turned = self.turn_reactor(timeout);
        self.injector.set_parked(false);

        turned
    }

    /// Polls the reactor once and resolves whatever fired.
    ///
    /// Promises are resolved after the reactor borrow is released.
    fn turn_reactor(&self, timeout: Option<Duration>) -> Result<()> {
        let fired = self.reactor.borrow_mut().poll(timeout)?;

        for (promise, outcome) in fired {
            let _ = promise.complete(outcome);
        }

        Ok(())
    }

    /// Tears the scheduler down.
    ///
    /// Queued continuations, fibers and reactor waiters hold handles back to
    /// the scheduler, so they are dropped explicitly, repeatedly, until
    /// nothing is left: dropping one may release another.
    pub(crate) fn shutdown(&self) {
        self.closing.set(true);

        loop {
            let queue = std::mem::take(&mut *self.queue.borrow_mut());
            let tasks = self.tasks.borrow_mut().drain();
            let waiters = self.reactor.borrow_mut().drain();

            if queue.is_empty() && tasks.is_empty() && waiters.is_empty() {
                break;
            }

            tracing::trace!(
                queued = queue.len(),
                fibers = tasks.len(),
                waiters = waiters.len(),
                "dropping leftover work"
            );

            drop(queue);
            drop(tasks);
            drop(waiters);
        }

        let _ = self.injector.drain();
    }
}
