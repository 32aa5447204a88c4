use super::event::Event;
use super::io::{Direction, Registration};
use super::poller::{Poller, Waker};
use super::timer::TimerEntry;
use crate::error::{Error, Result};
use crate::future::Promise;
use crate::utils::Slab;

use std::collections::{BinaryHeap, HashMap};
use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A promise whose timer or readiness fired, with the outcome to resolve it with.
pub(crate) type Fired = (Promise<()>, Result<()>);

/// The reactor.
///
/// Unlike a reactor running on its own thread, this one is turned by the
/// scheduler: [`poll`](Self::poll) blocks for at most the given timeout and
/// returns the promises to resolve. It never resolves them itself so that no
/// continuation can observe the reactor mid-update.
pub(crate) struct Reactor {
    /// Platform-specific poller (epoll, poll).
    poller: Poller,

    /// Buffer used to collect I/O events from the poller.
    events: Vec<Event>,

    /// Min-heap of pending timers ordered by deadline.
    timers: BinaryHeap<TimerEntry>,

    /// Sequence number of the next timer.
    next_seq: u64,

    /// Registrations indexed by poller token.
    io: Slab<Registration>,

    /// Token of each registered descriptor.
    tokens: HashMap<RawFd, usize>,
}

impl Reactor {
    /// Creates a reactor collecting up to `capacity` events per turn.
    pub(crate) fn new(capacity: usize) -> io::Result<Self> {
        Ok(Self {
            poller: Poller::new(capacity)?,
            events: Vec::with_capacity(capacity),
            timers: BinaryHeap::new(),
            next_seq: 0,
            io: Slab::new(64),
            tokens: HashMap::new(),
        })
    }

    /// Returns the waker that interrupts a blocking [`poll`](Self::poll).
    pub(crate) fn waker(&self) -> Arc<Waker> {
        self.poller.waker()
    }

    /// Schedules `promise` to be resolved once `deadline` has passed.
    pub(crate) fn add_timer(&mut self, deadline: Instant, promise: Promise<()>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.timers.push(TimerEntry {
            deadline,
            seq,
            promise,
        });
    }

    /// Registers a one-shot readiness wait.
    ///
    /// The promise is failed right away if another wait in the same
    /// direction is already registered for `fd`, or if the poller rejects
    /// the descriptor.
    pub(crate) fn register(&mut self, fd: RawFd, direction: Direction, promise: Promise<()>) {
        let token = match self.tokens.get(&fd) {
            Some(&token) => token,
            None => {
                let token = self.io.insert(Registration::new(fd));
                self.tokens.insert(fd, token);
                token
            }
        };

        let Some(registration) = self.io.get_mut(token) else {
            let _ = promise.fail(Error::Io(io::Error::from(io::ErrorKind::NotFound)));
            return;
        };

        let slot = registration.slot(direction);

        if slot.is_some() {
            let _ = promise.fail(Error::Io(io::Error::new(
                io::ErrorKind::ResourceBusy,
                "another wait is registered in this direction",
            )));
            return;
        }

        *slot = Some(promise);
        tracing::trace!(fd, ?direction, token, "readiness wait registered");

        if let Err(err) = self.rearm(token) {
            let waiters = self.release(token);
            for promise in waiters {
                let _ = promise.fail(Error::Io(io::Error::new(err.kind(), err.to_string())));
            }
        }
    }

    /// Removes every wait registered for `fd` and returns their promises.
    pub(crate) fn forget(&mut self, fd: RawFd) -> Vec<Promise<()>> {
        match self.tokens.get(&fd) {
            Some(&token) => self.release(token),
            None => Vec::new(),
        }
    }

    /// Returns `true` while any timer or readiness wait is outstanding.
    pub(crate) fn has_pending(&self) -> bool {
        !self.timers.is_empty() || !self.io.is_empty()
    }

    /// Time left until the earliest timer, if any.
    pub(crate) fn next_timeout(&self) -> Option<Duration> {
        self.timers
            .peek()
            .map(|timer| timer.deadline.saturating_duration_since(Instant::now()))
    }

    /// Waits for I/O readiness for at most `timeout`, then collects every
    /// fired readiness wait and expired timer.
    pub(crate) fn poll(&mut self, timeout: Option<Duration>) -> io::Result<Vec<Fired>> {
        let mut events = std::mem::take(&mut self.events);
        let polled = self.poller.poll(&mut events, timeout);

        let mut fired = Vec::new();

        if polled.is_ok() {
            for event in events.drain(..) {
                self.dispatch(event, &mut fired);
            }
        }

        self.events = events;
        polled?;

        let now = Instant::now();
        while self.timers.peek().is_some_and(|timer| timer.deadline <= now) {
            if let Some(timer) = self.timers.pop() {
                fired.push((timer.promise, Ok(())));
            }
        }

        Ok(fired)
    }

    /// Removes every timer and registration.
    ///
    /// The promises are returned so the caller drops them outside any
    /// reactor borrow.
    pub(crate) fn drain(&mut self) -> Vec<Promise<()>> {
        let mut waiters: Vec<Promise<()>> = self.timers.drain().map(|timer| timer.promise).collect();

        let tokens: Vec<usize> = self.tokens.values().copied().collect();
        for token in tokens {
            waiters.extend(self.release(token));
        }

        waiters
    }

    fn dispatch(&mut self, event: Event, fired: &mut Vec<Fired>) {
        let Some(registration) = self.io.get_mut(event.token) else {
            return;
        };

        if event.readable {
            fired.extend(registration.reader.take().map(|promise| (promise, Ok(()))));
        }

        if event.writable {
            fired.extend(registration.writer.take().map(|promise| (promise, Ok(()))));
        }

        if let Err(err) = self.rearm(event.token) {
            for promise in self.release(event.token) {
                let failure = io::Error::new(err.kind(), err.to_string());
                fired.push((promise, Err(failure.into())));
            }
        }
    }

    /// Brings the poller in line with the waiters of `token`.
    ///
    /// A registration without waiters is removed altogether.
    fn rearm(&mut self, token: usize) -> io::Result<()> {
        let Some(registration) = self.io.get_mut(token) else {
            return Ok(());
        };

        let wanted = registration.wanted();
        let armed = registration.armed;
        let fd = registration.fd;

        if wanted == armed {
            return Ok(());
        }

        if wanted.is_empty() {
            self.release(token);
            return Ok(());
        }

        if armed.is_empty() {
            self.poller.register(fd, token, wanted)?;
        } else {
            self.poller.reregister(fd, token, wanted)?;
        }

        registration.armed = wanted;
        Ok(())
    }

    /// Deregisters `token` and returns its remaining waiters.
    fn release(&mut self, token: usize) -> Vec<Promise<()>> {
        let Some(mut registration) = self.io.remove(token) else {
            return Vec::new();
        };

        self.tokens.remove(&registration.fd);

        if !registration.armed.is_empty() {
            self.poller.deregister(registration.fd);
        }

        tracing::trace!(fd = registration.fd, token, "registration released");

        registration.take_waiters().collect()
    }
}
