use super::poller::common::Interest;
use crate::future::Promise;

use std::os::fd::RawFd;

/// Which readiness a wait is interested in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Read,
    Write,
}

/// Readiness waits registered for one file descriptor.
///
/// At most one reader and one writer may wait at a time; each is resolved
/// once and then forgotten.
pub(crate) struct Registration {
    pub(crate) fd: RawFd,
    pub(crate) reader: Option<Promise<()>>,
    pub(crate) writer: Option<Promise<()>>,

    /// Interest currently installed in the poller.
    pub(crate) armed: Interest,
}

impl Registration {
    pub(crate) fn new(fd: RawFd) -> Self {
        Self {
            fd,
            reader: None,
            writer: None,
            armed: Interest::NONE,
        }
    }

    pub(crate) fn slot(&mut self, direction: Direction) -> &mut Option<Promise<()>> {
        match direction {
            Direction::Read => &mut self.reader,
            Direction::Write => &mut self.writer,
        }
    }

    /// The interest the poller should watch for the current waiters.
    pub(crate) fn wanted(&self) -> Interest {
        Interest {
            read: self.reader.is_some(),
            write: self.writer.is_some(),
        }
    }

    /// Removes every waiter.
    pub(crate) fn take_waiters(&mut self) -> impl Iterator<Item = Promise<()>> {
        self.reader.take().into_iter().chain(self.writer.take())
    }
}
