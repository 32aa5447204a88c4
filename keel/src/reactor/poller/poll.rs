//! `poll(2)`-based poller for unix targets without epoll.
//!
//! Keeps its own registry of descriptors and rebuilds the `pollfd` array on
//! every call. A non-blocking pipe serves as the wake-up source.

use super::common::{Interest, Waker};
use super::platform::sys_set_nonblocking;
use super::timeout_ms;
use crate::reactor::event::Event;

use libc::{POLLERR, POLLHUP, POLLIN, POLLNVAL, POLLOUT, pollfd};
use std::collections::HashMap;
use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::time::Duration;

/// Poller based on `poll(2)`.
pub(crate) struct PollPoller {
    /// Registered descriptors: `fd → (token, interest)`.
    reg: HashMap<RawFd, (usize, Interest)>,

    /// Reusable buffer of poll descriptors; the waker is always first.
    fds: Vec<pollfd>,

    /// Upper bound on events reported per call.
    capacity: usize,

    /// Waker wrapping the internal pipe.
    waker: Arc<Waker>,
}

impl PollPoller {
    pub(crate) fn new(capacity: usize) -> io::Result<Self> {
        let mut ends = [0 as RawFd; 2];

        let rc = unsafe { libc::pipe(ends.as_mut_ptr()) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        let waker = Arc::new(Waker {
            notify: ends[1],
            drain: ends[0],
        });

        for fd in ends {
            sys_set_nonblocking(fd)?;
        }

        Ok(Self {
            reg: HashMap::new(),
            fds: Vec::new(),
            capacity,
            waker,
        })
    }

    pub(crate) fn waker(&self) -> Arc<Waker> {
        self.waker.clone()
    }

    pub(crate) fn register(&mut self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        if self.reg.insert(fd, (token, interest)).is_some() {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }

        Ok(())
    }

    pub(crate) fn reregister(&mut self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        match self.reg.get_mut(&fd) {
            Some(entry) => {
                *entry = (token, interest);
                Ok(())
            }
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    pub(crate) fn deregister(&mut self, fd: RawFd) {
        self.reg.remove(&fd);
    }

    pub(crate) fn poll(&mut self, events: &mut Vec<Event>, timeout: Option<Duration>) -> io::Result<()> {
        events.clear();

        self.fds.clear();
        self.fds.push(pollfd {
            fd: self.waker.drain,
            events: POLLIN,
            revents: 0,
        });

        for (&fd, &(_, interest)) in &self.reg {
            let mut flags = 0;
            if interest.read {
                flags |= POLLIN;
            }
            if interest.write {
                flags |= POLLOUT;
            }

            self.fds.push(pollfd {
                fd,
                events: flags,
                revents: 0,
            });
        }

        let n = unsafe {
            libc::poll(
                self.fds.as_mut_ptr(),
                self.fds.len() as libc::nfds_t,
                timeout_ms(timeout),
            )
        };

        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        if self.fds[0].revents != 0 {
            self.waker.reset();
        }

        for pfd in &self.fds[1..] {
            if pfd.revents == 0 || events.len() == self.capacity {
                continue;
            }

            let Some(&(token, _)) = self.reg.get(&pfd.fd) else {
                continue;
            };

            let failed = pfd.revents & (POLLERR | POLLHUP | POLLNVAL) != 0;

            events.push(Event {
                token,
                readable: failed || pfd.revents & POLLIN != 0,
                writable: failed || pfd.revents & POLLOUT != 0,
            });
        }

        Ok(())
    }
}
