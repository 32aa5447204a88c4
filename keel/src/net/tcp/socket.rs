use crate::reactor::poller::platform::sys_close;
use crate::runtime::Handle;

use std::io;
use std::os::fd::RawFd;

/// An owned non-blocking socket bound to a scheduler.
///
/// Shared through `Rc` by a stream's halves and by the continuations of
/// in-flight operations; the descriptor is closed when the last one goes.
pub(crate) struct Socket {
    pub(crate) fd: RawFd,
    pub(crate) handle: Handle,
}

impl Socket {
    pub(crate) fn new(fd: RawFd, handle: &Handle) -> Self {
        Self {
            fd,
            handle: handle.clone(),
        }
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        self.handle.abort_io(self.fd, io::ErrorKind::NotConnected);
        sys_close(self.fd);
    }
}
