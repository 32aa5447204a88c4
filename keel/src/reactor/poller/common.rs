use super::platform::sys_close;

use std::os::fd::RawFd;

/// Readiness a registration is interested in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Interest {
    pub(crate) read: bool,
    pub(crate) write: bool,
}

impl Interest {
    pub(crate) const NONE: Interest = Interest {
        read: false,
        write: false,
    };

    pub(crate) fn is_empty(self) -> bool {
        !self.read && !self.write
    }
}

/// Interrupts a blocking poll from any thread.
///
/// `notify` is written to wake the poller; `drain` is the descriptor the
/// poller watches and empties. With an eventfd both are the same descriptor;
/// with a pipe they are its two ends. Both are closed on drop.
pub(crate) struct Waker {
    pub(crate) notify: RawFd,
    pub(crate) drain: RawFd,
}

impl Waker {
    /// Wakes the poller.
    pub(crate) fn wake(&self) {
        let buf: u64 = 1;
        // A full eventfd counter or pipe already guarantees a wake-up.
        unsafe {
            libc::write(self.notify, &buf as *const u64 as *const _, 8);
        }
    }

    /// Consumes pending wake-ups.
    pub(crate) fn reset(&self) {
        let mut buf = [0u8; 64];
        loop {
            let n = unsafe { libc::read(self.drain, buf.as_mut_ptr() as *mut _, buf.len()) };
            if n <= 0 || (n as usize) < buf.len() {
                break;
            }
        }
    }
}

impl Drop for Waker {
    fn drop(&mut self) {
        sys_close(self.drain);

        if self.notify != self.drain {
            sys_close(self.notify);
        }
    }
}
