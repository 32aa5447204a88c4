//! Platform-specific I/O poller abstraction.
//!
//! This module provides a unified interface over the OS readiness APIs used
//! by the reactor:
//! - `epoll` on Linux,
//! - `poll(2)` on other unix targets.
//!
//! Both backends expose the same interface: register, reregister and
//! deregister descriptors by token, block for readiness with an optional
//! timeout, and be interrupted from any thread through a [`Waker`].

pub(crate) mod common;

pub(crate) use common::Waker;

#[cfg(target_os = "linux")]
mod epoll;

#[cfg(all(unix, not(target_os = "linux")))]
mod poll;

#[cfg(target_os = "linux")]
pub(crate) type Poller = epoll::EpollPoller;

#[cfg(all(unix, not(target_os = "linux")))]
pub(crate) type Poller = poll::PollPoller;

#[cfg(unix)]
pub(crate) mod unix;

#[cfg(unix)]
pub(crate) use unix as platform;

use std::time::Duration;

/// Converts a poll timeout to milliseconds, rounding up so a pending timer
/// never turns into a busy loop.
pub(crate) fn timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        None => -1,
        Some(timeout) => {
            let millis = timeout.as_nanos().div_ceil(1_000_000);
            millis.min(i32::MAX as u128) as i32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_rounds_up() {
        assert_eq!(timeout_ms(None), -1);
        assert_eq!(timeout_ms(Some(Duration::ZERO)), 0);
        assert_eq!(timeout_ms(Some(Duration::from_micros(1))), 1);
        assert_eq!(timeout_ms(Some(Duration::from_millis(5))), 5);
        assert_eq!(timeout_ms(Some(Duration::from_secs(u64::MAX))), i32::MAX);
    }
}
