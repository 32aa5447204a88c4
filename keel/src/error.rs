//! Error type shared by futures, the scheduler and the I/O layer.
//!
//! Errors fall into three families:
//! - misuse of the future/promise contract (`AlreadyResolved`, `AlreadyConsumed`,
//!   `NotReady`, `BrokenPromise`, `Stalled`),
//! - I/O failures reported by the reactor or the socket layer,
//! - application failures raised by continuation logic.

use std::fmt;
use std::io;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The failure stored in a failed [`Future`](crate::future::Future).
#[derive(Debug, Error)]
pub enum Error {
    /// A promise was resolved a second time.
    #[error("promise already resolved")]
    AlreadyResolved,

    /// The outcome of a future was read a second time.
    #[error("future already consumed")]
    AlreadyConsumed,

    /// `get` was called before the future reached a terminal state.
    #[error("future is not ready")]
    NotReady,

    /// The promise was dropped without being resolved.
    #[error("broken promise")]
    BrokenPromise,

    /// The scheduler ran out of work before the entry computation completed.
    #[error("scheduler stalled: no runnable work and nothing pending")]
    Stalled,

    /// A deadline elapsed before the guarded future completed.
    #[error("operation timed out")]
    TimedOut,

    /// An I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A failure raised by application logic.
    #[error("{0}")]
    Failed(Box<dyn std::error::Error + 'static>),
}

impl Error {
    /// Builds an application failure from a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Error::Failed(message.to_string().into())
    }

    /// Wraps an arbitrary error as an application failure.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        Error::Failed(Box::new(error))
    }

    /// Returns `true` for errors that signal misuse of the future/promise contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::AlreadyResolved
                | Error::AlreadyConsumed
                | Error::NotReady
                | Error::BrokenPromise
                | Error::Stalled
        )
    }

    /// Returns the underlying I/O error kind, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Io(err) => Some(err.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_displays_message() {
        let err = Error::msg("sanity check failed");
        assert_eq!(err.to_string(), "sanity check failed");
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: Error = io::Error::new(io::ErrorKind::ConnectionReset, "reset").into();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn test_contract_violations() {
        assert!(Error::AlreadyResolved.is_contract_violation());
        assert!(Error::AlreadyConsumed.is_contract_violation());
        assert!(Error::NotReady.is_contract_violation());
        assert!(Error::BrokenPromise.is_contract_violation());
        assert!(!Error::TimedOut.is_contract_violation());
    }
}
