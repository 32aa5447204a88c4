//! # Keel
//!
//! **Keel** is a single-threaded cooperative runtime built around
//! single-use futures and promises.
//!
//! A [`Promise`] resolves its [`Future`] exactly once; the future is consumed
//! exactly once, either with [`Future::get`] or by chaining a continuation.
//! Continuations never run inline: they are queued on the scheduler and run
//! to completion one after another, so a program reads like a chain of
//! small steps with failures flowing along the chain until handled.
//!
//! Keel offers:
//!
//! - **Continuation combinators**: `then`, `map`, `then_wrapped`,
//!   `handle_exception`, `finally`, `discard_result`, [`when_all`]
//! - **Fibers**: `async` bodies spawned with [`Handle::spawn`] that `.await`
//!   keel futures directly
//! - **Cooperative yield points**: [`maybe_yield`] suspends a long loop once
//!   its slice has used up the task quota
//! - **Non-blocking TCP** and **timers** driven by an epoll reactor
//! - **A TCP echo server** ([`echo`]) built purely on the above
//! - **Ergonomic macros** like `#[keel::test]` and `when_all!`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keel::RuntimeBuilder;
//!
//! let runtime = RuntimeBuilder::new().build()?;
//!
//! let answer = runtime.run(|handle| {
//!     handle
//!         .ready(20)
//!         .then(|v| Ok(v + 1))
//!         .map(|v| v * 2)
//! })?;
//!
//! assert_eq!(answer, 42);
//! ```
//!
//! ## Modules
//!
//! - [`future`]: Futures, promises and combinators
//! - [`runtime`]: Scheduler, handles and yield points
//! - [`net`]: Non-blocking TCP listener and stream
//! - [`time`]: Sleep and timeout
//! - [`echo`]: The echo service

mod reactor;
mod utils;

pub mod echo;
pub mod error;
pub mod future;
pub mod net;
pub mod runtime;
pub mod time;

pub use error::{Error, Result};
pub use future::{Future, Futurize, Promise, make_pair, when_all, when_both};
pub use runtime::{Handle, Runtime, RuntimeBuilder, maybe_yield, without_yield_check, yield_now};

pub use keel_macros::{test, when_all};
