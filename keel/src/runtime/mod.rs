//! Core runtime components.
//!
//! This module contains the single-threaded cooperative scheduler that every
//! future, fiber and I/O wait in the crate runs on.
//!
//! It is responsible for:
//! - running queued continuations and fiber polls in FIFO order,
//! - turning the reactor when the run queue is empty or periodically while busy,
//! - enforcing the task quota checked by [`maybe_yield`],
//! - exposing the scheduler through [`Handle`] and the [`Runtime`] entry points.
//!
//! One [`Runtime`] owns one scheduler; several runtimes may live on different
//! threads but never share state.

mod core;
mod handle;
mod injector;
mod scheduler;
mod task;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod yield_now;

pub use builder::RuntimeBuilder;
pub use core::Runtime;
pub use handle::Handle;
pub use yield_now::{WithoutYieldCheck, maybe_yield, without_yield_check, yield_now};
