//! Reactor: timers and I/O readiness.
//!
//! The reactor is owned by the scheduler and turned on the scheduler's
//! thread. It is responsible for:
//! - keeping a min-heap of timer deadlines,
//! - registering one-shot read/write readiness waits with the OS poller,
//! - handing back the promises whose timer or readiness fired.
//!
//! Resolving those promises is the only way work enters the run queue from
//! outside the program's own continuations.

mod core;
mod event;
mod io;
mod timer;

pub(crate) mod poller;

pub(crate) use core::Reactor;
pub(crate) use io::Direction;
