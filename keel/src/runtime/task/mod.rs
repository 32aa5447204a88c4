//! Fiber primitives.
//!
//! A fiber is a boxed `async` body polled by the scheduler. This module holds
//! its state machine and the waker that routes wake-ups back to the run queue.

mod core;
mod state;
mod waker;

pub(crate) use core::{Fiber, Task};
pub(crate) use waker::make_waker;
