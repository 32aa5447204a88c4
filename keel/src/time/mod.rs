//! Timer utilities.
//!
//! This module provides time-related futures backed by the reactor's timer
//! heap:
//! - [`sleep`] resolves after a duration,
//! - [`timeout`] bounds how long another future may take.

mod sleep;
mod timeout;

#[doc(inline)]
pub use sleep::sleep;

#[doc(inline)]
pub use timeout::timeout;
