//! TCP networking implementation.
//!
//! It is split into:
//! - [`listener`]: binding and accepting incoming TCP connections,
//! - [`stream`]: connected streams and their split halves,
//! - `socket`: the descriptor ownership shared by both.

mod socket;

pub mod listener;
pub mod stream;
