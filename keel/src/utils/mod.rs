//! Internal data structures.
//!
//! Exposes the [`Slab`] used to index fibers and reactor registrations.

mod slab;

pub(crate) use slab::Slab;
