//! Consistent hash ring implementation.
//!
//! The ring is a probabilistic skip list keyed by 32-bit Ketama hash
//! positions, not a sorted map — lookups, inserts and deletes all walk the
//! skip list's levels the way a classic ordered skip list does.

pub mod ring;

pub use ring::{Ring, MAX_LEVEL};
