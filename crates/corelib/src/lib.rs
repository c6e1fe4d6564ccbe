//! Core library for the consistent hash ring.
//!
//! This crate provides the fundamental abstractions shared by the client
//! coordinator and the storage server:
//! - MD5-Ketama placement (`hash`)
//! - physical node descriptors (`node`)
//! - the skip-list ring index itself (`ring`)

pub mod error;
pub mod hash;
pub mod node;
pub mod ring;

pub use error::{Error, Result};
pub use node::{NodeId, PhysicalNode};
pub use ring::Ring;
