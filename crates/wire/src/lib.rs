//! Wire protocol and framed transport for the storage RPC.
//!
//! Requests and responses are bincode-encoded and sent over a
//! length-delimited frame (`tokio_util::codec::LengthDelimitedCodec`).
//! There's no attempt at cross-language interop here — the only peers
//! that ever speak this protocol are this crate's own client and server.

pub mod codec;
pub mod error;
pub mod protocol;

pub use codec::{dial, transport, Transport, DIAL_DEADLINE, FRAME_DEADLINE};
pub use error::Error;
pub use protocol::{Request, Response};
