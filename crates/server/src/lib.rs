//! Storage server: the RPC handler and dispatch loop that sit behind each
//! node the client coordinator talks to.

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod store;

pub use dispatcher::serve;
pub use error::ServerError;
pub use handler::Handler;
pub use store::{LocalStore, SledStore};
