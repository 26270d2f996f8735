//! HTTPS server bootstrap with port hunting.
//!
//! The bootstrap is split in two:
//! - `server`: TLS listener construction and serve wiring
//! - `hunt`: the bind retry loop, probing upward from the preferred port
//!   until a bind succeeds or the configured ceiling is exhausted

mod hunt;
mod server;

pub use server::{HttpsServer, ServerError, ServerHandle};
