//! GCM Dispatch Engine
//!
//! Chunked notification delivery through the GCM HTTP gateway and
//! reconciliation of per-recipient results into the device registry.

mod chunk;
mod config;
mod dispatch;
mod error;
mod reconcile;
mod service;
mod transport;
mod wire;

pub use chunk::*;
pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use reconcile::*;
pub use service::*;
pub use transport::*;
pub use wire::*;

#[cfg(test)]
pub(crate) mod test_support;
