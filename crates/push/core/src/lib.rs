//! Push Gateway Core Types
//!
//! Device records and platform variants shared across the push gateway.

mod device;

pub use device::*;
