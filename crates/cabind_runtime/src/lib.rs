//! Runtime support for cabind-generated binding stubs.
//!
//! Generated wrappers never hand raw pointers to host records across the ABI. Every record that crosses the
//! boundary is owned by the process-wide [`handles`] registry and addressed by an opaque [`Handle`]. Strings cross
//! the boundary through the [`strings`] bridge.
//!
//! ## Panic Policy
//!
//! - Lookups return `Result` with a [`HandleError`] / [`BridgeError`].
//! - Generated `extern "C"` wrappers turn those errors into a panic via [`raise`], which aborts the process at the
//!   ABI boundary with a readable message instead of reading foreign memory.

#![deny(clippy::unwrap_used)]

pub mod errors;
pub mod handles;
pub mod strings;

pub use errors::{BridgeError, HandleError, raise};
pub use handles::{Handle, HandleRegistry};
