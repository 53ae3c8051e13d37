#![forbid(unsafe_code)]
//! cabind: C-ABI binding stub generator
//!
//! Given the public surface of a Rust module (a [`ModuleDescriptor`]), cabind emits the Rust source of a stub
//! that re-exports it through `extern "C"` functions with stable, positional names. Scalars cross the boundary by
//! value; structs cross it as opaque handles into the `cabind_runtime` registry.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Generated code**: wrappers call `cabind_runtime::raise` on a bad handle or string. That is a panic inside an
//!   `extern "C"` function, which aborts the process.

pub mod backend;
pub mod cli;
pub mod descriptor;
pub mod version;

pub use backend::{BindingGenerator, Diagnostic, DiagnosticKind, GenerateError, Generated, GeneratorConfig};
pub use descriptor::ModuleDescriptor;
