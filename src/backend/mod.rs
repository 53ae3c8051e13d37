//! cabind backend
//!
//! This module turns a [`ModuleDescriptor`](crate::descriptor::ModuleDescriptor) into the Rust source of a C-ABI
//! binding stub.
//!
//! The pipeline is:
//! 1. `driver` walks the declarations in lexical order
//! 2. `emit` builds one token block per function or struct (consulting `classify` and `naming`)
//! 3. each block is validated with `syn`, formatted with `prettyplease`, and appended to the output
//! 4. the preamble and trailer wrap the whole artifact
//!
//! ## Module Organization
//!
//! - `classify.rs` - By-value vs. opaque-handle decision per type
//! - `naming.rs` - Export symbol names and the emission-time uniqueness check
//! - `emit/` - Token emission
//!   - `functions.rs` - Function wrappers
//!   - `structs.rs` - Handle types, getters, constructors
//!   - `preamble.rs` - Header, string bridge, trailer
//! - `diagnostics.rs` - Unsupported-item reports collected during a run
//! - `driver.rs` - `BindingGenerator`, the entry point
//! - `config.rs` - Generator options

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod emit;
pub mod naming;

pub use classify::{Classification, ClassifyError, TypeClassifier, needs_wrap};
pub use config::{Edition, GeneratorConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, GenerationErrors};
pub use driver::{BindingGenerator, GenerateError, Generated};
pub use emit::{BindingEmitter, EmitError};
pub use naming::SymbolTable;
