//! Error types for descriptor → Rust emission.
//!
//! These are whole-run failures. Problems with a single declaration are not errors here; they are reported as
//! [`Diagnostic`](crate::backend::Diagnostic)s and the run continues.

use thiserror::Error;

/// Error during emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// Generated tokens did not parse back as Rust. Always a generator bug.
    #[error("syn parse error: {0}")]
    SynParse(String),

    #[error("module name `{0}` cannot be used as a Rust identifier")]
    InvalidModuleName(String),

    #[error("`{0}` is not a valid Rust path")]
    InvalidPath(String),
}
