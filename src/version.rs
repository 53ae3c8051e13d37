//! cabind version information.
//!
//! The generated header and the CLI `--version` output both read this constant.

/// The cabind version string (for example, `0.1.0`).
pub const CABIND_VERSION: &str = env!("CARGO_PKG_VERSION");
