//! Error types surfaced by the handle registry and the string bridge.

use core::fmt::Display;
use std::str::Utf8Error;

use thiserror::Error;

use crate::handles::Handle;

/// A handle could not be resolved to a live record of the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("null handle")]
    Null,

    #[error("unknown handle {0}")]
    Unknown(Handle),

    #[error("stale handle {0}: the record was released")]
    Stale(Handle),

    #[error("handle {handle} holds `{found}`, expected `{expected}`")]
    TypeMismatch {
        handle: Handle,
        expected: &'static str,
        found: &'static str,
    },
}

/// A string could not cross the ABI boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("null string pointer")]
    NullPointer,

    #[error("foreign string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    #[error("host string has an interior NUL byte at offset {position}")]
    InteriorNul { position: usize },

    #[error(transparent)]
    Handle(#[from] HandleError),
}

/// Raise a runtime error from inside a generated wrapper.
///
/// Wrappers are `extern "C"` functions, so the panic cannot unwind into the foreign caller; the process aborts
/// after printing the message.
#[cold]
#[track_caller]
pub fn raise(err: impl Display) -> ! {
    panic!("cabind: {err}");
}
