//! Bridge between host `String`s and foreign NUL-terminated strings.
//!
//! Host strings live in the handle registry like any other record, so a foreign caller holds a [`Handle`] to a
//! `String`. Converting back produces a freshly allocated C string that the caller must hand to [`free_c`]
//! (exported by generated stubs as `Wrapper_FreeCString`).

use std::ffi::{CStr, CString, c_char};

use crate::errors::BridgeError;
use crate::handles::{self, Handle};

/// Copy a foreign string into a host `String` and register it.
///
/// ## Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid for reads for the duration of the call.
///
/// ## Errors
///
/// - [`BridgeError::NullPointer`] for a null `ptr`.
/// - [`BridgeError::InvalidUtf8`] when the bytes are not UTF-8.
pub unsafe fn from_c(ptr: *const c_char) -> Result<Handle, BridgeError> {
    if ptr.is_null() {
        return Err(BridgeError::NullPointer);
    }
    // SAFETY: non-null, and the caller guarantees NUL termination and validity.
    let text = unsafe { CStr::from_ptr(ptr) }.to_str()?;
    Ok(handles::insert(text.to_owned()))
}

/// Allocate a foreign copy of the host `String` behind `handle`.
///
/// The handle stays valid. The returned pointer is owned by the caller.
pub fn to_c(handle: Handle) -> Result<*mut c_char, BridgeError> {
    let text = handles::cloned::<String>(handle)?;
    let owned = CString::new(text).map_err(|err| BridgeError::InteriorNul {
        position: err.nul_position(),
    })?;
    Ok(owned.into_raw())
}

/// Free a string previously returned by [`to_c`]. Null is ignored.
///
/// ## Safety
///
/// `ptr` must be null or a pointer obtained from [`to_c`] that has not been freed yet.
pub unsafe fn free_c(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: the caller guarantees `ptr` came from `CString::into_raw` in `to_c`.
    drop(unsafe { CString::from_raw(ptr) });
}

/// Register a host string directly (host-side counterpart of [`from_c`]).
pub fn register(text: impl Into<String>) -> Handle {
    handles::insert(text.into())
}
