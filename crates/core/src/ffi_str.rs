//! Shared helper for copying a borrowed C string out of a boundary struct.
//!
//! Every raw struct the host hands across the FFI edge (`PlayerInfoRaw`,
//! schema string values, ...) carries `*const c_char` fields that are only
//! valid for the duration of the call that produced them. Every call site
//! that reads one must copy it into an owned `String` immediately rather
//! than storing the pointer.

use std::ffi::CStr;
use std::os::raw::c_char;

/// Copy a possibly-null, possibly non-UTF-8 C string into an owned
/// `String`. Null pointers and invalid UTF-8 both map to an empty
/// string, the boundary's marshalling rule for every string field
/// unless explicitly documented otherwise.
///
/// # Safety
/// `ptr` must either be null or point at a NUL-terminated string valid for
/// the duration of this call.
pub unsafe fn copy_c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_pointer_is_empty_string() {
        assert_eq!(unsafe { copy_c_string(std::ptr::null()) }, "");
    }

    #[test]
    fn valid_pointer_round_trips() {
        let c = std::ffi::CString::new("hello").unwrap();
        assert_eq!(unsafe { copy_c_string(c.as_ptr()) }, "hello");
    }
}
