//! C call surface
//!
//! Every export forwards to [`crate::sdk`]. Errors never cross the
//! boundary: they are logged and mapped to null, `false` or nothing.
//! Wide strings are passed as pointer + length unless noted otherwise.

use std::ffi::c_void;
use std::ptr::{null, null_mut};

use tracing::{error, trace};

use crate::error::Result;
use crate::sdk;
use crate::unreal::offsets::OffsetList;
use crate::unreal::structs::{FFrame, FLazyObjectPtr, FName, FSoftObjectPtr, FText, FWeakObjectPtr, NameStr};
use crate::unreal::{ActiveGObjects, UClass, UFunction, UObject};
use crate::version;

/// Log `result`'s error under `function` and fall back to `default`
fn report<T>(function: &'static str, result: Result<T>, default: T) -> T {
    result.unwrap_or_else(|e| {
        error!(function, error = %e, "unrealsdk call failed");
        default
    })
}

/// # Safety
/// `ptr` must be null or valid for `len` units.
unsafe fn wide<'a>(ptr: *const u16, len: usize) -> &'a [u16] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

/// # Safety
/// `ptr` must be null or NUL-terminated.
unsafe fn wide_nul<'a>(ptr: *const u16) -> &'a [u16] {
    if ptr.is_null() {
        return &[];
    }
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    std::slice::from_raw_parts(ptr, len)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[no_mangle]
pub extern "C" fn unrealsdk_is_initialized() -> bool {
    sdk::is_initialized()
}

#[no_mangle]
pub extern "C" fn unrealsdk_is_console_ready() -> bool {
    sdk::is_console_ready()
}

/// Packed as `major << 16 | minor << 8 | patch`
#[no_mangle]
pub extern "C" fn unrealsdk_get_version() -> u32 {
    version::VERSION_PACKED
}

// ============================================================================
// Registry
// ============================================================================

#[no_mangle]
pub extern "C" fn unrealsdk_gobjects() -> *const ActiveGObjects {
    report("gobjects", sdk::gobjects().map(|g| g as *const _), null())
}

#[no_mangle]
pub extern "C" fn unrealsdk_gobjects_size() -> usize {
    report("gobjects_size", sdk::gobjects().map(|g| g.size()), 0)
}

/// Null for empty slots, and for out-of-range indices (which are logged)
#[no_mangle]
pub extern "C" fn unrealsdk_gobjects_obj_at(idx: usize) -> *mut UObject {
    let obj = sdk::gobjects().and_then(|g| g.at(idx));
    report("gobjects_obj_at", obj, None).map_or(null_mut(), |obj| obj.as_ptr())
}

/// # Safety
/// `ptr` must be null or point to a readable weak pointer.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_gobjects_get_weak_object(ptr: *const FWeakObjectPtr) -> *mut UObject {
    let Some(weak) = ptr.as_ref() else {
        return null_mut();
    };
    let obj = sdk::gobjects().and_then(|g| g.get_weak_object(weak));
    report("gobjects_get_weak_object", obj, None).map_or(null_mut(), |obj| obj.as_ptr())
}

/// # Safety
/// `ptr` must be null or point to a writable weak pointer; `obj` must be
/// null or a live object.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_gobjects_set_weak_object(
    ptr: *mut FWeakObjectPtr,
    obj: *const UObject,
) -> bool {
    let Some(weak) = ptr.as_mut() else {
        return false;
    };
    let result = sdk::gobjects().and_then(|g| g.set_weak_object(weak, obj.as_ref()));
    report("gobjects_set_weak_object", result.map(|()| true), false)
}

#[no_mangle]
pub extern "C" fn unrealsdk_get_offsets() -> *const OffsetList {
    report("get_offsets", sdk::get_offsets().map(|o| o as *const _), null())
}

// ============================================================================
// Host allocator
// ============================================================================

#[no_mangle]
pub extern "C" fn unrealsdk_u_malloc(len: usize) -> *mut c_void {
    trace!(len, "u_malloc");
    report("u_malloc", sdk::u_malloc(len), null_mut())
}

#[no_mangle]
pub extern "C" fn unrealsdk_u_realloc(original: *mut c_void, len: usize) -> *mut c_void {
    report("u_realloc", sdk::u_realloc(original, len), null_mut())
}

#[no_mangle]
pub extern "C" fn unrealsdk_u_free(data: *mut c_void) {
    if data.is_null() {
        return;
    }
    report("u_free", sdk::u_free(data), ());
}

// ============================================================================
// Objects
// ============================================================================

/// A null `name` lets the host pick one
///
/// # Safety
/// `name` must be null or point to a readable name.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_construct_object(
    cls: *mut UClass,
    outer: *mut UObject,
    name: *const FName,
    flags: u64,
    template_obj: *mut UObject,
) -> *mut UObject {
    let name = name.as_ref().copied();
    report(
        "construct_object",
        sdk::construct_object(cls, outer, name, flags, template_obj),
        null_mut(),
    )
}

/// # Safety
/// `name` must be valid for `name_size` units.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_find_object(
    cls: *mut UClass,
    name: *const u16,
    name_size: usize,
) -> *mut UObject {
    let obj = sdk::find_object(cls, wide(name, name_size));
    report("find_object", obj, None).map_or(null_mut(), |obj| obj.as_ptr())
}

/// # Safety
/// `name` must be valid for `size` units.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_load_package(name: *const u16, size: usize, flags: u32) -> *mut UObject {
    let obj = sdk::load_package(wide(name, size), flags);
    report("load_package", obj, None).map_or(null_mut(), |obj| obj.as_ptr())
}

// ============================================================================
// Names
// ============================================================================

/// `value` is NUL-terminated
///
/// # Safety
/// `name` must be null or writable; `value` must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_fname_init(name: *mut FName, value: *const u16, number: i32) {
    let Some(name) = name.as_mut() else {
        return;
    };
    report("fname_init", sdk::fname_init(name, wide_nul(value), number), ());
}

/// Writes the entry's storage, its length in units, and whether it is wide
///
/// # Safety
/// All out-pointers must be writable.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_fname_get_str(
    name: FName,
    str_out: *mut *const c_void,
    size_out: *mut usize,
    is_wide_out: *mut bool,
) {
    if str_out.is_null() || size_out.is_null() || is_wide_out.is_null() {
        return;
    }
    let entry = report("fname_get_str", sdk::fname_get_str(name), NameStr::Narrow(&[]));
    str_out.write(entry.as_ptr().cast());
    size_out.write(entry.len());
    is_wide_out.write(entry.is_wide());
}

// ============================================================================
// Dispatch
// ============================================================================

#[no_mangle]
pub extern "C" fn unrealsdk_fframe_step(frame: *mut FFrame, obj: *mut UObject, param: *mut c_void) {
    report("fframe_step", sdk::fframe_step(frame, obj, param), ());
}

#[no_mangle]
pub extern "C" fn unrealsdk_process_event(object: *mut UObject, func: *mut UFunction, params: *mut c_void) {
    report("process_event", sdk::process_event(object, func, params), ());
}

// ============================================================================
// Text and pointers
// ============================================================================

/// # Safety
/// `text` must be valid for `size` units.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_uconsole_output_text(text: *const u16, size: usize) {
    sdk::uconsole_output_text(wide(text, size));
}

/// Host-allocated, NUL-terminated; free with `unrealsdk_u_free`
///
/// # Safety
/// `size_out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_uobject_path_name(obj: *const UObject, size_out: *mut usize) -> *mut u16 {
    match sdk::uobject_path_name(obj) {
        Ok(name) => {
            if !size_out.is_null() {
                size_out.write(name.len());
            }
            name.into_raw()
        }
        Err(e) => report("uobject_path_name", Err(e), null_mut()),
    }
}

/// # Safety
/// `value` must be valid for `size` units.
#[no_mangle]
pub unsafe extern "C" fn unrealsdk_ftext_as_culture_invariant(text: *mut FText, value: *const u16, size: usize) {
    report(
        "ftext_as_culture_invariant",
        sdk::ftext_as_culture_invariant(text, wide(value, size)),
        (),
    );
}

#[no_mangle]
pub extern "C" fn unrealsdk_fsoftobjectptr_assign(ptr: *mut FSoftObjectPtr, obj: *const UObject) {
    report("fsoftobjectptr_assign", sdk::fsoftobjectptr_assign(ptr, obj), ());
}

#[no_mangle]
pub extern "C" fn unrealsdk_flazyobjectptr_assign(ptr: *mut FLazyObjectPtr, obj: *const UObject) {
    report("flazyobjectptr_assign", sdk::flazyobjectptr_assign(ptr, obj), ());
}
