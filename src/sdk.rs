//! Rust call surface
//!
//! Thin forwarding layer over the hook bound by [`init`]. Everything except
//! the lifecycle queries and console output fails with
//! [`SdkError::NotInitialized`] until a hook is bound.

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

use crate::error::{Result, SdkError};
use crate::game::{Hook, HookFactory};
use crate::gate;
use crate::unreal::offsets::OffsetList;
use crate::unreal::structs::{FFrame, FLazyObjectPtr, FName, FSoftObjectPtr, FText, NameStr};
use crate::unreal::{ActiveGObjects, UClass, UFunction, UObject};

#[cfg(feature = "alloc-tracking")]
static ALLOCATIONS: once_cell::sync::Lazy<dashmap::DashSet<usize>> =
    once_cell::sync::Lazy::new(dashmap::DashSet::new);

#[inline]
fn hook() -> Result<&'static dyn Hook> {
    gate::global().hook()
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Bind the process to the hook `factory` produces
///
/// Returns `Ok(false)` if a hook was already bound.
pub fn init(factory: &dyn HookFactory) -> Result<bool> {
    gate::global().init(factory)
}

pub fn is_initialized() -> bool {
    gate::global().is_initialized()
}

pub fn is_console_ready() -> bool {
    gate::global().is_console_ready()
}

// ============================================================================
// Registry and offsets
// ============================================================================

pub fn gobjects() -> Result<&'static ActiveGObjects> {
    Ok(hook()?.gobjects())
}

pub fn get_offsets() -> Result<&'static OffsetList> {
    Ok(hook()?.offsets())
}

// ============================================================================
// Host allocator
// ============================================================================

pub fn u_malloc(len: usize) -> Result<*mut c_void> {
    let ptr = hook()?.u_malloc(len);
    #[cfg(feature = "alloc-tracking")]
    if !ptr.is_null() {
        ALLOCATIONS.insert(ptr as usize);
    }
    Ok(ptr)
}

pub fn u_realloc(original: *mut c_void, len: usize) -> Result<*mut c_void> {
    let ptr = hook()?.u_realloc(original, len);
    #[cfg(feature = "alloc-tracking")]
    {
        ALLOCATIONS.remove(&(original as usize));
        if !ptr.is_null() {
            ALLOCATIONS.insert(ptr as usize);
        }
    }
    Ok(ptr)
}

pub fn u_free(data: *mut c_void) -> Result<()> {
    let hook = hook()?;
    #[cfg(feature = "alloc-tracking")]
    ALLOCATIONS.remove(&(data as usize));
    hook.u_free(data);
    Ok(())
}

/// Number of host allocations made through the SDK and not yet freed
#[cfg(feature = "alloc-tracking")]
pub fn tracked_allocations() -> usize {
    ALLOCATIONS.len()
}

// ============================================================================
// Objects
// ============================================================================

/// Construct an object through the host
///
/// A missing name lets the host pick one.
pub fn construct_object(
    cls: *mut UClass,
    outer: *mut UObject,
    name: Option<FName>,
    flags: u64,
    template_obj: *mut UObject,
) -> Result<*mut UObject> {
    Ok(hook()?.construct_object(cls, outer, name.unwrap_or(FName::NONE), flags, template_obj))
}

pub fn find_object(cls: *mut UClass, name: &[u16]) -> Result<Option<NonNull<UObject>>> {
    Ok(NonNull::new(hook()?.find_object(cls, name)))
}

pub fn load_package(name: &[u16], flags: u32) -> Result<Option<NonNull<UObject>>> {
    Ok(NonNull::new(hook()?.load_package(name, flags)))
}

// ============================================================================
// Names
// ============================================================================

pub fn fname_init(name: &mut FName, value: &[u16], number: i32) -> Result<()> {
    hook()?.fname_init(name, value, number);
    Ok(())
}

pub fn fname_get_str(name: FName) -> Result<NameStr<'static>> {
    Ok(hook()?.fname_get_str(name))
}

// ============================================================================
// Dispatch
// ============================================================================

pub fn fframe_step(frame: *mut FFrame, obj: *mut UObject, param: *mut c_void) -> Result<()> {
    hook()?.fframe_step(frame, obj, param);
    Ok(())
}

pub fn process_event(object: *mut UObject, func: *mut UFunction, params: *mut c_void) -> Result<()> {
    hook()?.process_event(object, func, params);
    Ok(())
}

// ============================================================================
// Text and pointers
// ============================================================================

/// Print to the host console; does nothing before init
pub fn uconsole_output_text(text: &[u16]) {
    gate::global().uconsole_output_text(text);
}

/// Path name of `obj`, copied into a host-allocated buffer
pub fn uobject_path_name(obj: *const UObject) -> Result<HostWideString> {
    let name = hook()?.uobject_path_name(obj);
    let bytes = (name.len() + 1) * std::mem::size_of::<u16>();

    let raw = u_malloc(bytes)?.cast::<u16>();
    let ptr = NonNull::new(raw).ok_or(SdkError::AllocationFailed { size: bytes })?;
    // SAFETY: fresh allocation of len + 1 units
    unsafe {
        std::ptr::copy_nonoverlapping(name.as_ptr(), ptr.as_ptr(), name.len());
        ptr.as_ptr().add(name.len()).write(0);
    }

    Ok(HostWideString {
        ptr,
        len: name.len(),
    })
}

pub fn ftext_as_culture_invariant(text: *mut FText, value: &[u16]) -> Result<()> {
    hook()?.ftext_as_culture_invariant(text, value);
    Ok(())
}

pub fn fsoftobjectptr_assign(ptr: *mut FSoftObjectPtr, obj: *const UObject) -> Result<()> {
    hook()?.fsoftobjectptr_assign(ptr, obj);
    Ok(())
}

pub fn flazyobjectptr_assign(ptr: *mut FLazyObjectPtr, obj: *const UObject) -> Result<()> {
    hook()?.flazyobjectptr_assign(ptr, obj);
    Ok(())
}

/// NUL-terminated wide string living in host memory
///
/// Freed through the host allocator on drop, unless handed off with
/// [`HostWideString::into_raw`].
pub struct HostWideString {
    ptr: NonNull<u16>,
    len: usize,
}

impl HostWideString {
    /// Length in code units, excluding the terminator
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u16] {
        // SAFETY: `len` units were written at construction
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Release ownership; the caller must pass the pointer to [`u_free`]
    pub fn into_raw(self) -> *mut u16 {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }
}

impl fmt::Display for HostWideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf16_lossy(self.as_slice()))
    }
}

impl fmt::Debug for HostWideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostWideString").field(&self.to_string()).finish()
    }
}

impl Drop for HostWideString {
    fn drop(&mut self) {
        if let Err(e) = u_free(self.ptr.as_ptr().cast()) {
            tracing::warn!(error = %e, "leaking host string");
        }
    }
}

// SAFETY: plain host heap memory, not tied to the allocating thread
unsafe impl Send for HostWideString {}
