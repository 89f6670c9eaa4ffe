//! Host dynamic arrays and strings

use std::ptr;

/// Host dynamic array header: data pointer, element count, capacity
///
/// The header is a non-owning view. Storage belongs to whoever allocated it
/// through the host allocator, so there is no `Drop` impl.
#[repr(C)]
pub struct TArray<T> {
    pub data: *mut T,
    pub count: i32,
    pub max: i32,
}

impl<T> TArray<T> {
    /// Array over caller-provided storage
    pub const fn from_raw(data: *mut T, count: i32, max: i32) -> Self {
        Self { data, count, max }
    }

    pub const fn empty() -> Self {
        Self::from_raw(ptr::null_mut(), 0, 0)
    }

    /// Element count; a negative host count reads as empty
    #[inline]
    pub fn len(&self) -> usize {
        usize::try_from(self.count).unwrap_or(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the live elements
    ///
    /// # Safety
    /// `data` must point to at least `count` initialized elements that stay
    /// valid for the returned lifetime.
    pub unsafe fn as_slice(&self) -> &[T] {
        if self.data.is_null() || self.is_empty() {
            return &[];
        }
        std::slice::from_raw_parts(self.data, self.len())
    }

    /// Bounds-checked element pointer
    pub fn get_ptr(&self, idx: usize) -> Option<*mut T> {
        if self.data.is_null() || idx >= self.len() {
            return None;
        }
        // SAFETY: idx is below the reported length
        Some(unsafe { self.data.add(idx) })
    }
}

impl<T> Clone for TArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TArray<T> {}

impl<T> Default for TArray<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> std::fmt::Debug for TArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TArray")
            .field("data", &self.data)
            .field("count", &self.count)
            .field("max", &self.max)
            .finish()
    }
}

/// Wide, NUL-terminated host string; `count` includes the terminator
pub type FString = TArray<u16>;

/// String the SDK only reads, never frees
///
/// Mirrors host fields whose storage the host manages on its own.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default)]
pub struct UnmanagedFString(pub FString);

impl FString {
    /// Decode the string, dropping the trailing NUL
    ///
    /// # Safety
    /// Same as [`TArray::as_slice`].
    pub unsafe fn to_string_lossy(&self) -> String {
        let units = self.as_slice();
        let units = units.strip_suffix(&[0]).unwrap_or(units);
        String::from_utf16_lossy(units)
    }
}

/// Key/value pair as laid out by the host
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TPair<K, V> {
    pub key: K,
    pub value: V,
}
