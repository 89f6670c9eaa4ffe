//! Global object registry - bounded views over the host's object array
//!
//! The host owns the array and may grow, shrink or rewrite slots between
//! any two calls. Nothing here caches a size: every accessor re-reads the
//! live count, and every slot read goes through a volatile load.

use std::iter::FusedIterator;
use std::ptr::{addr_of, NonNull};

use tracing::trace;

use crate::error::{Result, SdkError};
use crate::flavour::FlavourKind;
use crate::unreal::layout::ObjectLayout;
use crate::unreal::structs::{FWeakObjectPtr, TArray};

/// Storage shape of a host registry
///
/// # Safety
/// Implementors must mirror the host's registry layout exactly; the
/// methods are handed raw pointers into host memory.
pub unsafe trait ObjectArray: 'static {
    type Object: ObjectLayout;

    /// Flavour family using this storage shape
    const FLAVOUR: FlavourKind;

    /// Whether slots carry serial numbers for weak references
    const WEAK_REFERENCES: bool = false;

    /// Live element count
    ///
    /// # Safety
    /// `this` must point to a live registry.
    unsafe fn len(this: *mut Self) -> usize;

    /// Object stored at `idx` (possibly null)
    ///
    /// # Safety
    /// `this` must point to a live registry and `idx` must be below `len`.
    unsafe fn slot(this: *mut Self, idx: usize) -> *mut Self::Object;

    /// Serial currently held by slot `idx`; zero if never assigned
    ///
    /// # Safety
    /// Same as [`ObjectArray::slot`].
    unsafe fn serial_number(_this: *mut Self, _idx: usize) -> Result<i32> {
        Err(unsupported::<Self>())
    }

    /// Serial of slot `idx`, assigning a fresh one if it has none
    ///
    /// # Safety
    /// Same as [`ObjectArray::slot`].
    unsafe fn allocate_serial_number(_this: *mut Self, _idx: usize) -> Result<i32> {
        Err(unsupported::<Self>())
    }
}

fn unsupported<A: ObjectArray + ?Sized>() -> SdkError {
    SdkError::Unsupported {
        operation: "weak object pointers",
        flavour: A::FLAVOUR,
    }
}

/// UE3 hosts keep a flat array of object pointers
unsafe impl<O: ObjectLayout> ObjectArray for TArray<*mut O> {
    type Object = O;
    const FLAVOUR: FlavourKind = FlavourKind::Willow;

    unsafe fn len(this: *mut Self) -> usize {
        usize::try_from(addr_of!((*this).count).read_volatile()).unwrap_or(0)
    }

    unsafe fn slot(this: *mut Self, idx: usize) -> *mut O {
        let data = addr_of!((*this).data).read_volatile();
        if data.is_null() {
            return std::ptr::null_mut();
        }
        data.add(idx).read_volatile()
    }
}

/// Non-owning view over the host's global object array
#[repr(transparent)]
pub struct GObjects<A: ObjectArray> {
    internal: NonNull<A>,
}

// SAFETY: the view never mutates the array; the host serializes its own
// writes, and callers are responsible for not racing them.
unsafe impl<A: ObjectArray> Send for GObjects<A> {}
unsafe impl<A: ObjectArray> Sync for GObjects<A> {}

impl<A: ObjectArray> GObjects<A> {
    /// Wrap the host registry at `internal`
    ///
    /// # Safety
    /// `internal` must point to the host's registry and stay valid for the
    /// lifetime of the view.
    pub const unsafe fn new(internal: NonNull<A>) -> Self {
        Self { internal }
    }

    #[inline]
    pub fn internal(&self) -> NonNull<A> {
        self.internal
    }

    /// Current element count, re-read from the host on every call
    #[inline]
    pub fn size(&self) -> usize {
        // SAFETY: `new` requires a live registry
        unsafe { A::len(self.internal.as_ptr()) }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Object at `idx`, failing if `idx` is past the live end
    pub fn at(&self, idx: usize) -> Result<Option<NonNull<A::Object>>> {
        let size = self.size();
        if idx >= size {
            return Err(SdkError::OutOfRange { index: idx, size });
        }
        // SAFETY: bounds checked against the live count above
        Ok(NonNull::new(unsafe { A::slot(self.internal.as_ptr(), idx) }))
    }

    /// Iterate every slot; the bound is fixed when the iterator is created
    pub fn iter(&self) -> Iter<'_, A> {
        Iter {
            gobjects: self,
            idx: 0,
            end: self.size(),
        }
    }

    /// Object behind a weak reference, or `None` if it no longer lives there
    ///
    /// References past the live end resolve to `None` rather than failing;
    /// they routinely outlive their target.
    pub fn get_weak_object(&self, weak: &FWeakObjectPtr) -> Result<Option<NonNull<A::Object>>> {
        if !A::WEAK_REFERENCES {
            return Err(unsupported::<A>());
        }
        if weak.is_null() {
            return Ok(None);
        }

        let idx = weak.object_index as usize;
        if idx >= self.size() {
            return Ok(None);
        }

        let array = self.internal.as_ptr();
        // SAFETY: idx is below the live count
        unsafe {
            if A::serial_number(array, idx)? != weak.object_serial_number {
                return Ok(None);
            }
            Ok(NonNull::new(A::slot(array, idx)))
        }
    }

    /// Point `weak` at `obj`, or at nothing if `obj` is `None`
    pub fn set_weak_object(&self, weak: &mut FWeakObjectPtr, obj: Option<&A::Object>) -> Result<()> {
        if !A::WEAK_REFERENCES {
            return Err(unsupported::<A>());
        }

        let Some(obj) = obj else {
            *weak = FWeakObjectPtr::NULL;
            return Ok(());
        };

        let index = obj.internal_index();
        let size = self.size();
        let idx = usize::try_from(index).map_err(|_| SdkError::OutOfRange {
            index: usize::MAX,
            size,
        })?;
        if idx >= size {
            return Err(SdkError::OutOfRange { index: idx, size });
        }

        // SAFETY: idx is below the live count
        let serial = unsafe { A::allocate_serial_number(self.internal.as_ptr(), idx)? };
        trace!(index, serial, "assigned weak object pointer");

        *weak = FWeakObjectPtr::new(index, serial);
        Ok(())
    }
}

impl<'a, A: ObjectArray> IntoIterator for &'a GObjects<A> {
    type Item = Option<NonNull<A::Object>>;
    type IntoIter = Iter<'a, A>;

    fn into_iter(self) -> Iter<'a, A> {
        self.iter()
    }
}

/// Forward iterator over registry slots
///
/// Each step re-reads the live slot, so it sees the host rewriting slot
/// contents. Slots the host has since trimmed off the end read as empty.
pub struct Iter<'a, A: ObjectArray> {
    gobjects: &'a GObjects<A>,
    idx: usize,
    end: usize,
}

impl<A: ObjectArray> Iter<'_, A> {
    /// Index of the next slot to be yielded
    #[inline]
    pub fn index(&self) -> usize {
        self.idx
    }
}

impl<A: ObjectArray> Iterator for Iter<'_, A> {
    type Item = Option<NonNull<A::Object>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.end {
            return None;
        }

        let idx = self.idx;
        self.idx += 1;

        if idx >= self.gobjects.size() {
            return Some(None);
        }
        // SAFETY: idx is below the live count
        Some(NonNull::new(unsafe {
            A::slot(self.gobjects.internal.as_ptr(), idx)
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.idx;
        (remaining, Some(remaining))
    }
}

impl<A: ObjectArray> ExactSizeIterator for Iter<'_, A> {}

impl<A: ObjectArray> FusedIterator for Iter<'_, A> {}

impl<A: ObjectArray> PartialEq for Iter<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.gobjects, other.gobjects) && self.idx == other.idx
    }
}

impl<A: ObjectArray> Eq for Iter<'_, A> {}

#[cfg(test)]
mod tests;
