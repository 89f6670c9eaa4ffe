//! Chunked global object array used by UE4-based hosts

use std::ffi::c_void;
use std::ptr::{addr_of, addr_of_mut};
use std::sync::atomic::{AtomicI32, Ordering};

use super::TArray;
use crate::error::{Result, SdkError};
use crate::flavour::FlavourKind;
use crate::unreal::layout::{assert_layout, ObjectLayout};
use crate::unreal::registry::ObjectArray;

/// One registry slot
#[repr(C)]
pub struct FUObjectItem<O> {
    pub object: *mut O,
    pub flags: i32,
    pub cluster_root_index: i32,
    pub serial_number: i32,
}

/// Fixed-size chunks of slots, allocated by the host on demand
#[repr(C)]
pub struct FChunkedFixedUObjectArray<O> {
    pub objects: *mut *mut FUObjectItem<O>,
    pub pre_allocated_objects: *mut FUObjectItem<O>,
    pub max_elements: i32,
    pub num_elements: i32,
    pub max_chunks: i32,
    pub num_chunks: i32,
}

impl<O> FChunkedFixedUObjectArray<O> {
    pub const NUM_ELEMENTS_PER_CHUNK: usize = 64 * 1024;
}

/// The host's global object registry
#[repr(C)]
pub struct FUObjectArray<O> {
    pub obj_first_gc_index: i32,
    pub obj_last_non_gc_index: i32,
    pub max_objects_not_considered_by_gc: i32,
    pub open_for_disregard_for_gc: bool,
    pub obj_objects: FChunkedFixedUObjectArray<O>,
    obj_objects_critical: [u8; 0x28],
    obj_available_list: [u8; 0x08],
    create_listeners: TArray<*mut c_void>,
    delete_listeners: TArray<*mut c_void>,
    delete_listeners_critical: [u8; 0x28],
    pub master_serial_number: i32,
}

#[cfg(target_pointer_width = "64")]
mod native {
    use super::*;

    assert_layout!(FUObjectItem<c_void>, size = 0x18, serial_number = 0x10);
    assert_layout!(
        FChunkedFixedUObjectArray<c_void>,
        size = 0x20,
        num_elements = 0x14,
    );
    assert_layout!(
        FUObjectArray<c_void>,
        size = 0xB0,
        obj_objects = 0x10,
        master_serial_number = 0xA8,
    );
}

impl<O> FUObjectArray<O> {
    /// Pointer to the slot at `idx`, or null if its chunk is missing
    ///
    /// # Safety
    /// `this` must point to a live array and `idx` must be below its count.
    unsafe fn item_at(this: *mut Self, idx: usize) -> *mut FUObjectItem<O> {
        let per_chunk = FChunkedFixedUObjectArray::<O>::NUM_ELEMENTS_PER_CHUNK;
        let chunks = addr_of!((*this).obj_objects.objects).read_volatile();
        if chunks.is_null() {
            return std::ptr::null_mut();
        }

        let chunk = chunks.add(idx / per_chunk).read_volatile();
        if chunk.is_null() {
            return std::ptr::null_mut();
        }
        chunk.add(idx % per_chunk)
    }
}

unsafe impl<O: ObjectLayout> ObjectArray for FUObjectArray<O> {
    type Object = O;
    const FLAVOUR: FlavourKind = FlavourKind::Oak;
    const WEAK_REFERENCES: bool = true;

    unsafe fn len(this: *mut Self) -> usize {
        let count = addr_of!((*this).obj_objects.num_elements).read_volatile();
        usize::try_from(count).unwrap_or(0)
    }

    unsafe fn slot(this: *mut Self, idx: usize) -> *mut O {
        let item = Self::item_at(this, idx);
        if item.is_null() {
            return std::ptr::null_mut();
        }
        addr_of!((*item).object).read_volatile()
    }

    unsafe fn serial_number(this: *mut Self, idx: usize) -> Result<i32> {
        let item = Self::item_at(this, idx);
        if item.is_null() {
            return Ok(0);
        }
        Ok(AtomicI32::from_ptr(addr_of_mut!((*item).serial_number)).load(Ordering::SeqCst))
    }

    unsafe fn allocate_serial_number(this: *mut Self, idx: usize) -> Result<i32> {
        let item = Self::item_at(this, idx);
        if item.is_null() {
            return Err(SdkError::OutOfRange {
                index: idx,
                size: Self::len(this),
            });
        }

        let slot_serial = AtomicI32::from_ptr(addr_of_mut!((*item).serial_number));
        let existing = slot_serial.load(Ordering::SeqCst);
        if existing != 0 {
            return Ok(existing);
        }

        // Same protocol as the host: bump the master counter, then race to
        // install it. Losing the race means another thread's serial stands.
        let master = AtomicI32::from_ptr(addr_of_mut!((*this).master_serial_number));
        let fresh = master.fetch_add(1, Ordering::SeqCst) + 1;
        match slot_serial.compare_exchange(0, fresh, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => Ok(fresh),
            Err(winner) => Ok(winner),
        }
    }
}
