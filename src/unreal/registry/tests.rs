//! Tests for the registry view

use std::mem::zeroed;
use std::ptr::null_mut;

use super::*;
use crate::game::{oak, willow};
use crate::unreal::structs::{FChunkedFixedUObjectArray, FUObjectArray, FUObjectItem};

const PER_CHUNK: usize = FChunkedFixedUObjectArray::<oak::UObject>::NUM_ELEMENTS_PER_CHUNK;

/// Flat UE3-style registry over leaked test objects
struct FlatRegistry {
    array: *mut TArray<*mut willow::UObject>,
    objects: Vec<*mut willow::UObject>,
}

impl FlatRegistry {
    /// `false` entries become empty slots
    fn new(slots: &[bool]) -> Self {
        let mut objects = Vec::new();
        let mut storage: Vec<*mut willow::UObject> = slots
            .iter()
            .map(|&filled| {
                if !filled {
                    return null_mut();
                }
                let obj = Box::into_raw(Box::new(unsafe { zeroed::<willow::UObject>() }));
                objects.push(obj);
                obj
            })
            .collect();
        let len = storage.len() as i32;
        let data = storage.as_mut_ptr();
        std::mem::forget(storage);

        let array = Box::into_raw(Box::new(TArray::from_raw(data, len, len)));
        Self { array, objects }
    }

    fn gobjects(&self) -> GObjects<TArray<*mut willow::UObject>> {
        unsafe { GObjects::new(NonNull::new_unchecked(self.array)) }
    }
}

/// Chunked UE4-style registry with `chunks` full chunks of slots
struct ChunkedRegistry {
    array: *mut FUObjectArray<oak::UObject>,
}

impl ChunkedRegistry {
    fn new(chunks: usize, num_elements: usize) -> Self {
        let mut chunk_ptrs: Vec<*mut FUObjectItem<oak::UObject>> = (0..chunks)
            .map(|_| {
                let items: Vec<FUObjectItem<oak::UObject>> =
                    (0..PER_CHUNK).map(|_| unsafe { zeroed() }).collect();
                Box::leak(items.into_boxed_slice()).as_mut_ptr()
            })
            .collect();

        let mut array: Box<FUObjectArray<oak::UObject>> = Box::new(unsafe { zeroed() });
        array.obj_objects.objects = chunk_ptrs.as_mut_ptr();
        array.obj_objects.num_chunks = chunks as i32;
        array.obj_objects.max_chunks = chunks as i32;
        array.obj_objects.max_elements = (chunks * PER_CHUNK) as i32;
        array.obj_objects.num_elements = num_elements as i32;
        std::mem::forget(chunk_ptrs);

        Self {
            array: Box::into_raw(array),
        }
    }

    fn item(&self, idx: usize) -> *mut FUObjectItem<oak::UObject> {
        unsafe {
            let chunk = *(*self.array).obj_objects.objects.add(idx / PER_CHUNK);
            chunk.add(idx % PER_CHUNK)
        }
    }

    /// Place a fresh object in slot `idx`
    fn insert(&self, idx: usize) -> *mut oak::UObject {
        let mut obj: Box<oak::UObject> = Box::new(unsafe { zeroed() });
        obj.internal_index = idx as i32;
        let obj = Box::into_raw(obj);
        unsafe { (*self.item(idx)).object = obj };
        obj
    }

    fn gobjects(&self) -> GObjects<FUObjectArray<oak::UObject>> {
        unsafe { GObjects::new(NonNull::new_unchecked(self.array)) }
    }
}

// ========== Flat Registry Tests ==========

#[test]
fn test_flat_size_and_at() {
    let registry = FlatRegistry::new(&[true, false, true]);
    let gobjects = registry.gobjects();

    assert_eq!(gobjects.size(), 3);
    assert_eq!(gobjects.at(0).unwrap().unwrap().as_ptr(), registry.objects[0]);
    assert_eq!(gobjects.at(1).unwrap(), None);
    assert_eq!(gobjects.at(2).unwrap().unwrap().as_ptr(), registry.objects[1]);
    assert!(matches!(
        gobjects.at(3),
        Err(SdkError::OutOfRange { index: 3, size: 3 })
    ));
}

#[test]
fn test_flat_iter_matches_at() {
    let registry = FlatRegistry::new(&[false, true, true, false, true]);
    let gobjects = registry.gobjects();

    let iterated: Vec<_> = gobjects.iter().collect();
    assert_eq!(iterated.len(), gobjects.size());
    for (idx, slot) in iterated.into_iter().enumerate() {
        assert_eq!(slot, gobjects.at(idx).unwrap());
    }
}

#[test]
fn test_size_is_reread_live() {
    let registry = FlatRegistry::new(&[true, true, true, true]);
    let gobjects = registry.gobjects();
    assert_eq!(gobjects.size(), 4);

    unsafe { (*registry.array).count = 2 };
    assert_eq!(gobjects.size(), 2);
    assert!(gobjects.at(2).is_err());
}

#[test]
fn test_iter_bound_fixed_at_creation() {
    let registry = FlatRegistry::new(&[true, true, true]);
    let gobjects = registry.gobjects();
    let mut iter = gobjects.iter();
    assert_eq!(iter.len(), 3);

    // Host trims the array mid-iteration; the trimmed slots read as empty
    unsafe { (*registry.array).count = 1 };
    assert!(iter.next().unwrap().is_some());
    assert_eq!(iter.next(), Some(None));
    assert_eq!(iter.next(), Some(None));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);
}

#[test]
fn test_iter_sees_rewritten_slot() {
    let registry = FlatRegistry::new(&[true, true]);
    let gobjects = registry.gobjects();
    let mut iter = gobjects.iter();

    unsafe { *(*registry.array).data.add(1) = null_mut() };
    assert!(iter.next().unwrap().is_some());
    assert_eq!(iter.next(), Some(None));
}

#[test]
fn test_iter_equality() {
    let registry = FlatRegistry::new(&[true, true]);
    let gobjects = registry.gobjects();

    let mut a = gobjects.iter();
    let mut b = (&gobjects).into_iter();
    assert!(a == b);
    a.next();
    assert!(a != b);
    b.next();
    assert!(a == b);
    assert_eq!(a.index(), 1);
}

#[test]
fn test_empty_registry() {
    let registry = FlatRegistry::new(&[]);
    let gobjects = registry.gobjects();
    assert!(gobjects.is_empty());
    assert_eq!(gobjects.iter().count(), 0);
}

#[test]
fn test_flat_has_no_weak_references() {
    let registry = FlatRegistry::new(&[true]);
    let gobjects = registry.gobjects();
    let obj = unsafe { &*registry.objects[0] };

    let mut weak = FWeakObjectPtr::NULL;
    assert!(matches!(
        gobjects.set_weak_object(&mut weak, Some(obj)),
        Err(SdkError::Unsupported { flavour: FlavourKind::Willow, .. })
    ));
    assert!(matches!(
        gobjects.get_weak_object(&FWeakObjectPtr::new(0, 1)),
        Err(SdkError::Unsupported { .. })
    ));
}

// ========== Chunked Registry Tests ==========

#[test]
fn test_chunk_boundary() {
    let registry = ChunkedRegistry::new(2, PER_CHUNK + 1);
    let first = registry.insert(0);
    let boundary = registry.insert(PER_CHUNK);
    let gobjects = registry.gobjects();

    assert_eq!(gobjects.size(), PER_CHUNK + 1);
    assert_eq!(gobjects.at(0).unwrap().unwrap().as_ptr(), first);
    assert_eq!(gobjects.at(PER_CHUNK).unwrap().unwrap().as_ptr(), boundary);
    assert_eq!(registry.item(PER_CHUNK), unsafe {
        *(*registry.array).obj_objects.objects.add(1)
    });
    assert_eq!(gobjects.at(1).unwrap(), None);
}

#[test]
fn test_missing_chunk_reads_empty() {
    let registry = ChunkedRegistry::new(1, 10);
    unsafe { *(*registry.array).obj_objects.objects = null_mut() };
    let gobjects = registry.gobjects();
    assert_eq!(gobjects.at(3).unwrap(), None);
}

#[test]
fn test_weak_round_trip() {
    let registry = ChunkedRegistry::new(1, 8);
    let obj = registry.insert(5);
    let gobjects = registry.gobjects();

    let mut weak = FWeakObjectPtr::NULL;
    gobjects
        .set_weak_object(&mut weak, Some(unsafe { &*obj }))
        .unwrap();
    assert_eq!(weak.object_index, 5);
    assert_ne!(weak.object_serial_number, 0);
    assert_eq!(gobjects.get_weak_object(&weak).unwrap().unwrap().as_ptr(), obj);
}

#[test]
fn test_weak_serial_allocated_once() {
    let registry = ChunkedRegistry::new(1, 8);
    let obj = registry.insert(2);
    let gobjects = registry.gobjects();
    unsafe { (*registry.array).master_serial_number = 40 };

    let mut first = FWeakObjectPtr::NULL;
    let mut second = FWeakObjectPtr::NULL;
    gobjects.set_weak_object(&mut first, Some(unsafe { &*obj })).unwrap();
    gobjects.set_weak_object(&mut second, Some(unsafe { &*obj })).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.object_serial_number, 41);
    assert_eq!(unsafe { (*registry.array).master_serial_number }, 41);
    assert_eq!(unsafe { (*registry.item(2)).serial_number }, 41);
}

#[test]
fn test_weak_existing_serial_reused() {
    let registry = ChunkedRegistry::new(1, 8);
    let obj = registry.insert(3);
    unsafe { (*registry.item(3)).serial_number = 7 };
    let gobjects = registry.gobjects();

    let mut weak = FWeakObjectPtr::NULL;
    gobjects.set_weak_object(&mut weak, Some(unsafe { &*obj })).unwrap();
    assert_eq!(weak, FWeakObjectPtr::new(3, 7));
    assert_eq!(unsafe { (*registry.array).master_serial_number }, 0);
}

#[test]
fn test_weak_misses() {
    let registry = ChunkedRegistry::new(1, 8);
    registry.insert(1);
    unsafe { (*registry.item(1)).serial_number = 9 };
    unsafe { (*registry.item(2)).serial_number = 4 };
    let gobjects = registry.gobjects();

    let misses = [
        FWeakObjectPtr::NULL,
        FWeakObjectPtr::new(1, 0),
        FWeakObjectPtr::new(-3, 9),
        FWeakObjectPtr::new(8, 9),
        FWeakObjectPtr::new(1, 10),
        // Serial matches but the slot is empty
        FWeakObjectPtr::new(2, 4),
    ];
    for weak in misses {
        assert_eq!(gobjects.get_weak_object(&weak).unwrap(), None, "{weak:?}");
    }
    assert!(gobjects.get_weak_object(&FWeakObjectPtr::new(1, 9)).unwrap().is_some());
}

#[test]
fn test_weak_stale_after_slot_reuse() {
    let registry = ChunkedRegistry::new(1, 8);
    let obj = registry.insert(4);
    let gobjects = registry.gobjects();

    let mut weak = FWeakObjectPtr::NULL;
    gobjects.set_weak_object(&mut weak, Some(unsafe { &*obj })).unwrap();

    // Host destroys the object and recycles the slot with a new serial
    registry.insert(4);
    unsafe { (*registry.item(4)).serial_number = weak.object_serial_number + 1 };
    assert_eq!(gobjects.get_weak_object(&weak).unwrap(), None);
}

#[test]
fn test_set_weak_null_writes_sentinel() {
    let registry = ChunkedRegistry::new(1, 8);
    let gobjects = registry.gobjects();

    let mut weak = FWeakObjectPtr::new(3, 3);
    gobjects.set_weak_object(&mut weak, None).unwrap();
    assert_eq!(weak, FWeakObjectPtr::NULL);
}

#[test]
fn test_set_weak_out_of_range_object() {
    let registry = ChunkedRegistry::new(1, 8);
    let gobjects = registry.gobjects();
    let mut stray: oak::UObject = unsafe { zeroed() };
    stray.internal_index = 100;

    let mut weak = FWeakObjectPtr::NULL;
    assert!(matches!(
        gobjects.set_weak_object(&mut weak, Some(&stray)),
        Err(SdkError::OutOfRange { index: 100, size: 8 })
    ));
    assert_eq!(weak, FWeakObjectPtr::NULL);
}
