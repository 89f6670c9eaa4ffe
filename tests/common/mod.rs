//! Fake host shared by the integration tests

#![allow(dead_code)]

use std::alloc::{alloc_zeroed, dealloc, realloc, Layout};
use std::ffi::c_void;
use std::ptr::{null_mut, NonNull};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use parking_lot::Mutex;
use unrealsdk::unreal::offsets::OffsetList;
use unrealsdk::unreal::structs::{FFrame, FLazyObjectPtr, FName, FSoftObjectPtr, FText, NameStr};
use unrealsdk::unreal::{ActiveGObjects, GObjects, ObjectLayout, UClass, UFunction, UObject};
use unrealsdk::{Active, Flavour, FlavourKind, Hook, Result, ACTIVE};

/// Size prefix stored in front of every fake host allocation
const HEADER: usize = 16;

/// Name table; an entry's index is its position
pub const NAMES: [&str; 4] = ["None", "Object", "Package", "Default__Object"];

pub const PATH_NAME: &str = "/Script/CoreUObject.Object";

pub static LIVE_ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);
pub static PROCESSED_EVENTS: AtomicUsize = AtomicUsize::new(0);
pub static CONSOLE: Mutex<Vec<String>> = Mutex::new(Vec::new());

static INIT: Once = Once::new();

pub fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Bind the fake host to the global gate, once per test binary
///
/// Config and logs go to a fresh temporary directory.
pub fn setup() {
    INIT.call_once(|| {
        let home = Box::leak(Box::new(tempfile::tempdir().unwrap()));
        std::env::set_var(unrealsdk::config::HOME_ENV, home.path());

        let factory = || Box::new(FakeHook::new()) as Box<dyn Hook>;
        assert!(unrealsdk::init(&factory).unwrap());
    });
}

/// Leak a zeroed object of the active flavour
pub fn leak_object() -> *mut UObject {
    Box::into_raw(Box::new(unsafe { std::mem::zeroed::<UObject>() }))
}

pub struct FakeHook {
    hooked: bool,
    gobjects: ActiveGObjects,
    offsets: OffsetList,
}

impl FakeHook {
    pub fn new() -> Self {
        // SAFETY: an all-zero registry is empty on every flavour
        let array = Box::leak(Box::new(unsafe {
            std::mem::zeroed::<<Active as Flavour>::ObjectArray>()
        }));
        Self {
            hooked: false,
            gobjects: unsafe { GObjects::new(NonNull::from(array)) },
            offsets: Active::offset_list(),
        }
    }
}

fn layout_for(len: usize) -> Layout {
    Layout::from_size_align(len + HEADER, HEADER).unwrap()
}

impl Hook for FakeHook {
    fn flavour(&self) -> FlavourKind {
        ACTIVE
    }

    fn hook(&mut self) -> Result<()> {
        self.hooked = true;
        Ok(())
    }

    fn is_console_ready(&self) -> bool {
        self.hooked
    }

    fn gobjects(&self) -> &ActiveGObjects {
        &self.gobjects
    }

    fn offsets(&self) -> &OffsetList {
        &self.offsets
    }

    fn u_malloc(&self, len: usize) -> *mut c_void {
        unsafe {
            let base = alloc_zeroed(layout_for(len));
            if base.is_null() {
                return null_mut();
            }
            base.cast::<usize>().write(len);
            LIVE_ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
            base.add(HEADER).cast()
        }
    }

    fn u_realloc(&self, original: *mut c_void, len: usize) -> *mut c_void {
        if original.is_null() {
            return self.u_malloc(len);
        }
        unsafe {
            let base = original.cast::<u8>().sub(HEADER);
            let old = base.cast::<usize>().read();
            let moved = realloc(base, layout_for(old), len + HEADER);
            if moved.is_null() {
                return null_mut();
            }
            moved.cast::<usize>().write(len);
            moved.add(HEADER).cast()
        }
    }

    fn u_free(&self, data: *mut c_void) {
        if data.is_null() {
            return;
        }
        unsafe {
            let base = data.cast::<u8>().sub(HEADER);
            let len = base.cast::<usize>().read();
            dealloc(base, layout_for(len));
        }
        LIVE_ALLOCATIONS.fetch_sub(1, Ordering::SeqCst);
    }

    fn construct_object(
        &self,
        cls: *mut UClass,
        outer: *mut UObject,
        name: FName,
        _flags: u64,
        _template_obj: *mut UObject,
    ) -> *mut UObject {
        let obj = leak_object();
        unsafe {
            (*obj).set_class(cls);
            (*obj).set_outer(outer);
            (*obj).set_name(name);
        }
        obj
    }

    fn find_object(&self, _cls: *mut UClass, name: &[u16]) -> *mut UObject {
        if name == wide("Object").as_slice() {
            let obj = leak_object();
            unsafe { (*obj).set_name(FName::new(1, 0)) };
            obj
        } else {
            null_mut()
        }
    }

    fn load_package(&self, _name: &[u16], _flags: u32) -> *mut UObject {
        null_mut()
    }

    fn fname_init(&self, name: &mut FName, value: &[u16], number: i32) {
        let index = NAMES
            .iter()
            .position(|entry| wide(entry).as_slice() == value)
            .unwrap_or(0);
        *name = FName::new(index as i32, number);
    }

    fn fname_get_str(&self, name: FName) -> NameStr<'_> {
        let entry = NAMES.get(name.index as usize).copied().unwrap_or("None");
        NameStr::Narrow(entry.as_bytes())
    }

    fn fframe_step(&self, _frame: *mut FFrame, _obj: *mut UObject, _param: *mut c_void) {}

    fn process_event(&self, _object: *mut UObject, _func: *mut UFunction, _params: *mut c_void) {
        PROCESSED_EVENTS.fetch_add(1, Ordering::SeqCst);
    }

    fn uconsole_output_text(&self, text: &[u16]) {
        CONSOLE.lock().push(String::from_utf16_lossy(text));
    }

    fn uobject_path_name(&self, obj: *const UObject) -> Vec<u16> {
        if obj.is_null() {
            wide("None")
        } else {
            wide(PATH_NAME)
        }
    }

    fn ftext_as_culture_invariant(&self, _text: *mut FText, _value: &[u16]) {}
    fn fsoftobjectptr_assign(&self, _ptr: *mut FSoftObjectPtr, _obj: *const UObject) {}
    fn flazyobjectptr_assign(&self, _ptr: *mut FLazyObjectPtr, _obj: *const UObject) {}
}
