//! Flavour descriptors and the hook seam
//!
//! [`Hook`] is the boundary to the code that actually redirects host call
//! sites and locates host globals. The SDK never does either itself: it
//! calls through whichever hook [`crate::init`] bound.

pub mod oak;
pub mod willow;

use std::ffi::c_void;

use crate::error::Result;
use crate::flavour::FlavourKind;
use crate::unreal::offsets::OffsetList;
use crate::unreal::structs::{FFrame, FLazyObjectPtr, FName, FSoftObjectPtr, FText, NameStr};
use crate::unreal::{ActiveGObjects, UClass, UFunction, UObject};

/// A host bound to one flavour
///
/// Every pointer argument is host memory; implementations forward it to
/// the host routine that owns it.
pub trait Hook: Send + Sync {
    /// Layout family this hook was written against
    fn flavour(&self) -> FlavourKind;

    /// Locate host globals and install call-site redirections
    fn hook(&mut self) -> Result<()>;

    /// Runs once the hook is reachable through the global accessors
    fn post_init(&self) {}

    /// Whether the host console can accept text yet
    fn is_console_ready(&self) -> bool;

    fn gobjects(&self) -> &ActiveGObjects;
    fn offsets(&self) -> &OffsetList;

    fn u_malloc(&self, len: usize) -> *mut c_void;
    fn u_realloc(&self, original: *mut c_void, len: usize) -> *mut c_void;
    fn u_free(&self, data: *mut c_void);

    fn construct_object(
        &self,
        cls: *mut UClass,
        outer: *mut UObject,
        name: FName,
        flags: u64,
        template_obj: *mut UObject,
    ) -> *mut UObject;
    /// Null when nothing matches
    fn find_object(&self, cls: *mut UClass, name: &[u16]) -> *mut UObject;
    fn load_package(&self, name: &[u16], flags: u32) -> *mut UObject;

    fn fname_init(&self, name: &mut FName, value: &[u16], number: i32);
    /// Entry text as stored in the host name table
    fn fname_get_str(&self, name: FName) -> NameStr<'_>;

    fn fframe_step(&self, frame: *mut FFrame, obj: *mut UObject, param: *mut c_void);
    fn process_event(&self, object: *mut UObject, func: *mut UFunction, params: *mut c_void);

    fn uconsole_output_text(&self, text: &[u16]);
    /// Full dotted path of `obj`, without a terminator
    fn uobject_path_name(&self, obj: *const UObject) -> Vec<u16>;

    fn ftext_as_culture_invariant(&self, text: *mut FText, value: &[u16]);
    fn fsoftobjectptr_assign(&self, ptr: *mut FSoftObjectPtr, obj: *const UObject);
    fn flazyobjectptr_assign(&self, ptr: *mut FLazyObjectPtr, obj: *const UObject);
}

/// Produces the hook during initialization
pub trait HookFactory {
    /// Bring up the call-site redirection backend before the hook is built
    fn init_substrate(&self) -> Result<()> {
        Ok(())
    }

    fn create(&self) -> Box<dyn Hook>;
}

impl<F> HookFactory for F
where
    F: Fn() -> Box<dyn Hook>,
{
    fn create(&self) -> Box<dyn Hook> {
        self()
    }
}
