//! Mirrors of the host's reflection system
//!
//! Generic pieces (accessor traits, templates, the registry view) live
//! here; the per-flavour descriptors live in [`crate::game`]. The aliases
//! below name the descriptors of the flavour this build mirrors.

pub mod layout;
pub mod offsets;
pub mod registry;
pub mod structs;
pub mod templates;

use crate::flavour::{Active, Flavour};

pub use layout::{
    BoolPropertyLayout, ClassLayout, EnumLayout, FieldLayout, FunctionLayout, ObjectLayout,
    PropertyLayout, StructLayout,
};
pub use offsets::OffsetList;
pub use registry::{GObjects, ObjectArray};

pub type UObject = <Active as Flavour>::UObject;
pub type UField = <Active as Flavour>::UField;
pub type UProperty = <Active as Flavour>::UProperty;
pub type UStruct = <Active as Flavour>::UStruct;
pub type UClass = <Active as Flavour>::UClass;
pub type UFunction = <Active as Flavour>::UFunction;
pub type UEnum = <Active as Flavour>::UEnum;
pub type UBoolProperty = <Active as Flavour>::UBoolProperty;

/// Registry view over the active flavour's object array
pub type ActiveGObjects = GObjects<<Active as Flavour>::ObjectArray>;
