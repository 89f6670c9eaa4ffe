//! Flavour selection - the closed set of supported host layouts
//!
//! Every flavour is compiled into every build so generic code is checked
//! against all of them. Which one is *active* is fixed by the build target:
//! Willow hosts are 32-bit, Oak hosts are 64-bit. Layouts are never detected
//! at runtime.

use std::fmt;

use crate::unreal::layout::{
    BoolPropertyLayout, ClassLayout, EnumLayout, FieldLayout, FunctionLayout, ObjectLayout,
    PropertyLayout, StructLayout,
};
use crate::unreal::offsets::OffsetList;
use crate::unreal::registry::ObjectArray;

/// Tag for one of the supported host layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FlavourKind {
    /// UE3-based hosts
    Willow = 0,
    /// UE4-based hosts
    Oak = 1,
}

impl FlavourKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Willow => "willow",
            Self::Oak => "oak",
        }
    }
}

impl fmt::Display for FlavourKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of layout descriptors making up one flavour
///
/// Implemented by zero-sized marker types. Generic code takes `F: Flavour`
/// and reaches every descriptor through the associated types.
pub trait Flavour: 'static {
    const KIND: FlavourKind;

    type UObject: ObjectLayout<Class = Self::UClass>;
    type UField: FieldLayout<Object = Self::UObject>;
    type UProperty: PropertyLayout<Object = Self::UObject, Field = Self::UField>;
    type UStruct: StructLayout<
        Object = Self::UObject,
        Field = Self::UField,
        Property = Self::UProperty,
    >;
    type UClass: ClassLayout<
        Object = Self::UObject,
        Property = Self::UProperty,
        Struct = Self::UStruct,
    >;
    type UFunction: FunctionLayout<
        Object = Self::UObject,
        Property = Self::UProperty,
        Struct = Self::UStruct,
    >;
    type UEnum: EnumLayout<Field = Self::UField>;
    type UBoolProperty: BoolPropertyLayout<Object = Self::UObject, Property = Self::UProperty>;
    type ObjectArray: ObjectArray<Object = Self::UObject>;

    /// Numeric offsets of every mirrored field, derived from the descriptors
    fn offset_list() -> OffsetList;
}

#[cfg(target_pointer_width = "64")]
pub type Active = crate::game::oak::Oak;

#[cfg(target_pointer_width = "32")]
pub type Active = crate::game::willow::Willow;

/// Flavour the current build mirrors
pub const ACTIVE: FlavourKind = <Active as Flavour>::KIND;
