//! Willow layouts (UE3-based, 32-bit hosts)
//!
//! The host was compiled with 4-byte packing, so every descriptor is
//! `packed(4)`. Fields are only ever copied in and out, never borrowed,
//! except for the `base` members which are themselves 4-aligned.

// Private host fields are mirrored for layout only
#![allow(dead_code)]

use std::ffi::c_void;
use std::ops::{Deref, DerefMut};

use crate::flavour::{Flavour, FlavourKind};
use crate::unreal::layout::{
    assert_layout, impl_field_layout, impl_object_layout, impl_property_layout,
    impl_struct_layout, BoolPropertyLayout, ClassLayout, EnumLayout, FunctionLayout,
};
use crate::unreal::offsets::{offset_list, OffsetList};
use crate::unreal::structs::{FName, TArray};
use crate::unreal::templates;

/// Marker selecting the Willow descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Willow;

impl Flavour for Willow {
    const KIND: FlavourKind = FlavourKind::Willow;

    type UObject = UObject;
    type UField = UField;
    type UProperty = UProperty;
    type UStruct = UStruct;
    type UClass = UClass;
    type UFunction = UFunction;
    type UEnum = UEnum;
    type UBoolProperty = UBoolProperty;
    type ObjectArray = TArray<*mut UObject>;

    fn offset_list() -> OffsetList {
        offset_list!()
    }
}

macro_rules! deref_chain {
    ($($ty:ty => $base:ty),* $(,)?) => {
        $(
            impl Deref for $ty {
                type Target = $base;

                #[inline]
                fn deref(&self) -> &$base {
                    &self.base
                }
            }

            impl DerefMut for $ty {
                #[inline]
                fn deref_mut(&mut self) -> &mut $base {
                    &mut self.base
                }
            }
        )*
    };
}

#[repr(C, packed(4))]
pub struct UObject {
    vftable: *mut usize,
    hash_next: *mut UObject,
    pub object_flags: u64,
    hash_outer_next: *mut UObject,
    state_frame: *mut c_void,
    linker: *mut UObject,
    linker_index: *mut c_void,
    pub internal_index: i32,
    net_index: i32,
    pub outer: *mut UObject,
    pub name: FName,
    pub class: *mut UClass,
    object_archetype: *mut UObject,
}

#[repr(C, packed(4))]
pub struct UField {
    pub base: UObject,
    pub next: *mut UField,
}

#[repr(C, packed(4))]
pub struct UProperty {
    pub base: UField,
    pub array_dim: i32,
    pub element_size: i32,
    pub property_flags: u32,
    unknown_00: [u8; 0x14],
    pub offset_internal: i32,
    pub property_link_next: *mut UProperty,
    unknown_01: [u8; 0x18],
}

#[repr(C, packed(4))]
pub struct UStruct {
    pub base: UField,
    unknown_00: [u8; 0x08],
    pub super_field: *mut UStruct,
    pub children: *mut UField,
    pub property_size: u16,
    unknown_01: [u8; 0x1A],
    pub property_link: *mut UProperty,
    unknown_02: [u8; 0x10],
    pub script_object_references: TArray<*mut UObject>,
}

/// Entry of a class's implemented-interface list
#[repr(C, packed(4))]
#[derive(Clone, Copy)]
pub struct FImplementedInterface {
    pub class: *mut UClass,
    pub vftable_property: *mut UProperty,
}

#[repr(C, packed(4))]
pub struct UClass {
    pub base: UStruct,
    unknown_00: [u8; 0xCC],
    pub class_default_object: *mut UObject,
    unknown_01: [u8; 0x48],
    pub interfaces: TArray<FImplementedInterface>,
}

#[repr(C, packed(4))]
pub struct UFunction {
    pub base: UStruct,
    pub function_flags: u32,
    i_native: u16,
    rep_offset: u16,
    friendly_name: FName,
    oper_precedence: u8,
    pub num_params: u8,
    pub params_size: u16,
    pub return_value_offset: u16,
    unknown_00: [u8; 0x06],
    pub func: *mut c_void,
}

/// UE3 enums store names only; each value is its declaration index
#[repr(C, packed(4))]
pub struct UEnum {
    pub base: UField,
    pub names: TArray<FName>,
}

/// Packed boolean property
///
/// The flag lives in a 32-bit word at the property offset.
#[repr(C, packed(4))]
pub struct UBoolProperty {
    pub base: UProperty,
    pub field_mask: u32,
}

deref_chain! {
    UField => UObject,
    UProperty => UField,
    UStruct => UField,
    UClass => UStruct,
    UFunction => UStruct,
    UEnum => UField,
    UBoolProperty => UProperty,
}

impl_object_layout!(UObject, flags = u64, class = UClass);
impl_field_layout!(UField, object = UObject);
impl_property_layout!(UProperty, field = UField, object = UObject, flags = u32);
impl_struct_layout!(UStruct, field = UField, object = UObject, property = UProperty);

unsafe impl ClassLayout for UClass {
    type Object = UObject;
    type Property = UProperty;
    type Struct = UStruct;
    type Interface = FImplementedInterface;

    fn as_struct(&self) -> &UStruct {
        &self.base
    }
    fn class_default_object(&self) -> *mut UObject {
        self.class_default_object
    }
    fn set_class_default_object(&mut self, object: *mut UObject) {
        self.class_default_object = object;
    }
    fn interfaces(&self) -> TArray<FImplementedInterface> {
        self.interfaces
    }
}

unsafe impl FunctionLayout for UFunction {
    type Object = UObject;
    type Property = UProperty;
    type Struct = UStruct;

    fn as_struct(&self) -> &UStruct {
        &self.base
    }
    fn function_flags(&self) -> u32 {
        self.function_flags
    }
    fn set_function_flags(&mut self, flags: u32) {
        self.function_flags = flags;
    }
    fn num_params(&self) -> u8 {
        self.num_params
    }
    fn params_size(&self) -> u16 {
        self.params_size
    }
    fn return_value_offset(&self) -> u16 {
        self.return_value_offset
    }
    fn func(&self) -> *mut c_void {
        self.func
    }
}

unsafe impl EnumLayout for UEnum {
    type Field = UField;

    fn as_field(&self) -> &UField {
        &self.base
    }

    unsafe fn entries(&self) -> Vec<(FName, i64)> {
        let names = self.names;
        names
            .as_slice()
            .iter()
            .enumerate()
            .map(|(idx, name)| (*name, idx as i64))
            .collect()
    }
}

impl UBoolProperty {
    #[inline]
    pub fn field_mask(&self) -> u32 {
        self.field_mask
    }

    /// Lowest bit of the field mask; 32 for an empty mask
    #[inline]
    pub fn bit_index(&self) -> u32 {
        self.field_mask.trailing_zeros()
    }

    fn word_ptr(&self, container: *const u8) -> *const u32 {
        let offset = self.base.offset_internal;
        container.wrapping_offset(offset as isize).cast()
    }
}

unsafe impl BoolPropertyLayout for UBoolProperty {
    type Object = UObject;
    type Property = UProperty;

    fn as_property(&self) -> &UProperty {
        &self.base
    }

    unsafe fn get_value(&self, container: *const u8) -> bool {
        self.word_ptr(container).read_unaligned() & self.field_mask != 0
    }

    unsafe fn set_value(&self, container: *mut u8, value: bool) {
        let word = self.word_ptr(container).cast_mut();
        let mask = self.field_mask;
        let current = word.read_unaligned();
        word.write_unaligned(if value { current | mask } else { current & !mask });
    }
}

pub type UScriptStruct = templates::ScriptStruct<Willow>;
pub type UConst = templates::Const<Willow>;
pub type UArrayProperty = templates::ArrayProperty<Willow>;
pub type UByteProperty = templates::ByteProperty<Willow>;
pub type UDelegateProperty = templates::DelegateProperty<Willow>;
pub type UEnumProperty = templates::EnumProperty<Willow>;
pub type UFloatProperty = templates::FloatProperty<Willow>;
pub type UInterfaceProperty = templates::InterfaceProperty<Willow>;
pub type UIntProperty = templates::IntProperty<Willow>;
pub type UMulticastDelegateProperty = templates::MulticastDelegateProperty<Willow>;
pub type UObjectProperty = templates::ObjectProperty<Willow>;
pub type UStructProperty = templates::StructProperty<Willow>;
pub type UClassProperty = templates::ClassProperty<Willow>;
pub type USoftClassProperty = templates::SoftClassProperty<Willow>;
pub type UByteAttributeProperty = templates::ByteAttributeProperty<Willow>;
pub type UIntAttributeProperty = templates::IntAttributeProperty<Willow>;
pub type UFloatAttributeProperty = templates::FloatAttributeProperty<Willow>;

#[cfg(target_pointer_width = "32")]
mod native {
    use super::*;

    assert_layout!(
        UObject,
        size = 0x3C,
        object_flags = 0x08,
        internal_index = 0x20,
        outer = 0x28,
        name = 0x2C,
        class = 0x34,
    );
    assert_layout!(UField, size = 0x40, next = 0x3C);
    assert_layout!(
        UProperty,
        size = 0x80,
        array_dim = 0x40,
        element_size = 0x44,
        property_flags = 0x48,
        offset_internal = 0x60,
        property_link_next = 0x64,
    );
    assert_layout!(
        UStruct,
        size = 0x8C,
        super_field = 0x48,
        children = 0x4C,
        property_size = 0x50,
        property_link = 0x6C,
        script_object_references = 0x80,
    );
    assert_layout!(
        UClass,
        size = 0x1B0,
        class_default_object = 0x158,
        interfaces = 0x1A4,
    );
    assert_layout!(
        UFunction,
        size = 0xAC,
        function_flags = 0x8C,
        friendly_name = 0x94,
        num_params = 0x9D,
        params_size = 0x9E,
        return_value_offset = 0xA0,
        func = 0xA8,
    );
    assert_layout!(UEnum, size = 0x4C, names = 0x40);
    assert_layout!(UBoolProperty, size = 0x84, field_mask = 0x80);

    assert_layout!(UScriptStruct, size = 0x90, struct_flags = 0x8C);
    assert_layout!(UConst, size = 0x4C, value = 0x40);
    assert_layout!(UArrayProperty, size = 0x84, inner = 0x80);
    assert_layout!(UByteProperty, size = 0x84, enum_ = 0x80);
    assert_layout!(UObjectProperty, size = 0x84, property_class = 0x80);
    assert_layout!(UClassProperty, size = 0x88, meta_class = 0x84);
    assert_layout!(UStructProperty, size = 0x84, struct_ = 0x80);
    assert_layout!(
        UIntAttributeProperty,
        size = 0x88,
        modifier_stack_property = 0x80,
        other_attribute_property = 0x84,
    );
}
