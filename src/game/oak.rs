//! Oak layouts (UE4-based, 64-bit hosts)

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
use crate::unreal::structs::{FName, FUObjectArray, TArray, TPair, UnmanagedFString};
use crate::unreal::templates;

/// Marker selecting the Oak descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Oak;

impl Flavour for Oak {
    const KIND: FlavourKind = FlavourKind::Oak;

    type UObject = UObject;
    type UField = UField;
    type UProperty = UProperty;
    type UStruct = UStruct;
    type UClass = UClass;
    type UFunction = UFunction;
    type UEnum = UEnum;
    type UBoolProperty = UBoolProperty;
    type ObjectArray = FUObjectArray<UObject>;

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

// ============================================================================
// Core chain
// ============================================================================

#[repr(C)]
pub struct UObject {
    vftable: *mut usize,
    pub object_flags: i32,
    pub internal_index: i32,
    pub class: *mut UClass,
    pub name: FName,
    pub outer: *mut UObject,
}

#[repr(C)]
pub struct UField {
    pub base: UObject,
    pub next: *mut UField,
}

#[repr(C)]
pub struct UProperty {
    pub base: UField,
    pub array_dim: i32,
    pub element_size: i32,
    pub property_flags: u64,
    rep_index: u16,
    blueprint_replication_condition: u8,
    pub offset_internal: i32,
    rep_notify_func: FName,
    pub property_link_next: *mut UProperty,
    next_ref: *mut UProperty,
    destructor_link_next: *mut UProperty,
    post_construct_link_next: *mut UProperty,
}

#[repr(C)]
pub struct UStruct {
    pub base: UField,
    pub super_field: *mut UStruct,
    pub children: *mut UField,
    pub property_size: i32,
    min_alignment: i32,
    script: TArray<u8>,
    pub property_link: *mut UProperty,
    ref_link: *mut UProperty,
    destructor_link: *mut UProperty,
    post_construct_link: *mut UProperty,
    pub script_object_references: TArray<*mut UObject>,
}

/// Entry of a class's implemented-interface list
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FImplementedInterface {
    pub class: *mut UClass,
    pub pointer_offset: i32,
    pub implemented_by_k2: bool,
}

#[repr(C)]
pub struct UClass {
    pub base: UStruct,
    unknown_00: [u8; 0x70],
    pub class_default_object: *mut UObject,
    unknown_01: [u8; 0xA0],
    pub interfaces: TArray<FImplementedInterface>,
}

#[repr(C)]
pub struct UFunction {
    pub base: UStruct,
    pub function_flags: u32,
    pub num_params: u8,
    pub params_size: u16,
    pub return_value_offset: u16,
    rpc_id: u16,
    rpc_response_id: u16,
    first_property_to_init: *mut UProperty,
    event_graph_function: *mut UFunction,
    event_graph_call_offset: i32,
    pub func: *mut c_void,
}

#[repr(C)]
pub struct UEnum {
    pub base: UField,
    cpp_type: UnmanagedFString,
    pub names: TArray<TPair<FName, u64>>,
    cpp_form: i64,
}

/// Packed boolean property
///
/// A native `bool` has a full-byte field mask; bitfield members have a
/// single bit set.
#[repr(C)]
pub struct UBoolProperty {
    pub base: UProperty,
    field_size: u8,
    byte_offset: u8,
    byte_mask: u8,
    pub field_mask: u8,
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

impl_object_layout!(UObject, flags = i32, class = UClass);
impl_field_layout!(UField, object = UObject);
impl_property_layout!(UProperty, field = UField, object = UObject, flags = u64);
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
        self.names
            .as_slice()
            .iter()
            .map(|pair| (pair.key, pair.value as i64))
            .collect()
    }
}

impl UBoolProperty {
    /// Size in bytes of the storage the flag lives in
    #[inline]
    pub fn field_size(&self) -> u8 {
        self.field_size
    }

    /// Byte, relative to the property offset, holding the flag
    #[inline]
    pub fn byte_offset(&self) -> u8 {
        self.byte_offset
    }

    /// Bits set when the flag is written true
    #[inline]
    pub fn byte_mask(&self) -> u8 {
        self.byte_mask
    }

    #[inline]
    pub fn field_mask(&self) -> u8 {
        self.field_mask
    }

    /// Lowest bit of the field mask; 8 for an empty mask
    #[inline]
    pub fn bit_index(&self) -> u8 {
        self.field_mask.trailing_zeros() as u8
    }

    /// Describe a flag stored in bit `bit` of byte `byte_offset`
    pub fn set_bitfield(&mut self, byte_offset: u8, bit: u8) {
        let mask = 1u8 << (bit & 7);
        self.field_size = 1;
        self.byte_offset = byte_offset;
        self.byte_mask = mask;
        self.field_mask = mask;
    }

    fn byte_ptr(&self, container: *const u8) -> *const u8 {
        container
            .wrapping_offset(self.base.offset_internal as isize)
            .wrapping_add(usize::from(self.byte_offset))
    }
}

unsafe impl BoolPropertyLayout for UBoolProperty {
    type Object = UObject;
    type Property = UProperty;

    fn as_property(&self) -> &UProperty {
        &self.base
    }

    unsafe fn get_value(&self, container: *const u8) -> bool {
        self.byte_ptr(container).read() & self.field_mask != 0
    }

    unsafe fn set_value(&self, container: *mut u8, value: bool) {
        let byte = self.byte_ptr(container).cast_mut();
        let set = if value { self.byte_mask } else { 0 };
        byte.write((byte.read() & !self.field_mask) | set);
    }
}

// ============================================================================
// Template instantiations
// ============================================================================

pub type UScriptStruct = templates::ScriptStruct<Oak>;
pub type UConst = templates::Const<Oak>;
pub type UArrayProperty = templates::ArrayProperty<Oak>;
pub type UByteProperty = templates::ByteProperty<Oak>;
pub type UDelegateProperty = templates::DelegateProperty<Oak>;
pub type UEnumProperty = templates::EnumProperty<Oak>;
pub type UFloatProperty = templates::FloatProperty<Oak>;
pub type UInterfaceProperty = templates::InterfaceProperty<Oak>;
pub type UIntProperty = templates::IntProperty<Oak>;
pub type UMulticastDelegateProperty = templates::MulticastDelegateProperty<Oak>;
pub type UObjectProperty = templates::ObjectProperty<Oak>;
pub type UStructProperty = templates::StructProperty<Oak>;
pub type UClassProperty = templates::ClassProperty<Oak>;
pub type USoftClassProperty = templates::SoftClassProperty<Oak>;
pub type UByteAttributeProperty = templates::ByteAttributeProperty<Oak>;
pub type UIntAttributeProperty = templates::IntAttributeProperty<Oak>;
pub type UFloatAttributeProperty = templates::FloatAttributeProperty<Oak>;

#[cfg(target_pointer_width = "64")]
mod native {
    use super::*;

    assert_layout!(
        UObject,
        size = 0x28,
        object_flags = 0x08,
        internal_index = 0x0C,
        class = 0x10,
        name = 0x18,
        outer = 0x20,
    );
    assert_layout!(UField, size = 0x30, next = 0x28);
    assert_layout!(
        UProperty,
        size = 0x70,
        array_dim = 0x30,
        element_size = 0x34,
        property_flags = 0x38,
        offset_internal = 0x44,
        rep_notify_func = 0x48,
        property_link_next = 0x50,
    );
    assert_layout!(
        UStruct,
        size = 0x88,
        super_field = 0x30,
        children = 0x38,
        property_size = 0x40,
        script = 0x48,
        property_link = 0x58,
        script_object_references = 0x78,
    );
    assert_layout!(FImplementedInterface, size = 0x10, pointer_offset = 0x08);
    assert_layout!(
        UClass,
        size = 0x1B0,
        class_default_object = 0xF8,
        interfaces = 0x1A0,
    );
    assert_layout!(
        UFunction,
        size = 0xB8,
        function_flags = 0x88,
        num_params = 0x8C,
        params_size = 0x8E,
        return_value_offset = 0x90,
        func = 0xB0,
    );
    assert_layout!(UEnum, size = 0x58, names = 0x40);
    assert_layout!(UBoolProperty, size = 0x78, field_mask = 0x73);

    assert_layout!(UScriptStruct, size = 0x90, struct_flags = 0x88);
    assert_layout!(UConst, size = 0x40, value = 0x30);
    assert_layout!(UArrayProperty, size = 0x78, inner = 0x70);
    assert_layout!(UByteProperty, size = 0x78, enum_ = 0x70);
    assert_layout!(UDelegateProperty, size = 0x78, signature = 0x70);
    assert_layout!(UEnumProperty, size = 0x80, underlying_prop = 0x70, enum_ = 0x78);
    assert_layout!(UFloatProperty, size = 0x70);
    assert_layout!(UInterfaceProperty, size = 0x78, interface_class = 0x70);
    assert_layout!(UIntProperty, size = 0x70);
    assert_layout!(UMulticastDelegateProperty, size = 0x78, signature = 0x70);
    assert_layout!(UObjectProperty, size = 0x78, property_class = 0x70);
    assert_layout!(UStructProperty, size = 0x78, struct_ = 0x70);
    assert_layout!(UClassProperty, size = 0x80, meta_class = 0x78);
    assert_layout!(USoftClassProperty, size = 0x80, meta_class = 0x78);
    assert_layout!(
        UByteAttributeProperty,
        size = 0x88,
        modifier_stack_property = 0x78,
        other_attribute_property = 0x80,
    );
    assert_layout!(
        UIntAttributeProperty,
        size = 0x80,
        modifier_stack_property = 0x70,
        other_attribute_property = 0x78,
    );
    assert_layout!(
        UFloatAttributeProperty,
        size = 0x80,
        modifier_stack_property = 0x70,
        other_attribute_property = 0x78,
    );
}
