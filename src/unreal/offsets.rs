//! Numeric field offsets of the active flavour
//!
//! Consumers that poke host memory without the typed descriptors (scripting
//! layers, debuggers) read offsets from here. Every value is computed with
//! `offset_of!` over the descriptors, so the table cannot disagree with
//! them.

pub type OffsetType = u16;

macro_rules! offset_group {
    ($($(#[$meta:meta])* $name:ident { $($field:ident),* $(,)? })*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
            pub struct $name {
                $(pub $field: OffsetType,)*
            }
        )*
    };
}

offset_group! {
    ObjectOffsets { object_flags, internal_index, class, name, outer }
    FieldOffsets { next }
    PropertyOffsets { array_dim, element_size, property_flags, offset_internal, property_link_next }
    StructOffsets { super_field, children, property_size, property_link, script_object_references }
    ClassOffsets { class_default_object, interfaces }
    ScriptStructOffsets { struct_flags }
    FunctionOffsets { function_flags, num_params, params_size, return_value_offset, func }
    ConstOffsets { value }
    EnumOffsets { names }
    ArrayPropertyOffsets { inner }
    /// Only the mask is shared by every flavour
    BoolPropertyOffsets { field_mask }
    BytePropertyOffsets { enum_ }
    ClassPropertyOffsets { meta_class }
    DelegatePropertyOffsets { signature }
    EnumPropertyOffsets { underlying_prop, enum_ }
    InterfacePropertyOffsets { interface_class }
    MulticastDelegatePropertyOffsets { signature }
    ObjectPropertyOffsets { property_class }
    SoftClassPropertyOffsets { meta_class }
    StructPropertyOffsets { struct_ }
    AttributePropertyOffsets { modifier_stack_property, other_attribute_property }
}

/// Offsets of every mirrored field, one group per entity
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetList {
    pub uobject: ObjectOffsets,
    pub ufield: FieldOffsets,
    pub uproperty: PropertyOffsets,
    pub ustruct: StructOffsets,
    pub uclass: ClassOffsets,
    pub uscriptstruct: ScriptStructOffsets,
    pub ufunction: FunctionOffsets,
    pub uconst: ConstOffsets,
    pub uenum: EnumOffsets,
    pub uarrayproperty: ArrayPropertyOffsets,
    pub uboolproperty: BoolPropertyOffsets,
    pub ubyteproperty: BytePropertyOffsets,
    pub uclassproperty: ClassPropertyOffsets,
    pub udelegateproperty: DelegatePropertyOffsets,
    pub uenumproperty: EnumPropertyOffsets,
    pub uinterfaceproperty: InterfacePropertyOffsets,
    pub umulticastdelegateproperty: MulticastDelegatePropertyOffsets,
    pub uobjectproperty: ObjectPropertyOffsets,
    pub usoftclassproperty: SoftClassPropertyOffsets,
    pub ustructproperty: StructPropertyOffsets,
    pub ubyteattributeproperty: AttributePropertyOffsets,
    pub uintattributeproperty: AttributePropertyOffsets,
    pub ufloatattributeproperty: AttributePropertyOffsets,
}

/// Build one offset group from a descriptor type
macro_rules! offsets_of {
    ($group:ident, $ty:ty { $($field:ident),* $(,)? }) => {
        $crate::unreal::offsets::$group {
            $($field: ::core::mem::offset_of!($ty, $field) as $crate::unreal::offsets::OffsetType,)*
        }
    };
}
pub(crate) use offsets_of;

/// Build the full [`OffsetList`] for the invoking flavour module
///
/// The descriptor names (`UObject`, `UArrayProperty`, ...) resolve in the
/// module the macro is expanded in, so every flavour module must define the
/// same set of names.
macro_rules! offset_list {
    () => {
        $crate::unreal::offsets::OffsetList {
            uobject: $crate::unreal::offsets::offsets_of!(
                ObjectOffsets,
                UObject { object_flags, internal_index, class, name, outer }
            ),
            ufield: $crate::unreal::offsets::offsets_of!(FieldOffsets, UField { next }),
            uproperty: $crate::unreal::offsets::offsets_of!(
                PropertyOffsets,
                UProperty { array_dim, element_size, property_flags, offset_internal, property_link_next }
            ),
            ustruct: $crate::unreal::offsets::offsets_of!(
                StructOffsets,
                UStruct { super_field, children, property_size, property_link, script_object_references }
            ),
            uclass: $crate::unreal::offsets::offsets_of!(
                ClassOffsets,
                UClass { class_default_object, interfaces }
            ),
            uscriptstruct: $crate::unreal::offsets::offsets_of!(
                ScriptStructOffsets,
                UScriptStruct { struct_flags }
            ),
            ufunction: $crate::unreal::offsets::offsets_of!(
                FunctionOffsets,
                UFunction { function_flags, num_params, params_size, return_value_offset, func }
            ),
            uconst: $crate::unreal::offsets::offsets_of!(ConstOffsets, UConst { value }),
            uenum: $crate::unreal::offsets::offsets_of!(EnumOffsets, UEnum { names }),
            uarrayproperty: $crate::unreal::offsets::offsets_of!(
                ArrayPropertyOffsets,
                UArrayProperty { inner }
            ),
            uboolproperty: $crate::unreal::offsets::offsets_of!(
                BoolPropertyOffsets,
                UBoolProperty { field_mask }
            ),
            ubyteproperty: $crate::unreal::offsets::offsets_of!(
                BytePropertyOffsets,
                UByteProperty { enum_ }
            ),
            uclassproperty: $crate::unreal::offsets::offsets_of!(
                ClassPropertyOffsets,
                UClassProperty { meta_class }
            ),
            udelegateproperty: $crate::unreal::offsets::offsets_of!(
                DelegatePropertyOffsets,
                UDelegateProperty { signature }
            ),
            uenumproperty: $crate::unreal::offsets::offsets_of!(
                EnumPropertyOffsets,
                UEnumProperty { underlying_prop, enum_ }
            ),
            uinterfaceproperty: $crate::unreal::offsets::offsets_of!(
                InterfacePropertyOffsets,
                UInterfaceProperty { interface_class }
            ),
            umulticastdelegateproperty: $crate::unreal::offsets::offsets_of!(
                MulticastDelegatePropertyOffsets,
                UMulticastDelegateProperty { signature }
            ),
            uobjectproperty: $crate::unreal::offsets::offsets_of!(
                ObjectPropertyOffsets,
                UObjectProperty { property_class }
            ),
            usoftclassproperty: $crate::unreal::offsets::offsets_of!(
                SoftClassPropertyOffsets,
                USoftClassProperty { meta_class }
            ),
            ustructproperty: $crate::unreal::offsets::offsets_of!(
                StructPropertyOffsets,
                UStructProperty { struct_ }
            ),
            ubyteattributeproperty: $crate::unreal::offsets::offsets_of!(
                AttributePropertyOffsets,
                UByteAttributeProperty { modifier_stack_property, other_attribute_property }
            ),
            uintattributeproperty: $crate::unreal::offsets::offsets_of!(
                AttributePropertyOffsets,
                UIntAttributeProperty { modifier_stack_property, other_attribute_property }
            ),
            ufloatattributeproperty: $crate::unreal::offsets::offsets_of!(
                AttributePropertyOffsets,
                UFloatAttributeProperty { modifier_stack_property, other_attribute_property }
            ),
        }
    };
}
pub(crate) use offset_list;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flavour::Flavour;
    use crate::game::{oak::Oak, willow::Willow};

    #[test]
    fn every_group_starts_past_its_base() {
        for offsets in [Oak::offset_list(), Willow::offset_list()] {
            assert!(offsets.ufield.next >= offsets.uobject.outer);
            assert!(offsets.uproperty.array_dim > offsets.ufield.next);
            assert!(offsets.ustruct.super_field > offsets.ufield.next);
            assert!(offsets.uclass.class_default_object > offsets.ustruct.property_link);
            assert!(offsets.ufunction.func > offsets.ufunction.function_flags);
            assert!(offsets.uclassproperty.meta_class > offsets.uobjectproperty.property_class);
        }
    }

    #[test]
    fn attribute_groups_follow_their_value_property() {
        let oak = Oak::offset_list();
        let property_size = std::mem::size_of::<crate::game::oak::UProperty>() as OffsetType;
        assert_eq!(oak.uintattributeproperty.modifier_stack_property, property_size);
        assert_eq!(oak.ufloatattributeproperty.modifier_stack_property, property_size);
        assert_eq!(oak.uarrayproperty.inner, property_size);
    }

    #[test]
    fn flavours_disagree() {
        assert_ne!(Oak::offset_list(), Willow::offset_list());
    }
}
