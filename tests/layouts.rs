//! Descriptor layouts and bool masks across both flavours

use std::mem::{offset_of, zeroed};

use proptest::prelude::*;
use unrealsdk::game::{oak, willow};
use unrealsdk::unreal::{BoolPropertyLayout, PropertyLayout};
use unrealsdk::{Flavour, FlavourKind, ACTIVE};

fn oak_bool(offset: i32, byte_offset: u8, bit: u8) -> oak::UBoolProperty {
    let mut prop: oak::UBoolProperty = unsafe { zeroed() };
    prop.set_array_dim(1);
    prop.set_offset_internal(offset);
    prop.set_bitfield(byte_offset, bit);
    prop
}

fn willow_bool(offset: i32, mask: u32) -> willow::UBoolProperty {
    let mut prop: willow::UBoolProperty = unsafe { zeroed() };
    prop.set_array_dim(1);
    prop.set_offset_internal(offset);
    prop.field_mask = mask;
    prop
}

#[test]
fn test_active_flavour_follows_pointer_width() {
    let expected = if cfg!(target_pointer_width = "64") {
        FlavourKind::Oak
    } else {
        FlavourKind::Willow
    };
    assert_eq!(ACTIVE, expected);
}

#[test]
fn test_offset_lists_follow_descriptors() {
    let oak_offsets = oak::Oak::offset_list();
    assert_eq!(oak_offsets.uobject.internal_index as usize, offset_of!(oak::UObject, internal_index));
    assert_eq!(oak_offsets.ustruct.super_field as usize, offset_of!(oak::UStruct, super_field));
    assert_eq!(oak_offsets.uenum.names as usize, offset_of!(oak::UEnum, names));

    let willow_offsets = willow::Willow::offset_list();
    assert_eq!(willow_offsets.uobject.name as usize, offset_of!(willow::UObject, name));
    assert_eq!(willow_offsets.uproperty.offset_internal as usize, offset_of!(willow::UProperty, offset_internal));
    assert_eq!(willow_offsets.uboolproperty.field_mask as usize, offset_of!(willow::UBoolProperty, field_mask));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_oak_host_offsets() {
    let offsets = oak::Oak::offset_list();
    assert_eq!(offsets.uobject.class, 0x10);
    assert_eq!(offsets.uproperty.offset_internal, 0x44);
    assert_eq!(offsets.ustruct.property_link, 0x58);
    assert_eq!(offsets.uclass.class_default_object, 0xF8);
    assert_eq!(offsets.ufunction.func, 0xB0);
    assert_eq!(offsets.uboolproperty.field_mask, 0x73);
    assert_eq!(offsets.uclassproperty.meta_class, 0x78);
}

#[cfg(target_pointer_width = "32")]
#[test]
fn test_willow_host_offsets() {
    let offsets = willow::Willow::offset_list();
    assert_eq!(offsets.uobject.internal_index, 0x20);
    assert_eq!(offsets.uproperty.offset_internal, 0x60);
    assert_eq!(offsets.ustruct.property_link, 0x6C);
    assert_eq!(offsets.uclass.class_default_object, 0x158);
    assert_eq!(offsets.uboolproperty.field_mask, 0x80);
}

proptest! {
    #[test]
    fn test_oak_bool_touches_one_bit(
        initial in prop::collection::vec(any::<u8>(), 8),
        byte_offset in 0u8..4,
        bit in 0u8..8,
        value in any::<bool>(),
    ) {
        let prop = oak_bool(2, byte_offset, bit);
        let mut container = initial.clone();
        unsafe { prop.set_value(container.as_mut_ptr(), value) };

        prop_assert_eq!(unsafe { prop.get_value(container.as_ptr()) }, value);
        let target = 2 + usize::from(byte_offset);
        for (idx, (&before, &after)) in initial.iter().zip(&container).enumerate() {
            if idx == target {
                prop_assert_eq!(before & !(1 << bit), after & !(1 << bit));
            } else {
                prop_assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_willow_bool_touches_one_bit(
        initial in any::<u32>(),
        bit in 0u32..32,
        value in any::<bool>(),
    ) {
        let prop = willow_bool(0, 1 << bit);
        let mut container = initial.to_ne_bytes();
        unsafe { prop.set_value(container.as_mut_ptr(), value) };

        let after = u32::from_ne_bytes(container);
        prop_assert_eq!(unsafe { prop.get_value(container.as_ptr()) }, value);
        prop_assert_eq!(after & !(1 << bit), initial & !(1 << bit));
        prop_assert_eq!(after & (1 << bit) != 0, value);
    }
}
