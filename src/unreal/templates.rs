//! Generic layout templates
//!
//! One definition per property/struct kind, instantiated against each
//! flavour. The flavour parameter supplies the base descriptor (its
//! `UProperty`, `UStruct` or `UField`); the template appends the
//! kind-specific trailing fields, so the result has the flavour's exact
//! memory shape without repeating the kind logic once per flavour.

use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::flavour::Flavour;
use crate::unreal::layout::PropertyLayout;
use crate::unreal::structs::UnmanagedFString;

macro_rules! deref_to_base {
    ($($ty:ident => $target:ty),* $(,)?) => {
        $(
            impl<F: Flavour> Deref for $ty<F> {
                type Target = $target;

                #[inline]
                fn deref(&self) -> &$target {
                    &self.base
                }
            }

            impl<F: Flavour> DerefMut for $ty<F> {
                #[inline]
                fn deref_mut(&mut self) -> &mut $target {
                    &mut self.base
                }
            }
        )*
    };
}

// ============================================================================
// Struct-like kinds
// ============================================================================

#[repr(C)]
pub struct ScriptStruct<F: Flavour> {
    pub base: F::UStruct,
    pub struct_flags: u32,
}

#[repr(C)]
pub struct Const<F: Flavour> {
    pub base: F::UField,
    pub value: UnmanagedFString,
}

// ============================================================================
// Property kinds
// ============================================================================

#[repr(C)]
pub struct ArrayProperty<F: Flavour> {
    pub base: F::UProperty,
    /// Describes a single element of the array
    pub inner: *mut F::UProperty,
}

#[repr(C)]
pub struct ByteProperty<F: Flavour> {
    pub base: F::UProperty,
    /// Set when the byte stores an enum value
    pub enum_: *mut F::UEnum,
}

#[repr(C)]
pub struct DelegateProperty<F: Flavour> {
    pub base: F::UProperty,
    pub signature: *mut F::UFunction,
}

#[repr(C)]
pub struct MulticastDelegateProperty<F: Flavour> {
    pub base: F::UProperty,
    pub signature: *mut F::UFunction,
}

#[repr(C)]
pub struct EnumProperty<F: Flavour> {
    pub base: F::UProperty,
    /// Numeric property holding the stored value
    pub underlying_prop: *mut F::UProperty,
    pub enum_: *mut F::UEnum,
}

#[repr(C)]
pub struct InterfaceProperty<F: Flavour> {
    pub base: F::UProperty,
    pub interface_class: *mut F::UClass,
}

#[repr(C)]
pub struct ObjectProperty<F: Flavour> {
    pub base: F::UProperty,
    pub property_class: *mut F::UClass,
}

#[repr(C)]
pub struct StructProperty<F: Flavour> {
    pub base: F::UProperty,
    pub struct_: *mut ScriptStruct<F>,
}

#[repr(C)]
pub struct ClassProperty<F: Flavour> {
    pub base: ObjectProperty<F>,
    pub meta_class: *mut F::UClass,
}

#[repr(C)]
pub struct SoftClassProperty<F: Flavour> {
    pub base: ObjectProperty<F>,
    pub meta_class: *mut F::UClass,
}

/// Kinds with no trailing fields
#[repr(transparent)]
pub struct IntProperty<F: Flavour> {
    pub base: F::UProperty,
}

#[repr(transparent)]
pub struct FloatProperty<F: Flavour> {
    pub base: F::UProperty,
}

deref_to_base! {
    ScriptStruct => F::UStruct,
    Const => F::UField,
    ArrayProperty => F::UProperty,
    ByteProperty => F::UProperty,
    DelegateProperty => F::UProperty,
    MulticastDelegateProperty => F::UProperty,
    EnumProperty => F::UProperty,
    InterfaceProperty => F::UProperty,
    ObjectProperty => F::UProperty,
    StructProperty => F::UProperty,
    ClassProperty => ObjectProperty<F>,
    SoftClassProperty => ObjectProperty<F>,
    IntProperty => F::UProperty,
    FloatProperty => F::UProperty,
}

// ============================================================================
// Attribute wrappers
// ============================================================================

/// Numeric property kinds an attribute can wrap
pub trait ValueProperty {
    type Flavour: Flavour;
    type Value: Copy;

    fn property(&self) -> &<Self::Flavour as Flavour>::UProperty;
}

macro_rules! value_property {
    ($($ty:ident => $value:ty),* $(,)?) => {
        $(
            impl<F: Flavour> ValueProperty for $ty<F> {
                type Flavour = F;
                type Value = $value;

                #[inline]
                fn property(&self) -> &F::UProperty {
                    &self.base
                }
            }
        )*
    };
}

value_property! {
    ByteProperty => u8,
    IntProperty => i32,
    FloatProperty => f32,
}

/// Numeric property whose value is resolved through a modifier stack
///
/// The host stacks buffs on top of a base value. The stored value and the
/// base value live in two separate properties of the same container;
/// `other_attribute_property` links the first to the second.
#[repr(C)]
pub struct AttributeProperty<T: ValueProperty> {
    pub base: T,
    pub modifier_stack_property: *mut ArrayProperty<T::Flavour>,
    pub other_attribute_property: *mut AttributeProperty<T>,
}

impl<T: ValueProperty> Deref for AttributeProperty<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.base
    }
}

impl<T: ValueProperty> DerefMut for AttributeProperty<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.base
    }
}

impl<T: ValueProperty> AttributeProperty<T> {
    /// Raw stored value
    ///
    /// # Safety
    /// `container` must be a live instance of the struct owning this property.
    pub unsafe fn value(&self, container: *const u8) -> Result<T::Value> {
        self.base.property().read_value(container, 0)
    }

    /// # Safety
    /// Same as [`AttributeProperty::value`], with write access.
    pub unsafe fn set_value(&self, container: *mut u8, value: T::Value) -> Result<()> {
        self.base.property().write_value(container, 0, value)
    }

    /// Value of the linked base-value property, if the host linked one
    ///
    /// # Safety
    /// Same as [`AttributeProperty::value`]; the linked property must be live.
    pub unsafe fn base_value(&self, container: *const u8) -> Result<Option<T::Value>> {
        match self.other_attribute_property.as_ref() {
            Some(other) => other.value(container).map(Some),
            None => Ok(None),
        }
    }

    /// Returns `false` without writing if there is no base-value property
    ///
    /// # Safety
    /// Same as [`AttributeProperty::set_value`]; the linked property must be live.
    pub unsafe fn set_base_value(&self, container: *mut u8, value: T::Value) -> Result<bool> {
        match self.other_attribute_property.as_ref() {
            Some(other) => other.set_value(container, value).map(|()| true),
            None => Ok(false),
        }
    }
}

pub type ByteAttributeProperty<F> = AttributeProperty<ByteProperty<F>>;
pub type IntAttributeProperty<F> = AttributeProperty<IntProperty<F>>;
pub type FloatAttributeProperty<F> = AttributeProperty<FloatProperty<F>>;
