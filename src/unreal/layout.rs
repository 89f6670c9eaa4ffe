//! Flavour-agnostic accessors over layout descriptors
//!
//! Descriptors are plain `#[repr(C)]` data. The traits here give generic
//! code one typed get/set surface for every flavour; each accessor is a load
//! or store at a field whose offset the descriptor fixes at compile time.
//!
//! The chain mirrors the host's single inheritance. Every level embeds the
//! one above it as its first member, so `as_field`/`as_object` are free
//! upcasts.

use std::ffi::c_void;

use crate::error::{Result, SdkError};
use crate::unreal::structs::{FName, TArray};

/// Compile-time size/offset check for a descriptor
///
/// Any drift from the host layout fails the build.
macro_rules! assert_layout {
    ($ty:ty, size = $size:expr $(, $field:ident = $offset:expr)* $(,)?) => {
        const _: () = {
            assert!(
                ::core::mem::size_of::<$ty>() == $size,
                concat!("size of ", stringify!($ty), " does not match the host")
            );
            $(
                assert!(
                    ::core::mem::offset_of!($ty, $field) == $offset,
                    concat!("offset of ", stringify!($ty), "::", stringify!($field), " does not match the host")
                );
            )*
        };
    };
}
pub(crate) use assert_layout;

/// Base object header
///
/// # Safety
/// Implementors must be `#[repr(C)]` mirrors of the host's object header.
pub unsafe trait ObjectLayout: Sized + 'static {
    /// Width differs between flavours (64 bits on UE3, 32 on UE4)
    type Flags: Copy + std::fmt::Debug;
    type Class;

    fn object_flags(&self) -> Self::Flags;
    fn set_object_flags(&mut self, flags: Self::Flags);
    /// Slot index in the global registry
    fn internal_index(&self) -> i32;
    fn set_internal_index(&mut self, index: i32);
    fn class(&self) -> *mut Self::Class;
    fn set_class(&mut self, class: *mut Self::Class);
    fn name(&self) -> FName;
    fn set_name(&mut self, name: FName);
    fn outer(&self) -> *mut Self;
    fn set_outer(&mut self, outer: *mut Self);
}

/// # Safety
/// Implementors must embed their flavour's object header as first member.
pub unsafe trait FieldLayout: Sized + 'static {
    type Object: ObjectLayout;

    fn as_object(&self) -> &Self::Object;
    fn as_object_mut(&mut self) -> &mut Self::Object;
    fn next(&self) -> *mut Self;
    fn set_next(&mut self, next: *mut Self);
}

/// # Safety
/// Implementors must embed their flavour's field layout as first member.
pub unsafe trait PropertyLayout: Sized + 'static {
    type Object: ObjectLayout;
    type Field: FieldLayout<Object = Self::Object>;
    type PropertyFlags: Copy + std::fmt::Debug;

    fn as_field(&self) -> &Self::Field;
    fn as_field_mut(&mut self) -> &mut Self::Field;
    fn array_dim(&self) -> i32;
    fn set_array_dim(&mut self, dim: i32);
    fn element_size(&self) -> i32;
    fn set_element_size(&mut self, size: i32);
    fn property_flags(&self) -> Self::PropertyFlags;
    /// Byte offset of this property inside its owning struct
    fn offset_internal(&self) -> i32;
    fn set_offset_internal(&mut self, offset: i32);
    fn property_link_next(&self) -> *mut Self;
    fn set_property_link_next(&mut self, next: *mut Self);

    #[inline]
    fn as_object(&self) -> &Self::Object {
        self.as_field().as_object()
    }

    /// Address of element `idx` of this property inside `container`
    ///
    /// Fails when `idx` is outside the static array dimension, or when the
    /// byte offset does not fit in `isize`. The container itself is not
    /// validated.
    fn value_ptr(&self, container: *mut u8, idx: usize) -> Result<*mut u8> {
        let dim = usize::try_from(self.array_dim()).unwrap_or(0);
        if idx >= dim {
            return Err(SdkError::OutOfRange {
                index: idx,
                size: dim,
            });
        }

        let offset = (idx as isize)
            .checked_mul(self.element_size() as isize)
            .and_then(|rel| rel.checked_add(self.offset_internal() as isize))
            .ok_or(SdkError::OutOfRange {
                index: idx,
                size: dim,
            })?;
        Ok(container.wrapping_offset(offset))
    }

    /// Typed load of element `idx`
    ///
    /// # Safety
    /// `container` must be a live instance of the struct owning this
    /// property and `T` must match the property's stored type.
    unsafe fn read_value<T: Copy>(&self, container: *const u8, idx: usize) -> Result<T> {
        let ptr = self.value_ptr(container.cast_mut(), idx)?;
        Ok(ptr.cast::<T>().read_unaligned())
    }

    /// Typed store of element `idx`
    ///
    /// # Safety
    /// Same as [`PropertyLayout::read_value`], with write access.
    unsafe fn write_value<T: Copy>(&self, container: *mut u8, idx: usize, value: T) -> Result<()> {
        let ptr = self.value_ptr(container, idx)?;
        ptr.cast::<T>().write_unaligned(value);
        Ok(())
    }
}

/// # Safety
/// Implementors must embed their flavour's field layout as first member.
pub unsafe trait StructLayout: Sized + 'static {
    type Object: ObjectLayout;
    type Field: FieldLayout<Object = Self::Object>;
    type Property: PropertyLayout<Object = Self::Object, Field = Self::Field>;

    fn as_field(&self) -> &Self::Field;
    fn super_field(&self) -> *mut Self;
    fn set_super_field(&mut self, super_field: *mut Self);
    /// Head of the child field chain
    fn children(&self) -> *mut Self::Field;
    fn set_children(&mut self, children: *mut Self::Field);
    /// Instance size in bytes
    fn property_size(&self) -> i32;
    /// Head of the property link chain (own and inherited properties)
    fn property_link(&self) -> *mut Self::Property;
    fn set_property_link(&mut self, link: *mut Self::Property);

    #[inline]
    fn as_object(&self) -> &Self::Object {
        self.as_field().as_object()
    }

    /// Walk the property link chain
    ///
    /// # Safety
    /// Every link reachable from `property_link` must be a live property.
    unsafe fn properties(&self) -> PropertyLinks<'_, Self::Property> {
        PropertyLinks {
            next: self.property_link(),
            _owner: std::marker::PhantomData,
        }
    }

    /// Whether `other` is this struct or one of its ancestors
    ///
    /// # Safety
    /// Every link of the super chain must be live.
    unsafe fn inherits(&self, other: *const Self) -> bool {
        let mut current: *const Self = self;
        while !current.is_null() {
            if current == other {
                return true;
            }
            current = (*current).super_field();
        }
        false
    }
}

/// Iterator over a property link chain
pub struct PropertyLinks<'a, P> {
    next: *mut P,
    _owner: std::marker::PhantomData<&'a P>,
}

impl<'a, P: PropertyLayout> Iterator for PropertyLinks<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        // SAFETY: guaranteed live by the caller of `StructLayout::properties`
        let current = unsafe { self.next.as_ref()? };
        self.next = current.property_link_next();
        Some(current)
    }
}

/// # Safety
/// Implementors must embed their flavour's struct layout as first member.
pub unsafe trait ClassLayout: Sized + 'static {
    type Object: ObjectLayout;
    type Property: PropertyLayout<Object = Self::Object>;
    type Struct: StructLayout<Object = Self::Object, Property = Self::Property>;
    type Interface;

    fn as_struct(&self) -> &Self::Struct;
    fn class_default_object(&self) -> *mut Self::Object;
    fn set_class_default_object(&mut self, object: *mut Self::Object);
    fn interfaces(&self) -> TArray<Self::Interface>;
}

/// # Safety
/// Implementors must embed their flavour's struct layout as first member.
pub unsafe trait FunctionLayout: Sized + 'static {
    type Object: ObjectLayout;
    type Property: PropertyLayout<Object = Self::Object>;
    type Struct: StructLayout<Object = Self::Object, Property = Self::Property>;

    fn as_struct(&self) -> &Self::Struct;
    fn function_flags(&self) -> u32;
    fn set_function_flags(&mut self, flags: u32);
    fn num_params(&self) -> u8;
    fn params_size(&self) -> u16;
    fn return_value_offset(&self) -> u16;
    /// Native implementation, if the function has one
    fn func(&self) -> *mut c_void;
}

/// # Safety
/// Implementors must embed their flavour's field layout as first member.
pub unsafe trait EnumLayout: Sized + 'static {
    type Field: FieldLayout;

    fn as_field(&self) -> &Self::Field;

    /// Name/value pairs in declaration order
    ///
    /// # Safety
    /// The names array must be live host storage.
    unsafe fn entries(&self) -> Vec<(FName, i64)>;
}

/// Packed boolean storage metadata
///
/// # Safety
/// Implementors must embed their flavour's property layout as first member.
pub unsafe trait BoolPropertyLayout: Sized + 'static {
    type Object: ObjectLayout;
    type Property: PropertyLayout<Object = Self::Object>;

    fn as_property(&self) -> &Self::Property;

    /// Read the flag out of `container`
    ///
    /// # Safety
    /// `container` must be a live instance of the struct owning this property.
    unsafe fn get_value(&self, container: *const u8) -> bool;

    /// Set or clear the flag, leaving neighbouring bits untouched
    ///
    /// # Safety
    /// Same as [`BoolPropertyLayout::get_value`], with write access.
    unsafe fn set_value(&self, container: *mut u8, value: bool);
}

/// Implement [`ObjectLayout`] for a descriptor with the standard field names
macro_rules! impl_object_layout {
    ($obj:ty, flags = $flags:ty, class = $class:ty) => {
        unsafe impl $crate::unreal::layout::ObjectLayout for $obj {
            type Flags = $flags;
            type Class = $class;

            #[inline]
            fn object_flags(&self) -> $flags {
                self.object_flags
            }
            #[inline]
            fn set_object_flags(&mut self, flags: $flags) {
                self.object_flags = flags;
            }
            #[inline]
            fn internal_index(&self) -> i32 {
                self.internal_index
            }
            #[inline]
            fn set_internal_index(&mut self, index: i32) {
                self.internal_index = index;
            }
            #[inline]
            fn class(&self) -> *mut $class {
                self.class
            }
            #[inline]
            fn set_class(&mut self, class: *mut $class) {
                self.class = class;
            }
            #[inline]
            fn name(&self) -> $crate::unreal::structs::FName {
                self.name
            }
            #[inline]
            fn set_name(&mut self, name: $crate::unreal::structs::FName) {
                self.name = name;
            }
            #[inline]
            fn outer(&self) -> *mut Self {
                self.outer
            }
            #[inline]
            fn set_outer(&mut self, outer: *mut Self) {
                self.outer = outer;
            }
        }
    };
}
pub(crate) use impl_object_layout;

/// Implement [`FieldLayout`] for a descriptor embedding `$obj` as `base`
macro_rules! impl_field_layout {
    ($field:ty, object = $obj:ty) => {
        unsafe impl $crate::unreal::layout::FieldLayout for $field {
            type Object = $obj;

            #[inline]
            fn as_object(&self) -> &$obj {
                &self.base
            }
            #[inline]
            fn as_object_mut(&mut self) -> &mut $obj {
                &mut self.base
            }
            #[inline]
            fn next(&self) -> *mut Self {
                self.next
            }
            #[inline]
            fn set_next(&mut self, next: *mut Self) {
                self.next = next;
            }
        }
    };
}
pub(crate) use impl_field_layout;

/// Implement [`PropertyLayout`] for a descriptor embedding `$field` as `base`
macro_rules! impl_property_layout {
    ($prop:ty, field = $field:ty, object = $obj:ty, flags = $flags:ty) => {
        unsafe impl $crate::unreal::layout::PropertyLayout for $prop {
            type Object = $obj;
            type Field = $field;
            type PropertyFlags = $flags;

            #[inline]
            fn as_field(&self) -> &$field {
                &self.base
            }
            #[inline]
            fn as_field_mut(&mut self) -> &mut $field {
                &mut self.base
            }
            #[inline]
            fn array_dim(&self) -> i32 {
                self.array_dim
            }
            #[inline]
            fn set_array_dim(&mut self, dim: i32) {
                self.array_dim = dim;
            }
            #[inline]
            fn element_size(&self) -> i32 {
                self.element_size
            }
            #[inline]
            fn set_element_size(&mut self, size: i32) {
                self.element_size = size;
            }
            #[inline]
            fn property_flags(&self) -> $flags {
                self.property_flags
            }
            #[inline]
            fn offset_internal(&self) -> i32 {
                self.offset_internal
            }
            #[inline]
            fn set_offset_internal(&mut self, offset: i32) {
                self.offset_internal = offset;
            }
            #[inline]
            fn property_link_next(&self) -> *mut Self {
                self.property_link_next
            }
            #[inline]
            fn set_property_link_next(&mut self, next: *mut Self) {
                self.property_link_next = next;
            }
        }
    };
}
pub(crate) use impl_property_layout;

/// Implement [`StructLayout`] for a descriptor embedding `$field` as `base`
macro_rules! impl_struct_layout {
    ($st:ty, field = $field:ty, object = $obj:ty, property = $prop:ty) => {
        unsafe impl $crate::unreal::layout::StructLayout for $st {
            type Object = $obj;
            type Field = $field;
            type Property = $prop;

            #[inline]
            fn as_field(&self) -> &$field {
                &self.base
            }
            #[inline]
            fn super_field(&self) -> *mut Self {
                self.super_field
            }
            #[inline]
            fn set_super_field(&mut self, super_field: *mut Self) {
                self.super_field = super_field;
            }
            #[inline]
            fn children(&self) -> *mut $field {
                self.children
            }
            #[inline]
            fn set_children(&mut self, children: *mut $field) {
                self.children = children;
            }
            #[inline]
            fn property_size(&self) -> i32 {
                i32::from(self.property_size)
            }
            #[inline]
            fn property_link(&self) -> *mut $prop {
                self.property_link
            }
            #[inline]
            fn set_property_link(&mut self, link: *mut $prop) {
                self.property_link = link;
            }
        }
    };
}
pub(crate) use impl_struct_layout;
