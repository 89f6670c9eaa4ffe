//! Host types the SDK only passes through by pointer

use std::marker::{PhantomData, PhantomPinned};

macro_rules! opaque_host_type {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $name {
                _data: [u8; 0],
                _marker: PhantomData<(*mut u8, PhantomPinned)>,
            }
        )*
    };
}

opaque_host_type! {
    /// Script VM stack frame
    FFrame,
    /// Localizable text
    FText,
    /// Soft (path-based) object reference
    FSoftObjectPtr,
    /// Lazy (GUID-based) object reference
    FLazyObjectPtr,
}
