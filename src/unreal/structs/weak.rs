//! Weak object references

/// Host weak reference: a registry slot index plus the serial number the
/// slot held when the reference was taken
///
/// The serial is compared for equality only. Zero means "never assigned".
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FWeakObjectPtr {
    pub object_index: i32,
    pub object_serial_number: i32,
}

impl FWeakObjectPtr {
    /// Encoding of "no object"
    pub const NULL: Self = Self {
        object_index: -1,
        object_serial_number: 0,
    };

    #[inline]
    pub const fn new(object_index: i32, object_serial_number: i32) -> Self {
        Self {
            object_index,
            object_serial_number,
        }
    }

    /// Whether this can never resolve, whatever the registry holds
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.object_serial_number == 0 || self.object_index < 0
    }
}

impl Default for FWeakObjectPtr {
    fn default() -> Self {
        Self::NULL
    }
}
