//! Host name handles

use std::fmt;

/// Index into the host's name table plus an instance suffix
///
/// The string behind it lives in host memory; resolve it through
/// [`crate::sdk::fname_get_str`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FName {
    pub index: i32,
    pub number: i32,
}

impl FName {
    /// The host's `None` name
    pub const NONE: Self = Self { index: 0, number: 0 };

    #[inline]
    pub const fn new(index: i32, number: i32) -> Self {
        Self { index, number }
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        self.index == 0 && self.number == 0
    }
}

/// Borrowed view of a name table entry
///
/// Entries are stored either as narrow (latin-1) or wide (UTF-16) strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStr<'a> {
    Narrow(&'a [u8]),
    Wide(&'a [u16]),
}

impl NameStr<'_> {
    #[inline]
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::Wide(_))
    }

    /// Length in code units (not bytes)
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Narrow(s) => s.len(),
            Self::Wide(s) => s.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pointer to the first code unit
    pub fn as_ptr(&self) -> *const u8 {
        match self {
            Self::Narrow(s) => s.as_ptr(),
            Self::Wide(s) => s.as_ptr().cast(),
        }
    }
}

impl fmt::Display for NameStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Narrow entries are latin-1, which maps 1:1 onto the first 256 code points
            Self::Narrow(s) => s.iter().try_for_each(|&b| write!(f, "{}", char::from(b))),
            Self::Wide(s) => f.write_str(&String::from_utf16_lossy(s)),
        }
    }
}
