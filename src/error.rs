//! Error taxonomy for the SDK
//!
//! Bind-time and initialization errors are fatal to the caller of `init`.
//! Bounds errors are recoverable. Lookups that miss are not errors at all:
//! they come back as `None` or a null pointer.

use crate::flavour::FlavourKind;

/// Result type used throughout the crate
pub type Result<T, E = SdkError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The hook was built for a different layout family than this binary
    #[error("hook targets the {hook} flavour but this build mirrors {build} layouts")]
    LayoutMismatch { hook: FlavourKind, build: FlavourKind },

    /// Hooking substrate or hook installation failed
    #[error("hook initialization failed: {0}")]
    Substrate(String),

    /// Config file could not be parsed
    #[error("failed to parse config {path}: {reason}")]
    Config { path: String, reason: String },

    /// Index past the live end of the object registry
    #[error("index {index} out of range for registry of size {size}")]
    OutOfRange { index: usize, size: usize },

    /// Host allocator returned null
    #[error("host allocator failed to provide {size} bytes")]
    AllocationFailed { size: usize },

    /// Accessor called before `init` published a hook
    #[error("unrealsdk has not been initialized")]
    NotInitialized,

    /// Operation the active flavour has no equivalent for
    #[error("{operation} is not supported on the {flavour} flavour")]
    Unsupported {
        operation: &'static str,
        flavour: FlavourKind,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SdkError {
    pub(crate) fn substrate(reason: impl Into<String>) -> Self {
        Self::Substrate(reason.into())
    }

    /// Whether this error must stop startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::LayoutMismatch { .. } | Self::Substrate(_) | Self::Config { .. }
        )
    }
}
