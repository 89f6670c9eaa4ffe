//! unrealsdk - typed access to a live, host-owned reflection object graph
//!
//! The host process owns every object; this crate only mirrors its memory
//! layouts and forwards calls to host routines through a bound [`Hook`].
//!
//! # Layout
//! - [`flavour`]: the closed set of host layouts and the one this build mirrors
//! - [`unreal`]: accessor traits, generic templates, registry view, host structs
//! - [`game`]: per-flavour descriptors and the hook seam
//! - [`gate`]: one-time initialization
//! - [`sdk`] / [`ffi`]: Rust and C call surfaces
//!
//! [`Hook`]: game::Hook

pub mod config;
pub mod error;
pub mod ffi;
pub mod flavour;
pub mod game;
pub mod gate;
pub mod logging;
pub mod sdk;
pub mod unreal;
pub mod version;

pub use error::{Result, SdkError};
pub use flavour::{Active, Flavour, FlavourKind, ACTIVE};
pub use game::{Hook, HookFactory};
pub use sdk::{init, is_console_ready, is_initialized};
pub use unreal::ActiveGObjects;
