//! Plain host structs shared by every flavour

mod fname;
mod gobjects;
mod opaque;
mod tarray;
mod weak;

pub use fname::{FName, NameStr};
pub use gobjects::{FChunkedFixedUObjectArray, FUObjectArray, FUObjectItem};
pub use opaque::{FFrame, FLazyObjectPtr, FSoftObjectPtr, FText};
pub use tarray::{FString, TArray, TPair, UnmanagedFString};
pub use weak::FWeakObjectPtr;
