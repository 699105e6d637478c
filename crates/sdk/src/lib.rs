//! gostrike SDK - foreign ABI type definitions
//!
//! This crate defines the C-compatible types that cross the boundary between
//! the native host (the CS2 dedicated server plugin that hooks the game) and
//! the managed runtime built on top of this workspace. It has no dependencies
//! so it compiles immediately and in parallel with everything that depends on
//! it.
//!
//! Nothing in here dereferences a native pointer: entities and events are
//! carried as opaque integer handles and are only ever resolved by handing
//! those handles back to the host through the [`callbacks`] table.
//!
//! # Modules
//!
//! - [`abi`] - boundary status codes and the ABI version constant
//! - [`callbacks`] - the function-pointer banks the host registers at init
//! - [`types`] - plain-old-data types shared across the boundary

pub mod abi;
pub mod callbacks;
pub mod types;

pub use abi::{BoundaryStatus, ABI_VERSION};
pub use callbacks::{CallbackTable, CommBank, CoreBank, EntityBank, GameplayBank};
pub use types::{
    ChatDestination, DamageEventRaw, EventResult, PlayerInfoRaw, SchemaValueRaw, SchemaValueTag,
};
