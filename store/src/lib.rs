//! Storage building blocks for Civitas.
//!
//! - [`Arena`]: a monotonic counter plus a dense id → record mapping. Every
//!   collection in the engine (users, DAOs, proposals) is an arena, so ids
//!   are never reused and records are never deleted.
//! - [`SnapshotStore`]: persistence of a whole serialized state blob. The
//!   engine depends only on the trait; [`FileSnapshotStore`] is the on-disk
//!   backend, the nullables crate provides an in-memory one for tests.

pub mod arena;
pub mod error;
pub mod snapshot;

pub use arena::Arena;
pub use error::StoreError;
pub use snapshot::{decode_snapshot, encode_snapshot, FileSnapshotStore, SnapshotStore};
