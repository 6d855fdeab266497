//! Nullable infrastructure for deterministic testing.
//!
//! The engine reaches the outside world through two traits: the
//! [`Clock`](civitas_types::Clock) and the
//! [`SnapshotStore`](civitas_store::SnapshotStore). This crate provides
//! test-friendly implementations of both that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullSnapshotStore;
