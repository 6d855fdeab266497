//! Identity registry.
//!
//! Every wallet that takes part in governance is registered once and gets a
//! dense [`UserId`](civitas_types::UserId). All downstream bookkeeping
//! (membership, votes) keys on that id, never on the raw wallet.

pub mod error;
pub mod registry;
pub mod user;

pub use error::IdentityError;
pub use registry::IdentityRegistry;
pub use user::{User, UserProfile};
