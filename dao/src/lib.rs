//! DAO registry.
//!
//! A DAO is a membership group with a governance token. Members join either
//! by holding at least the joining threshold of that token (public DAOs
//! only) or by being added by an admin, which bypasses the balance check.
//! Membership only ever grows.

pub mod dao;
pub mod error;
pub mod registry;

pub use dao::{Dao, DaoDraft, Membership};
pub use error::DaoError;
pub use registry::DaoRegistry;
