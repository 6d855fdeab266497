//! Fundamental types for Civitas.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! wallet addresses, dense entity ids, token amounts and references, timestamps,
//! the clock abstraction, and the error categories used by the engine.

pub mod address;
pub mod amount;
pub mod error;
pub mod id;
pub mod time;
pub mod token;

pub use address::WalletAddress;
pub use amount::TokenAmount;
pub use error::{CivitasError, ErrorCategory};
pub use id::{DaoId, ProposalId, UserId};
pub use time::{Clock, SystemClock, Timestamp};
pub use token::TokenRef;
