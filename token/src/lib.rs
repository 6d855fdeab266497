//! Token collaborator for the governance engine.
//!
//! The engine never implements a token standard. It consumes balances,
//! allowances and transfers through [`TokenLedger`]; the hosting environment
//! plugs in whatever ledger actually holds the governance tokens.
//!
//! [`LocalLedger`] is a complete in-process implementation (balances,
//! allowances, minting, a governance-token factory) used by the operator
//! CLI and by tests.

pub mod error;
pub mod factory;
pub mod ledger;
pub mod local;

pub use error::TokenError;
pub use factory::{TokenFactory, TokenMetadata};
pub use ledger::TokenLedger;
pub use local::LocalLedger;
