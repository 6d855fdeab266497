//! Pre-built [`tracing::Span`] constructors for engine operations.
//!
//! Using consistent span names and field sets makes it easy to filter and
//! correlate every log line emitted while one operation runs.

use tracing::{debug_span, info_span, Span};

/// Span covering one mutating engine operation.
pub fn operation_span(op: &'static str, entity: &str) -> Span {
    info_span!("op", op = op, entity = %entity)
}

/// Span covering a read-only query.
pub fn query_span(query: &'static str, entity: &str) -> Span {
    debug_span!("query", query = query, entity = %entity)
}

/// Span covering an escrow movement through the token ledger.
pub fn escrow_span(direction: &'static str, token: &str, amount: u128) -> Span {
    debug_span!("escrow", direction = direction, token = %token, amount = amount)
}
