//! Append-only arena with dense, 1-based ids.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Append-only collection handing out ids `1, 2, 3, …`.
///
/// Id `0` is never issued; it stays available as the "absent" sentinel.
/// The record for id `n` lives at index `n - 1`, so the counter is always
/// `records.len()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena<T> {
    records: Vec<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// The id the next insert will receive.
    pub fn next_id(&self) -> Result<u64, StoreError> {
        u64::try_from(self.records.len())
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or(StoreError::Exhausted)
    }

    /// Append a record built from its own id.
    ///
    /// The builder sees the id before the record is stored, so records can
    /// carry their id without a second pass.
    pub fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> Result<u64, StoreError> {
        let id = self.next_id()?;
        self.records.push(build(id));
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.records.get(index)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.records.get_mut(index)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// Number of records ever inserted (the monotonic counter).
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate `(id, record)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (i as u64 + 1, record))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
