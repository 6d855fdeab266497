//! In-memory snapshot store for tests.

use civitas_store::{SnapshotStore, StoreError};
use std::cell::{Cell, RefCell};

/// Keeps the last saved snapshot in memory.
///
/// Can be told to fail writes, to exercise save error paths.
#[derive(Debug, Default)]
pub struct NullSnapshotStore {
    blob: RefCell<Option<Vec<u8>>>,
    fail_writes: Cell<bool>,
    saves: Cell<u64>,
}

impl NullSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `save` fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.saves.get()
    }

    /// Raw bytes of the last snapshot.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.blob.borrow().clone()
    }
}

impl SnapshotStore for NullSnapshotStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blob.borrow().clone())
    }

    fn save(&self, data: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Io(std::io::Error::other(
                "null store write failure",
            )));
        }
        self.blob.replace(Some(data.to_vec()));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
