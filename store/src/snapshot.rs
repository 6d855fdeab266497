//! Whole-state snapshot persistence.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Leading bytes of every snapshot blob.
const SNAPSHOT_MAGIC: &[u8; 4] = b"CVT1";

/// Backend that stores one opaque snapshot blob.
pub trait SnapshotStore {
    /// Load the last saved snapshot, `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the stored snapshot. Either the whole blob is stored or the
    /// previous one is kept.
    fn save(&self, data: &[u8]) -> Result<(), StoreError>;
}

/// Serialize a value into a tagged bincode blob.
pub fn encode_snapshot<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    let body = bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut out = Vec::with_capacity(SNAPSHOT_MAGIC.len() + body.len());
    out.extend_from_slice(SNAPSHOT_MAGIC);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a blob produced by [`encode_snapshot`].
pub fn decode_snapshot<T: DeserializeOwned>(data: &[u8]) -> Result<T, StoreError> {
    let body = data
        .strip_prefix(SNAPSHOT_MAGIC.as_slice())
        .ok_or_else(|| StoreError::Corruption("missing snapshot header".into()))?;
    bincode::deserialize(body).map_err(|e| StoreError::Corruption(e.to_string()))
}

/// Snapshot stored in a single file, replaced atomically via rename.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, data: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "snapshot saved");
        Ok(())
    }
}
