use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("arena id space exhausted")]
    Exhausted,

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot is corrupted: {0}")]
    Corruption(String),
}
