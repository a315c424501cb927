use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid memory pool size {0}: must be a positive power of two")]
    InvalidPoolSize(usize),

    #[error("Invalid hash table size {0}: must be at least 2")]
    InvalidTableSize(usize),

    #[error("Stale handle: no allocated block of {length} bytes at offset {offset}")]
    StaleHandle { offset: usize, length: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
