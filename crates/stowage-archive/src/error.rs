use stowage_types::BlobHash;

/// Errors from archive assembly.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The registry references a hash with no corresponding blob.
    #[error("missing blob {hash} for entry {name:?}")]
    MissingBlob { hash: BlobHash, name: String },

    /// The stored blob's length differs from the recorded file size.
    #[error("size mismatch for entry {name:?}: recorded {recorded} bytes, blob is {actual}")]
    SizeMismatch {
        name: String,
        recorded: u64,
        actual: u64,
    },

    /// Blob read failure from the content store.
    #[error("store error: {0}")]
    Store(stowage_store::StoreError),

    /// I/O error writing the archive stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;
