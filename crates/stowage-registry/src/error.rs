use stowage_types::BundleId;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No bundle exists with the requested id.
    #[error("bundle not found: {0}")]
    NotFound(BundleId),

    /// The persisted snapshot does not match the expected schema.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Writing the snapshot failed; the triggering create was rolled back.
    #[error("snapshot persistence failed: {0}")]
    Persistence(std::io::Error),

    /// I/O error reading the snapshot at startup.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
