use thiserror::Error;

/// Errors surfaced by the bundle service facade.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store error: {0}")]
    Store(#[from] stowage_store::StoreError),

    #[error("registry error: {0}")]
    Registry(#[from] stowage_registry::RegistryError),

    #[error("archive error: {0}")]
    Archive(#[from] stowage_archive::ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// `true` for "the requested bundle does not exist".
    ///
    /// Transport layers map this to a not-found response. A missing blob
    /// behind a known bundle is deliberately NOT a not-found: that is a
    /// consistency fault and maps to a server error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::Registry(stowage_registry::RegistryError::NotFound(_))
        )
    }
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
