//! Content-addressed blob storage for stowage.
//!
//! This crate implements a hash-keyed blob store. Every distinct file
//! content submitted to the system is stored exactly once, as an immutable
//! blob identified by its SHA-256 hash.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`FsBlobStore`] -- one file per blob, named by the hash's hex string
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content-addressing guarantees this).
//! 2. `put` hashes the stream while counting bytes, then places the blob in
//!    a single atomic step; a reader of the final location never observes a
//!    partially written blob.
//! 3. Puts of distinct contents are independent and may run in parallel;
//!    concurrent puts of the same content are safe and store one blob.
//! 4. Existing blobs are never overwritten.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::{BlobStore, PutOutcome};
