use std::io::Read;

use stowage_types::BlobHash;

use crate::error::StoreResult;

/// Result of a `put`: the computed identity of the submitted content.
///
/// Returned whether or not a new blob was written; `newly_written` reports
/// the dedup decision for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PutOutcome {
    /// SHA-256 hash of the submitted bytes.
    pub hash: BlobHash,
    /// Number of bytes consumed from the stream.
    pub size: u64,
    /// `true` if this put created the blob, `false` if it already existed.
    pub newly_written: bool,
}

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written. Content-addressing guarantees this:
///   the same bytes always produce the same hash.
/// - `put` is idempotent: re-submitting stored content is a no-op that
///   still returns the correct hash and size.
/// - A reader of a stored blob never observes a partial write, even when
///   the same content is being put concurrently.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlobStore: Send + Sync {
    /// Consume the stream fully, computing its SHA-256 hash and byte count,
    /// and store the bytes if no blob exists for that hash yet.
    fn put(&self, reader: &mut dyn Read) -> StoreResult<PutOutcome>;

    /// Open a readable stream over a stored blob's bytes.
    ///
    /// Returns [`StoreError::NotFound`] if no blob exists for the hash. A
    /// missing blob is a consistency violation when the hash came from the
    /// registry, and callers must surface it rather than skip the entry.
    fn get(&self, hash: &BlobHash) -> StoreResult<Box<dyn Read + Send>>;

    /// Check whether a blob exists for the given hash.
    fn exists(&self, hash: &BlobHash) -> StoreResult<bool>;

    /// The stored blob's length in bytes.
    ///
    /// Returns [`StoreError::NotFound`] if no blob exists for the hash.
    fn len_of(&self, hash: &BlobHash) -> StoreResult<u64>;
}
