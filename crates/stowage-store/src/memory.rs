use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::RwLock;

use sha2::{Digest, Sha256};
use stowage_types::BlobHash;

use crate::error::{StoreError, StoreResult};
use crate::traits::{BlobStore, PutOutcome};

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock` for safe concurrent access. Bytes are cloned on read.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobHash, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs (deduplicated storage bytes).
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Remove all blobs from the store.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, reader: &mut dyn Read) -> StoreResult<PutOutcome> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = BlobHash::from_digest(hasher.finalize().into());
        let size = data.len() as u64;

        let mut map = self.blobs.write().expect("lock poisoned");
        // Idempotent: if already present, skip (content-addressing
        // guarantees the same hash always maps to the same bytes).
        let newly_written = if map.contains_key(&hash) {
            false
        } else {
            map.insert(hash, data);
            true
        };

        Ok(PutOutcome {
            hash,
            size,
            newly_written,
        })
    }

    fn get(&self, hash: &BlobHash) -> StoreResult<Box<dyn Read + Send>> {
        let map = self.blobs.read().expect("lock poisoned");
        match map.get(hash) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(StoreError::NotFound(*hash)),
        }
    }

    fn exists(&self, hash: &BlobHash) -> StoreResult<bool> {
        Ok(self.blobs.read().expect("lock poisoned").contains_key(hash))
    }

    fn len_of(&self, hash: &BlobHash) -> StoreResult<u64> {
        let map = self.blobs.read().expect("lock poisoned");
        match map.get(hash) {
            Some(data) => Ok(data.len() as u64),
            None => Err(StoreError::NotFound(*hash)),
        }
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
