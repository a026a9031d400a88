use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use stowage_types::BlobHash;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use crate::traits::{BlobStore, PutOutcome};

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Filesystem-backed blob store: one file per blob, named by the hash's
/// lowercase hex string.
///
/// Writes stream into a temp file in the blob directory while the digest
/// and byte count accumulate, then atomically rename into the final
/// hash-addressed path. "Destination already exists" counts as a successful
/// dedup, so concurrent puts of the same content need no global lock and a
/// reader of the final path never sees a partial blob.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a blob store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The blob directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic location of the blob for a hash.
    pub fn blob_path(&self, hash: &BlobHash) -> PathBuf {
        self.root.join(hash.to_hex())
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, reader: &mut dyn Read) -> StoreResult<PutOutcome> {
        // Temp file lives in the blob directory so the final rename stays
        // on one filesystem and is atomic.
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        let mut hasher = Sha256::new();
        let mut size: u64 = 0;
        let mut buf = vec![0u8; COPY_BUF_SIZE];

        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            tmp.write_all(&buf[..n])?;
            size += n as u64;
        }
        tmp.flush()?;

        let hash = BlobHash::from_digest(hasher.finalize().into());
        let dest = self.blob_path(&hash);

        if dest.exists() {
            // Already deduplicated; the temp file is dropped and cleaned up.
            tracing::debug!(hash = %hash.short_hex(), size, "blob already present");
            return Ok(PutOutcome {
                hash,
                size,
                newly_written: false,
            });
        }

        match tmp.persist_noclobber(&dest) {
            Ok(_) => {
                tracing::debug!(hash = %hash.short_hex(), size, "blob written");
                Ok(PutOutcome {
                    hash,
                    size,
                    newly_written: true,
                })
            }
            // A concurrent put won the rename; ours is a successful dedup.
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(PutOutcome {
                hash,
                size,
                newly_written: false,
            }),
            Err(e) => Err(StoreError::Io(e.error)),
        }
    }

    fn get(&self, hash: &BlobHash) -> StoreResult<Box<dyn Read + Send>> {
        match File::open(self.blob_path(hash)) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(*hash)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn exists(&self, hash: &BlobHash) -> StoreResult<bool> {
        Ok(self.blob_path(hash).exists())
    }

    fn len_of(&self, hash: &BlobHash) -> StoreResult<u64> {
        match fs::metadata(self.blob_path(hash)) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(*hash)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

impl std::fmt::Debug for FsBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBlobStore")
            .field("root", &self.root)
            .finish()
    }
}
