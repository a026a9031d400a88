use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use stowage_store::{BlobStore, StoreError};
use stowage_types::{Bundle, FileRef};
use tar::{Builder, Header};

use crate::error::{ArchiveError, ArchiveResult};

/// Stream a bundle's blobs into `writer` as a gzip-compressed tar archive.
///
/// Entries appear in bundle order, named by each file's original name with
/// the recorded size. Blobs are streamed one at a time, so peak memory is
/// bounded by the copy buffer, not the bundle size. Returns the writer once
/// the gzip stream is fully flushed.
///
/// An empty bundle produces a structurally valid, empty archive.
pub fn build_into<W: Write>(
    bundle: &Bundle,
    store: &dyn BlobStore,
    writer: W,
) -> ArchiveResult<W> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut tar = Builder::new(encoder);
    let mtime = bundle.created_at.timestamp().max(0) as u64;

    for file in &bundle.files {
        append_entry(&mut tar, store, file, mtime)?;
    }

    let encoder = tar.into_inner()?;
    let writer = encoder.finish()?;
    tracing::debug!(bundle = %bundle.id, entries = bundle.files.len(), "archive built");
    Ok(writer)
}

/// Build a bundle's archive fully into memory.
pub fn build(bundle: &Bundle, store: &dyn BlobStore) -> ArchiveResult<Vec<u8>> {
    build_into(bundle, store, Vec::new())
}

fn append_entry<W: Write>(
    tar: &mut Builder<W>,
    store: &dyn BlobStore,
    file: &FileRef,
    mtime: u64,
) -> ArchiveResult<()> {
    // The declared entry size must equal the bytes actually streamed.
    // Verify against the stored blob before writing the header: a mismatch
    // is a consistency fault, not something to pad or truncate around.
    let actual = match store.len_of(&file.hash) {
        Ok(len) => len,
        Err(StoreError::NotFound(hash)) => {
            return Err(ArchiveError::MissingBlob {
                hash,
                name: file.name.clone(),
            })
        }
        Err(e) => return Err(ArchiveError::Store(e)),
    };
    if actual != file.size {
        return Err(ArchiveError::SizeMismatch {
            name: file.name.clone(),
            recorded: file.size,
            actual,
        });
    }

    let reader = match store.get(&file.hash) {
        Ok(reader) => reader,
        Err(StoreError::NotFound(hash)) => {
            return Err(ArchiveError::MissingBlob {
                hash,
                name: file.name.clone(),
            })
        }
        Err(e) => return Err(ArchiveError::Store(e)),
    };

    let mut header = Header::new_gnu();
    header.set_size(file.size);
    header.set_mode(0o644);
    header.set_mtime(mtime);

    // append_data sets the path (emitting a GNU long-name extension when
    // the name exceeds the classic header field) and the checksum.
    tar.append_data(&mut header, &file.name, reader)?;
    Ok(())
}
