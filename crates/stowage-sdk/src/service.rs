use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use stowage_archive as archive;
use stowage_registry::BundleRegistry;
use stowage_store::{BlobStore, FsBlobStore};
use stowage_types::{Bundle, BundleId, BundleSummary, FileRef};

use crate::error::ServiceResult;

const BLOB_DIR: &str = "files";
const SNAPSHOT_FILE: &str = "bundles.json";

/// The bundle store facade.
///
/// Owns the content store and the registry under one storage root:
///
/// ```text
/// <root>/files/<hex hash>   one blob per distinct content
/// <root>/bundles.json       the registry snapshot
/// ```
///
/// All methods take `&self`; the service is safe to share across request
/// handlers behind an `Arc`.
pub struct BundleService {
    root: PathBuf,
    store: FsBlobStore,
    registry: BundleRegistry,
}

impl BundleService {
    /// Open a service over `root`, creating the blob directory and the
    /// snapshot's parent directory, then loading any existing snapshot.
    pub fn open(root: impl Into<PathBuf>) -> ServiceResult<Self> {
        let root = root.into();
        let store = FsBlobStore::open(root.join(BLOB_DIR))?;
        let registry = BundleRegistry::open(root.join(SNAPSHOT_FILE))?;
        tracing::info!(root = %root.display(), bundles = registry.len(), "bundle service opened");
        Ok(Self {
            root,
            store,
            registry,
        })
    }

    /// The storage root this service operates on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The underlying content store.
    pub fn store(&self) -> &FsBlobStore {
        &self.store
    }

    /// The underlying registry.
    pub fn registry(&self) -> &BundleRegistry {
        &self.registry
    }

    /// Ingest a set of named content streams and register them as a bundle.
    ///
    /// Each stream is hashed and deduplicated through the content store,
    /// then the resulting file references are recorded in submission order.
    /// If registration fails, blobs already written stay in the store: they
    /// are content-addressed, harmless, and reusable by a later create.
    pub fn create_bundle<R: Read>(
        &self,
        inputs: impl IntoIterator<Item = (String, R)>,
    ) -> ServiceResult<BundleId> {
        let mut files = Vec::new();
        for (name, mut reader) in inputs {
            let outcome = self.store.put(&mut reader)?;
            tracing::debug!(
                name = %name,
                hash = %outcome.hash.short_hex(),
                size = outcome.size,
                deduplicated = !outcome.newly_written,
                "file ingested"
            );
            files.push(FileRef::new(outcome.hash, name, outcome.size));
        }
        Ok(self.registry.create(files)?)
    }

    /// Summaries of all bundles, ordered by creation time.
    pub fn list_bundles(&self) -> Vec<BundleSummary> {
        self.registry.list()
    }

    /// Full bundle record by id.
    pub fn get_bundle(&self, id: &BundleId) -> ServiceResult<Bundle> {
        Ok(self.registry.get(id)?)
    }

    /// Reconstruct a bundle as a gzip-compressed tar archive in memory.
    pub fn download_bundle(&self, id: &BundleId) -> ServiceResult<Vec<u8>> {
        let bundle = self.registry.get(id)?;
        Ok(archive::build(&bundle, &self.store)?)
    }

    /// Stream a bundle's archive directly into `writer`.
    pub fn download_bundle_into<W: Write>(&self, id: &BundleId, writer: W) -> ServiceResult<W> {
        let bundle = self.registry.get(id)?;
        Ok(archive::build_into(&bundle, &self.store, writer)?)
    }
}

impl std::fmt::Debug for BundleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleService")
            .field("root", &self.root)
            .field("bundles", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Cursor;
    use stowage_types::BlobHash;
    use tar::Archive;

    fn service() -> (tempfile::TempDir, BundleService) {
        let dir = tempfile::tempdir().unwrap();
        let svc = BundleService::open(dir.path().join("data")).unwrap();
        (dir, svc)
    }

    fn inputs(files: &[(&str, &[u8])]) -> Vec<(String, Cursor<Vec<u8>>)> {
        files
            .iter()
            .map(|(name, content)| (name.to_string(), Cursor::new(content.to_vec())))
            .collect()
    }

    fn extract(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut entries = Vec::new();
        let mut tar = Archive::new(GzDecoder::new(Cursor::new(archive)));
        for entry in tar.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            entries.push((name, data));
        }
        entries
    }

    #[test]
    fn identical_content_under_two_names_stores_one_blob() {
        let (_dir, svc) = service();
        let id = svc
            .create_bundle(inputs(&[("a.txt", b"hello"), ("b.txt", b"hello")]))
            .unwrap();

        // Exactly one blob, at the SHA-256 of "hello".
        let hello = BlobHash::of(b"hello");
        assert_eq!(
            hello.to_hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        let blob_files: Vec<_> = fs::read_dir(svc.store().root()).unwrap().collect();
        assert_eq!(blob_files.len(), 1);
        assert!(svc.store().exists(&hello).unwrap());

        // Two file references, same hash, distinct names.
        let bundle = svc.get_bundle(&id).unwrap();
        assert_eq!(bundle.files.len(), 2);
        assert!(bundle.files.iter().all(|f| f.hash == hello && f.size == 5));
        assert_eq!(bundle.files[0].name, "a.txt");
        assert_eq!(bundle.files[1].name, "b.txt");

        // Download yields both entries, each containing "hello".
        let entries = extract(&svc.download_bundle(&id).unwrap());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("a.txt".into(), b"hello".to_vec()));
        assert_eq!(entries[1], ("b.txt".into(), b"hello".to_vec()));
    }

    #[test]
    fn download_reproduces_exact_bytes_and_hashes() {
        let (_dir, svc) = service();
        let payloads: Vec<(&str, &[u8])> = vec![
            ("binary.dat", &[0u8, 255, 7, 42][..]),
            ("text.txt", b"line one\nline two\n"),
        ];
        let id = svc.create_bundle(inputs(&payloads)).unwrap();
        let bundle = svc.get_bundle(&id).unwrap();

        for (i, (name, data)) in extract(&svc.download_bundle(&id).unwrap())
            .into_iter()
            .enumerate()
        {
            assert_eq!(name, payloads[i].0);
            assert_eq!(data, payloads[i].1);
            assert_eq!(BlobHash::of(&data), bundle.files[i].hash);
        }
    }

    #[test]
    fn dedup_spans_bundles() {
        let (_dir, svc) = service();
        svc.create_bundle(inputs(&[("one.txt", b"shared payload")]))
            .unwrap();
        svc.create_bundle(inputs(&[("two.txt", b"shared payload")]))
            .unwrap();

        let blob_files: Vec<_> = fs::read_dir(svc.store().root()).unwrap().collect();
        assert_eq!(blob_files.len(), 1);
        assert_eq!(svc.list_bundles().len(), 2);
    }

    #[test]
    fn list_reports_logical_totals() {
        let (_dir, svc) = service();
        let id = svc
            .create_bundle(inputs(&[("a", b"12345"), ("b", b"12345")]))
            .unwrap();

        let summaries = svc.list_bundles();
        let summary = summaries.iter().find(|s| s.id == id).unwrap();
        assert_eq!(summary.file_count, 2);
        // Logical sizes sum per reference, not per stored blob.
        assert_eq!(summary.total_size_bytes, 10);
    }

    #[test]
    fn unknown_bundle_download_is_not_found() {
        let (_dir, svc) = service();
        let err = svc.download_bundle(&BundleId::from("no-such-id")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_blob_is_not_a_not_found() {
        let (_dir, svc) = service();
        let id = svc.create_bundle(inputs(&[("f.txt", b"doomed")])).unwrap();

        // Delete the blob out from under the registry.
        fs::remove_file(svc.store().blob_path(&BlobHash::of(b"doomed"))).unwrap();

        let err = svc.download_bundle(&id).unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(
            err,
            crate::ServiceError::Archive(stowage_archive::ArchiveError::MissingBlob { .. })
        ));
    }

    #[test]
    fn empty_bundle_downloads_as_empty_archive() {
        let (_dir, svc) = service();
        let id = svc
            .create_bundle(Vec::<(String, Cursor<Vec<u8>>)>::new())
            .unwrap();
        let entries = extract(&svc.download_bundle(&id).unwrap());
        assert!(entries.is_empty());
    }

    #[test]
    fn bundles_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");

        let id = {
            let svc = BundleService::open(&root).unwrap();
            svc.create_bundle(inputs(&[("persist.txt", b"durable")]))
                .unwrap()
        };

        let svc = BundleService::open(&root).unwrap();
        let entries = extract(&svc.download_bundle(&id).unwrap());
        assert_eq!(entries, vec![("persist.txt".into(), b"durable".to_vec())]);
    }

    #[test]
    fn download_into_streams_to_writer() {
        let (_dir, svc) = service();
        let id = svc.create_bundle(inputs(&[("s.txt", b"streamed")])).unwrap();
        let out = svc.download_bundle_into(&id, Vec::new()).unwrap();
        assert_eq!(
            extract(&out),
            vec![("s.txt".into(), b"streamed".to_vec())]
        );
    }
}
