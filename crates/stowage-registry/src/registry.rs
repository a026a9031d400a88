use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use stowage_types::{Bundle, BundleId, BundleSummary, FileRef};
use tempfile::NamedTempFile;

use crate::codec;
use crate::error::{RegistryError, RegistryResult};

/// In-memory bundle table with a durable snapshot mirror.
///
/// Every mutation runs under the write lock and persists the full snapshot
/// before returning, so the snapshot on disk always reflects exactly the
/// creates that were reported successful. Reads take the read lock and may
/// run concurrently with each other.
pub struct BundleRegistry {
    bundles: RwLock<HashMap<BundleId, Bundle>>,
    snapshot_path: PathBuf,
}

impl BundleRegistry {
    /// Open the registry backed by the snapshot at `snapshot_path`.
    ///
    /// Creates the parent directory if needed. A missing or empty snapshot
    /// is an empty registry; a malformed one is
    /// [`RegistryError::CorruptSnapshot`].
    pub fn open(snapshot_path: impl Into<PathBuf>) -> RegistryResult<Self> {
        let snapshot_path = snapshot_path.into();
        if let Some(parent) = snapshot_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bundles = match fs::read(&snapshot_path) {
            Ok(bytes) => codec::load(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(RegistryError::Io(e)),
        };
        tracing::debug!(
            path = %snapshot_path.display(),
            count = bundles.len(),
            "registry loaded"
        );

        Ok(Self {
            bundles: RwLock::new(bundles),
            snapshot_path,
        })
    }

    /// The snapshot file location.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Create a bundle from an ordered list of file references.
    ///
    /// The insert and the snapshot persist form one critical section: a
    /// concurrent create cannot interleave, and each written snapshot
    /// reflects the cumulative effect of all prior creates. On persistence
    /// failure the insert is rolled back and the error surfaced.
    pub fn create(&self, files: Vec<FileRef>) -> RegistryResult<BundleId> {
        let id = BundleId::generate();
        let bundle = Bundle::new(id.clone(), files);

        let mut map = self.bundles.write().expect("lock poisoned");
        map.insert(id.clone(), bundle);
        if let Err(e) = self.persist(&map) {
            map.remove(&id);
            return Err(e);
        }
        tracing::info!(bundle = %id, count = map[&id].files.len(), "bundle created");
        Ok(id)
    }

    /// Look up a bundle by id. Never mutates state.
    pub fn get(&self, id: &BundleId) -> RegistryResult<Bundle> {
        let map = self.bundles.read().expect("lock poisoned");
        map.get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Snapshot-at-call-time listing, ordered by creation time ascending.
    pub fn list(&self) -> Vec<BundleSummary> {
        let map = self.bundles.read().expect("lock poisoned");
        let mut summaries: Vec<BundleSummary> = map.values().map(Bundle::summary).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        summaries
    }

    /// Number of bundles registered.
    pub fn len(&self) -> usize {
        self.bundles.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no bundles exist.
    pub fn is_empty(&self) -> bool {
        self.bundles.read().expect("lock poisoned").is_empty()
    }

    /// Write the full snapshot atomically: serialize, write to a temp file
    /// in the snapshot's directory, then rename over the old snapshot. A
    /// crash mid-write cannot leave a truncated or corrupt snapshot.
    fn persist(&self, map: &HashMap<BundleId, Bundle>) -> RegistryResult<()> {
        let bytes = codec::save(map)?;

        let dir = self.snapshot_path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(RegistryError::Persistence)?;
        tmp.write_all(&bytes).map_err(RegistryError::Persistence)?;
        tmp.flush().map_err(RegistryError::Persistence)?;
        tmp.persist(&self.snapshot_path)
            .map_err(|e| RegistryError::Persistence(e.error))?;
        Ok(())
    }
}

impl std::fmt::Debug for BundleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleRegistry")
            .field("bundle_count", &self.len())
            .field("snapshot_path", &self.snapshot_path)
            .finish()
    }
}
