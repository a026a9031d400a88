//! Snapshot serialization for the bundle registry.
//!
//! The snapshot is a single JSON object mapping bundle id to a record of
//! creation timestamp and ordered file references. The field names
//! (`createdAt`, `fileMetadataList`, `hash`, `name`, `size`) reproduce the
//! persisted layout of earlier deployments bit-for-bit, so existing data
//! directories load unchanged.
//!
//! Ids are emitted in sorted order so that `save` is deterministic: the
//! same registry always serializes to the same bytes.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stowage_types::{Bundle, BundleId, FileRef};

use crate::error::{RegistryError, RegistryResult};

/// On-disk form of one bundle entry.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "fileMetadataList")]
    files: Vec<FileRef>,
}

/// Serialize the full registry table to snapshot bytes.
///
/// The whole registry is always written as a unit, never incrementally:
/// referenced blobs are content-addressed and survive across snapshots, so
/// the snapshot alone captures all registry state.
pub fn save(bundles: &HashMap<BundleId, Bundle>) -> RegistryResult<Vec<u8>> {
    let records: BTreeMap<&str, SnapshotRecord> = bundles
        .values()
        .map(|bundle| {
            (
                bundle.id.as_str(),
                SnapshotRecord {
                    created_at: bundle.created_at,
                    files: bundle.files.clone(),
                },
            )
        })
        .collect();

    serde_json::to_vec(&records)
        .map_err(|e| RegistryError::CorruptSnapshot(format!("encode failed: {e}")))
}

/// Parse snapshot bytes back into the registry table.
///
/// An empty (or whitespace-only) snapshot is an empty registry, not an
/// error. Any structural mismatch -- missing fields, malformed timestamps,
/// non-numeric sizes -- surfaces as [`RegistryError::CorruptSnapshot`].
pub fn load(bytes: &[u8]) -> RegistryResult<HashMap<BundleId, Bundle>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| RegistryError::CorruptSnapshot(format!("not valid UTF-8: {e}")))?;
    if text.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let records: BTreeMap<String, SnapshotRecord> =
        serde_json::from_str(text).map_err(|e| RegistryError::CorruptSnapshot(e.to_string()))?;

    Ok(records
        .into_iter()
        .map(|(id, record)| {
            let id = BundleId::from_string(id);
            let bundle = Bundle {
                id: id.clone(),
                files: record.files,
                created_at: record.created_at,
            };
            (id, bundle)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stowage_types::BlobHash;

    fn bundle(id: &str, files: Vec<FileRef>) -> Bundle {
        Bundle {
            id: BundleId::from_string(id),
            files,
            created_at: Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789),
        }
    }

    fn table(bundles: Vec<Bundle>) -> HashMap<BundleId, Bundle> {
        bundles.into_iter().map(|b| (b.id.clone(), b)).collect()
    }

    #[test]
    fn roundtrip_empty_registry() {
        let empty = HashMap::new();
        let bytes = save(&empty).unwrap();
        assert_eq!(load(&bytes).unwrap(), empty);
    }

    #[test]
    fn roundtrip_preserves_every_field() {
        let registry = table(vec![
            bundle(
                "b1",
                vec![
                    FileRef::new(BlobHash::of(b"one"), "a.txt", 3),
                    FileRef::new(BlobHash::of(b"two"), "b.txt", 3),
                ],
            ),
            bundle("b2", vec![]),
        ]);
        let restored = load(&save(&registry).unwrap()).unwrap();
        assert_eq!(restored, registry);
    }

    #[test]
    fn roundtrip_non_ascii_names_and_extreme_sizes() {
        let registry = table(vec![bundle(
            "unicode",
            vec![
                FileRef::new(BlobHash::of(b"a"), "ファイル名.dat", 0),
                FileRef::new(BlobHash::of(b"b"), "größe.bin", 5_000_000_000),
            ],
        )]);
        let restored = load(&save(&registry).unwrap()).unwrap();
        assert_eq!(restored, registry);
    }

    #[test]
    fn roundtrip_preserves_file_order() {
        let files: Vec<FileRef> = (0..20)
            .map(|i| FileRef::new(BlobHash::of(format!("{i}").as_bytes()), format!("f{i}"), i))
            .collect();
        let registry = table(vec![bundle("ordered", files.clone())]);
        let restored = load(&save(&registry).unwrap()).unwrap();
        assert_eq!(restored[&BundleId::from("ordered")].files, files);
    }

    #[test]
    fn save_is_deterministic() {
        let registry = table(vec![
            bundle("zeta", vec![FileRef::new(BlobHash::of(b"z"), "z", 1)]),
            bundle("alpha", vec![FileRef::new(BlobHash::of(b"a"), "a", 1)]),
        ]);
        assert_eq!(save(&registry).unwrap(), save(&registry).unwrap());
        // Sorted id order, independent of HashMap iteration order.
        let text = String::from_utf8(save(&registry).unwrap()).unwrap();
        assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
    }

    #[test]
    fn snapshot_uses_compatible_field_names() {
        let registry = table(vec![bundle(
            "compat",
            vec![FileRef::new(BlobHash::of(b"x"), "x.txt", 1)],
        )]);
        let text = String::from_utf8(save(&registry).unwrap()).unwrap();
        assert!(text.contains("\"createdAt\""));
        assert!(text.contains("\"fileMetadataList\""));
        assert!(text.contains("\"hash\""));
        assert!(text.contains("\"name\""));
        assert!(text.contains("\"size\""));
    }

    #[test]
    fn load_accepts_legacy_snapshot_text() {
        let text = r#"{"abc123def456":{"createdAt":"2023-11-02T18:45:12.339227Z","fileMetadataList":[{"hash":"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824","name":"hello.txt","size":5}]}}"#;
        let registry = load(text.as_bytes()).unwrap();
        assert_eq!(registry.len(), 1);
        let bundle = &registry[&BundleId::from("abc123def456")];
        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.files[0].name, "hello.txt");
        assert_eq!(bundle.files[0].size, 5);
        assert_eq!(bundle.files[0].hash, BlobHash::of(b"hello"));
    }

    #[test]
    fn empty_snapshot_is_empty_registry() {
        assert!(load(b"").unwrap().is_empty());
        assert!(load(b"  \n ").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let err = load(b"{not json").unwrap_err();
        assert!(matches!(err, RegistryError::CorruptSnapshot(_)));
    }

    #[test]
    fn missing_field_is_corrupt() {
        let text = r#"{"b1":{"createdAt":"2023-11-02T18:45:12Z"}}"#;
        let err = load(text.as_bytes()).unwrap_err();
        assert!(matches!(err, RegistryError::CorruptSnapshot(_)));
    }

    #[test]
    fn malformed_timestamp_is_corrupt() {
        let text = r#"{"b1":{"createdAt":"yesterday","fileMetadataList":[]}}"#;
        let err = load(text.as_bytes()).unwrap_err();
        assert!(matches!(err, RegistryError::CorruptSnapshot(_)));
    }

    #[test]
    fn non_numeric_size_is_corrupt() {
        let text = r#"{"b1":{"createdAt":"2023-11-02T18:45:12Z","fileMetadataList":[{"hash":"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824","name":"x","size":"five"}]}}"#;
        let err = load(text.as_bytes()).unwrap_err();
        assert!(matches!(err, RegistryError::CorruptSnapshot(_)));
    }
}
