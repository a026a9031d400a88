use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::BlobHash;

/// Unique identifier for a bundle.
///
/// Generated once at creation time from a random UUID v4, rendered as its
/// 32-character simple hex form. The full 128 bits are kept: truncating
/// would shorten the token but raise the collision probability for no
/// operational gain.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleId(String);

impl BundleId {
    /// Generate a fresh random bundle id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing id string (e.g. read back from a snapshot).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BundleId({})", self.0)
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BundleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A record binding an original file name and size to a blob hash.
///
/// Immutable once created. The referenced blob may be shared by many
/// `FileRef`s across many bundles; the name need not be unique even within
/// a single bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Content hash of the file's bytes.
    pub hash: BlobHash,
    /// The name under which the content was submitted.
    pub name: String,
    /// Logical size of the file in bytes.
    pub size: u64,
}

impl FileRef {
    /// Create a new file reference.
    pub fn new(hash: BlobHash, name: impl Into<String>, size: u64) -> Self {
        Self {
            hash,
            name: name.into(),
            size,
        }
    }
}

/// A named, ordered collection of file references created together.
///
/// Bundles are immutable after creation: there are no update or delete
/// operations. File order is submission order and is preserved through
/// persistence and archive assembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Unique bundle identifier.
    pub id: BundleId,
    /// Ordered file references, in submission order.
    pub files: Vec<FileRef>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Bundle {
    /// Create a bundle record with the current time.
    pub fn new(id: BundleId, files: Vec<FileRef>) -> Self {
        Self {
            id,
            files,
            created_at: Utc::now(),
        }
    }

    /// Sum of the logical file sizes (not deduplicated storage bytes).
    pub fn total_size_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Listing view of this bundle.
    pub fn summary(&self) -> BundleSummary {
        BundleSummary {
            id: self.id.clone(),
            file_count: self.files.len(),
            total_size_bytes: self.total_size_bytes(),
            created_at: self.created_at,
        }
    }
}

/// Listing view of a bundle: counts and totals, no file details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSummary {
    pub id: BundleId,
    pub file_count: usize,
    pub total_size_bytes: u64,
    pub created_at: DateTime<Utc>,
}
