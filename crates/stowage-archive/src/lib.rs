//! Archive assembly for stowage.
//!
//! Reconstructs a bundle as a single gzip-compressed tar archive by
//! streaming the referenced blobs out of a [`stowage_store::BlobStore`] in
//! bundle order. Entry names are the original submitted file names,
//! unsanitized; entry sizes are the recorded logical sizes.
//!
//! The build is all-or-nothing: a missing blob or a size disagreement
//! between the registry and the store aborts the build, so a caller never
//! receives a partial archive presented as complete.

pub mod builder;
pub mod error;

pub use builder::{build, build_into};
pub use error::{ArchiveError, ArchiveResult};
