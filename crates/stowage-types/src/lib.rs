//! Foundation types for stowage.
//!
//! This crate provides the identity and structural types used throughout the
//! stowage system. Every other stowage crate depends on `stowage-types`.
//!
//! # Key Types
//!
//! - [`BlobHash`] — Content-addressed blob identifier (SHA-256 digest)
//! - [`BundleId`] — Unique identifier for a bundle, generated at creation
//! - [`FileRef`] — Binds an original file name and size to a blob hash
//! - [`Bundle`] — A named, ordered collection of file references
//! - [`BundleSummary`] — Listing view of a bundle (counts and totals)

pub mod bundle;
pub mod error;
pub mod hash;

pub use bundle::{Bundle, BundleId, BundleSummary, FileRef};
pub use error::TypeError;
pub use hash::BlobHash;
