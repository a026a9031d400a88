//! High-level API for stowage.
//!
//! Provides [`BundleService`], the facade that transport layers (HTTP
//! server, CLI) call: bundle creation, listing, and archive download over
//! a single storage root on disk.

pub mod error;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::BundleService;

// Re-export key types
pub use stowage_types::{BlobHash, Bundle, BundleId, BundleSummary, FileRef};
