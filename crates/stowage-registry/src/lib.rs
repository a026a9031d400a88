//! Bundle registry for stowage.
//!
//! The registry is the single source of truth for which named files belong
//! to which bundle. It holds every bundle in memory and mirrors the whole
//! table to one JSON snapshot file after every successful mutation.
//!
//! # Consistency Model
//!
//! - `create` inserts into the in-memory map and persists the full snapshot
//!   before reporting success. If persistence fails, the insert is rolled
//!   back: memory never claims a bundle that was not durably recorded.
//! - All mutations serialize through one write lock; `list` and `get` take
//!   the read lock and never observe a half-applied create.
//! - A crash between mutation and persist loses that bundle and nothing
//!   else. Blobs referenced by a lost bundle remain in the content store
//!   and are reused by a later create.
//!
//! # Modules
//!
//! - [`codec`] — snapshot serialization (load/save round-trip law)
//! - [`registry`] — the [`BundleRegistry`] itself

pub mod codec;
pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::BundleRegistry;
