//! HTTP server for stowage.
//!
//! Exposes the bundle store over HTTP: multipart upload (`POST /bundles`),
//! listing (`GET /bundles`), and archive download
//! (`GET /bundles/{id}/download`). The transport layer is a thin wrapper:
//! every operation delegates to [`stowage_sdk::BundleService`], and core
//! failures map to 404 (unknown bundle) or a generic 500.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use router::build_router;
pub use server::StowageServer;
