use std::io::Cursor;
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use stowage_sdk::BundleService;
use stowage_types::{BundleId, BundleSummary};

use crate::error::ApiError;

/// Shared handler state: the bundle service behind an `Arc`.
pub type AppState = Arc<BundleService>;

/// One bundle in the listing response. Field names match the wire format
/// of earlier deployments (`bundle_id`, `num_files`, `total_size`).
#[derive(Debug, Serialize)]
pub struct BundleListEntry {
    pub bundle_id: String,
    pub num_files: usize,
    pub total_size: u64,
    pub created_at: DateTime<Utc>,
}

impl From<BundleSummary> for BundleListEntry {
    fn from(summary: BundleSummary) -> Self {
        Self {
            bundle_id: summary.id.to_string(),
            num_files: summary.file_count,
            total_size: summary.total_size_bytes,
            created_at: summary.created_at,
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": "stowage-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /bundles` — ingest multipart file parts as a new bundle.
pub async fn create_bundle_handler(
    State(service): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut inputs: Vec<(String, Cursor<Vec<u8>>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field
            .file_name()
            .or(field.name())
            .unwrap_or("unnamed")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read part {name:?}: {e}")))?;
        inputs.push((name, Cursor::new(bytes.to_vec())));
    }

    let id = run_blocking(move |svc| svc.create_bundle(inputs), service).await?;
    tracing::info!(bundle = %id, "bundle created via HTTP");
    Ok(Json(json!({ "bundle_id": id.to_string() })))
}

/// `GET /bundles` — list all bundles.
pub async fn list_bundles_handler(State(service): State<AppState>) -> Json<Vec<BundleListEntry>> {
    let entries = service
        .list_bundles()
        .into_iter()
        .map(BundleListEntry::from)
        .collect();
    Json(entries)
}

/// `GET /bundles/{id}/download` — reconstruct a bundle as `<id>.tar.gz`.
///
/// Unknown ids and bundles with no files both map to 404, matching the
/// behavior clients of earlier deployments rely on; the archive layer
/// itself handles empty bundles fine.
pub async fn download_bundle_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let bundle_id = BundleId::from_string(id);
    let id_for_headers = bundle_id.clone();

    let archive = run_blocking(
        move |svc| -> Result<Vec<u8>, ApiError> {
            let bundle = svc.get_bundle(&bundle_id).map_err(ApiError::from)?;
            if bundle.files.is_empty() {
                return Err(ApiError::NotFound);
            }
            svc.download_bundle(&bundle_id).map_err(ApiError::from)
        },
        service,
    )
    .await?;

    let headers = [
        (CONTENT_TYPE, "application/gzip".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{id_for_headers}.tar.gz\""),
        ),
    ];
    Ok((headers, archive).into_response())
}

/// Run a blocking service call off the async runtime.
async fn run_blocking<T, E, F>(f: F, service: AppState) -> Result<T, ApiError>
where
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
    F: FnOnce(&BundleService) -> Result<T, E> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "blocking task panicked");
            ApiError::Internal
        })?
        .map_err(Into::into)
}
