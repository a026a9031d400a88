use std::sync::Arc;

use stowage_sdk::BundleService;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// The stowage HTTP server.
pub struct StowageServer {
    config: ServerConfig,
}

impl StowageServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the bundle service and build the router (useful for testing).
    pub fn router(&self) -> ServerResult<axum::Router> {
        let service = BundleService::open(&self.config.storage_root)?;
        Ok(build_router(Arc::new(service)))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router()?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("stowage server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
