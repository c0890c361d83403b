//! Request dispatch for the line-delimited JSON server.

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::cache::AnalysisCache;
use crate::stats::StatsService;
use crate::store::{open_store, RecordStore};
use crate::types::config::{CacheConfig, Config};
use crate::types::requests::DnaRequest;
use crate::types::responses::{HealthReport, Verdict};
use crate::ScanResult;

use super::protocol::{ServerRequest, ServerResponse, NOT_FOUND};
use super::transport::{LineTransport, StdioTransport};

/// Analysis server.
pub struct Server {
    cache: AnalysisCache,
    stats: StatsService,
}

impl Server {
    /// Creates a server over the store selected in `config`.
    pub fn new(config: &Config) -> ScanResult<Self> {
        let store = open_store(&config.store)?;
        tracing::info!(store = store.name(), "Record store opened");
        Ok(Self::with_store(store, &config.cache))
    }

    /// Creates a server over an existing store.
    pub fn with_store(store: Arc<dyn RecordStore>, cache: &CacheConfig) -> Self {
        Self {
            cache: AnalysisCache::new(Arc::clone(&store), cache),
            stats: StatsService::new(store),
        }
    }

    /// The analysis cache.
    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Serves stdin/stdout until EOF.
    pub async fn run(&self) -> ScanResult<()> {
        self.serve(StdioTransport::stdio()).await
    }

    /// Serves `transport` until EOF.
    pub async fn serve<R, W>(&self, mut transport: LineTransport<R, W>) -> ScanResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("mutant-scan server starting...");

        while let Some(line) = transport.read_line().await? {
            let response = self.handle_line(&line).await;
            if let Err(e) = transport.write_response(&response).await {
                tracing::error!(error = %e, "Failed to write response");
            }
        }

        tracing::info!("Client disconnected, server stopped");
        Ok(())
    }

    /// Handles one request line.
    pub async fn handle_line(&self, line: &str) -> ServerResponse {
        match serde_json::from_str::<ServerRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "Unparsable request line");
                ServerResponse::bad_request(None, format!("Invalid JSON request: {}", e))
            }
        }
    }

    /// Dispatches a parsed request.
    pub async fn handle_request(&self, request: ServerRequest) -> ServerResponse {
        tracing::debug!(method = %request.method, "Handling request");

        match request.method.as_str() {
            "mutant" => self.handle_mutant(request).await,
            "stats" => self.handle_stats(request).await,
            "health" => self.handle_health(request),
            other => ServerResponse::error(
                request.id,
                NOT_FOUND,
                "Not Found",
                format!("Unknown method: {}", other),
            ),
        }
    }

    async fn handle_mutant(&self, request: ServerRequest) -> ServerResponse {
        let ServerRequest { id, dna, .. } = request;
        let dna_request = DnaRequest {
            request_id: uuid::Uuid::new_v4().to_string(),
            dna,
        };

        match self.cache.analyze_request(&dna_request).await {
            Ok(Verdict::Invalid(reason)) => ServerResponse::bad_request(id, reason.to_string()),
            Ok(verdict) => ServerResponse::status(id, verdict.status_code()),
            Err(e) => {
                tracing::error!(
                    request_id = %dna_request.request_id,
                    error = %e,
                    "DNA analysis failed"
                );
                ServerResponse::internal_error(id)
            }
        }
    }

    async fn handle_stats(&self, request: ServerRequest) -> ServerResponse {
        match self.stats.get_stats().await {
            Ok(report) => match serde_json::to_value(&report) {
                Ok(body) => ServerResponse::ok(request.id, body),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize stats");
                    ServerResponse::internal_error(request.id)
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stats");
                ServerResponse::internal_error(request.id)
            }
        }
    }

    fn handle_health(&self, request: ServerRequest) -> ServerResponse {
        let health = HealthReport::up();
        ServerResponse::ok(
            request.id,
            json!({ "status": health.status, "timestamp": health.timestamp }),
        )
    }
}
