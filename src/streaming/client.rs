//! Advisory API streaming client
//!
//! Provides the HTTP side of a query:
//! - HTTP/1.1 streaming via reqwest
//! - Endpoint: POST /api/agri/{session_id}
//! - History reset: POST /api/agri/{session_id}/clear
//!
//! The query client only sees the [`QueryTransport`] trait, so tests can
//! script the byte stream without a server.

use crate::errors::{AdvisorError, Result};
use crate::types::Query;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Default advisory API endpoint
pub const DEFAULT_API_BASE: &str = "https://api-agri-agent.aryaorganicfarm.com";

/// Connect timeout (10 seconds)
///
/// There is no overall request timeout; replies stream for as long as the
/// model keeps generating.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response body as a stream of byte chunks
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Source of response streams for the query client
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Send a query for a session and return the response body stream
    async fn open(&self, session_id: &str, query: &Query) -> Result<ByteStream>;
}

/// Advisory API client
#[derive(Debug, Clone)]
pub struct AdvisorHttpClient {
    client: Client,
    base_url: String,
}

impl AdvisorHttpClient {
    /// Create client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_API_BASE, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create client with custom configuration
    pub fn with_config(base_url: &str, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(AdvisorError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query endpoint for a session
    pub fn query_url(&self, session_id: &str) -> String {
        format!("{}/api/agri/{}", self.base_url, session_id)
    }

    /// History reset endpoint for a session
    pub fn clear_url(&self, session_id: &str) -> String {
        format!("{}/clear", self.query_url(session_id))
    }

    /// Ask the server to drop the conversation history of a session
    pub async fn clear_history(&self, session_id: &str) -> Result<()> {
        let url = self.clear_url(session_id);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| AdvisorError::Transport(format!("Failed to send request: {}", e)))?;

        let response = ensure_success(response).await?;

        let body: ClearResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::Transport(format!("Failed to read clear response: {}", e)))?;

        tracing::info!(session_id, status = %body.status, "Server history cleared");
        Ok(())
    }

    /// Check if the advisory API answers
    pub async fn health_check(&self) -> Result<bool> {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => Ok(!response.status().is_server_error()),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                Ok(false)
            }
        }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl QueryTransport for AdvisorHttpClient {
    async fn open(&self, session_id: &str, query: &Query) -> Result<ByteStream> {
        let url = self.query_url(session_id);
        tracing::debug!(%url, "Opening advisory stream");

        // `.json()` sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .await
            .map_err(|e| AdvisorError::Transport(format!("Failed to send request: {}", e)))?;

        let response = ensure_success(response).await?;

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| AdvisorError::Transport(format!("Stream interrupted: {}", e)))
        });

        Ok(stream.boxed())
    }
}

/// Turn a non-success response into an `Api` error carrying the server message
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    // The server reports failures as {"error": "..."}
    let message = serde_json::from_str::<ErrorResponse>(&error_text)
        .map(|e| e.error)
        .unwrap_or(error_text);

    Err(AdvisorError::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct ClearResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}
