//! HTTP access to the idea-generation endpoint.
//!
//! [`HttpIdeaSource`] posts an [`AnalyzeRequest`] as JSON and exposes the
//! response body as an incremental byte stream. HTTP-level failures are
//! mapped into the [`AnalysisError`] taxonomy here, at the boundary, so
//! the read loop never sees transport types.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::model::AnalyzeRequest;
use crate::traits::{AnalysisError, ByteStream, IdeaSource};

/// Error payload shapes the endpoint is known to produce.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

pub struct HttpIdeaSource {
    endpoint: String,
    client: Client,
}

impl HttpIdeaSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    /// Reuse an existing client so connection pools are shared.
    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl IdeaSource for HttpIdeaSource {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<ByteStream, AnalysisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AnalysisError::RateLimited);
        }
        if !status.is_success() {
            let message = extract_error_message(response).await;
            return Err(AnalysisError::Request {
                status: status.as_u16(),
                message,
            });
        }
        debug!(%status, "analysis stream opened");
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AnalysisError::Network(e.to_string())));
        Ok(Box::pin(stream))
    }
}

async fn extract_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
        if let Some(message) = parsed.error.or(parsed.message) {
            return message;
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
