use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use thiserror::Error;

use crate::model::AnalyzeRequest;

/// Raw response body chunks as they arrive from the endpoint.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, AnalysisError>> + Send>>;

/// Terminal failures of one analysis session.
///
/// Malformed individual stream lines are not errors; the read loop skips
/// them and waits for more bytes. Everything here ends the session.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("network error: {0}")]
    Network(String),
    #[error("daily idea quota exhausted, try again tomorrow")]
    RateLimited,
    #[error("analysis request failed ({status}): {message}")]
    Request { status: u16, message: String },
    #[error("the photo produced no usable ideas")]
    EmptyResult,
    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),
}

/// Something that can stream an idea-generation response for a request.
///
/// Implementations only open the byte stream; interpreting it is the
/// read loop's job, which keeps the parsing testable without a network.
#[async_trait]
pub trait IdeaSource: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<ByteStream, AnalysisError>;
}
