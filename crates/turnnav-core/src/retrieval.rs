//! Document retrieval interface for knowledge queries.
//!
//! Knowledge answers are grounded in documents fetched from a vector
//! search service. The [`DocumentRetriever`] trait keeps that service
//! swappable; [`HttpRetriever`] talks to a search sidecar over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Number of documents requested per query.
pub const DEFAULT_MAX_RESULTS: usize = 4;

/// A retrieved document with its relevance score.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub score: f64,
}

/// Errors from a retrieval request.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The request never produced a usable HTTP response.
    #[error("retrieval request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("retrieval endpoint returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Interface for fetching documents relevant to a query.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Fetch the documents most relevant to `query`.
    async fn retrieve(&self, query: &str) -> Result<Vec<SourceDocument>, RetrievalError>;
}

// Compile-time assertion: DocumentRetriever must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn DocumentRetriever) {}
};

/// Retriever backed by an HTTP search endpoint.
///
/// Posts `{"query": ..., "max_results": ...}` to the configured URL and
/// expects `{"documents": [{"content", "location", "score"}]}` back.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    http: reqwest::Client,
    url: String,
    max_results: usize,
}

impl HttpRetriever {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Serialize)]
struct RetrievalRequest<'a> {
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct RetrievalResponse {
    documents: Vec<SourceDocument>,
}

#[async_trait]
impl DocumentRetriever for HttpRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<SourceDocument>, RetrievalError> {
        let request = RetrievalRequest {
            query,
            max_results: self.max_results,
        };

        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            return Err(RetrievalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: RetrievalResponse = response.json().await?;
        debug!(count = body.documents.len(), "documents retrieved");
        Ok(body.documents)
    }
}
