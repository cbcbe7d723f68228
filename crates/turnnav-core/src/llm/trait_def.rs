//! The `CompletionClient` trait -- the interface to the generative service.
//!
//! The trait is intentionally object-safe so services can hold an
//! `Arc<dyn CompletionClient>` and tests can swap in scripted doubles.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a completion request.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request never produced a usable HTTP response.
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("completion endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The endpoint answered successfully but with no content.
    #[error("completion response contained no content")]
    Empty,
}

/// Interface for producing a text completion from a prompt.
///
/// Implementors wrap a specific endpoint and translate its response into
/// the raw completion text. Callers treat the text as untrusted model
/// output and interpret it downstream.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Produce a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

// Compile-time assertion: CompletionClient must be object-safe.
// If this line compiles, the trait can be used as `dyn CompletionClient`.
const _: () = {
    fn _assert_object_safe(_: &dyn CompletionClient) {}
};
