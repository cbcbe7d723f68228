//! Completion client interface for the generative service.
//!
//! Plan generation and knowledge answering both talk to a text-completion
//! endpoint through the [`CompletionClient`] trait. The production
//! implementation is [`HttpCompletionClient`]; tests substitute scripted
//! doubles.

pub mod http;
pub mod trait_def;

// Re-export the primary public API at the module level.
pub use http::HttpCompletionClient;
pub use trait_def::{CompletionClient, CompletionError};
