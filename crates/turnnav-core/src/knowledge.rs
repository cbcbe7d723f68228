//! Knowledge base question answering.
//!
//! Answers are produced in two steps: retrieve the most relevant documents
//! for the question, then ask the completion service to answer from that
//! context alone. The raw answer text is reflowed into sections and the
//! sources are ranked, truncated, and attached as citations.
//!
//! A query never fails outward. Any retrieval or generation error is
//! captured in the result record's `error` field.

use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::llm::{CompletionClient, CompletionError};
use crate::retrieval::{DocumentRetriever, RetrievalError, SourceDocument};

/// Character cap for cited source content.
pub const MAX_SOURCE_CHARS: usize = 200;

/// Number of citations kept per answer.
pub const MAX_SOURCES: usize = 3;

static NUMBERED_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("valid regex"));

/// Errors from the answer pipeline, captured into [`KnowledgeAnswer::error`].
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("document retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("answer generation failed: {0}")]
    Completion(#[from] CompletionError),
}

/// A cited source attached to an answer.
#[derive(Debug, Clone, Serialize)]
pub struct SourceCitation {
    pub content: String,
    pub metadata: SourceMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceMetadata {
    pub location: String,
    pub score: f64,
}

/// Result record for a knowledge query.
#[derive(Debug, Serialize)]
pub struct KnowledgeAnswer {
    pub answer: Option<String>,
    pub source_documents: Vec<SourceCitation>,
    pub error: Option<String>,
}

/// Question answering over retrieved documents.
pub struct KnowledgeService {
    retriever: Arc<dyn DocumentRetriever>,
    completion: Arc<dyn CompletionClient>,
}

impl KnowledgeService {
    pub fn new(
        retriever: Arc<dyn DocumentRetriever>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            retriever,
            completion,
        }
    }

    /// Answer a question, grounding the completion in retrieved documents.
    ///
    /// Errors surface in the returned record, never as an `Err`.
    pub async fn query(&self, question: &str) -> KnowledgeAnswer {
        match self.answer(question).await {
            Ok(answer) => answer,
            Err(err) => {
                error!(error = %err, "knowledge query failed");
                KnowledgeAnswer {
                    answer: None,
                    source_documents: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    async fn answer(&self, question: &str) -> Result<KnowledgeAnswer, KnowledgeError> {
        let documents = self.retriever.retrieve(question).await?;
        debug!(count = documents.len(), "answering from retrieved context");

        let context = documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = build_qa_prompt(&context, question);
        let raw = self.completion.complete(&prompt).await?;

        Ok(KnowledgeAnswer {
            answer: Some(format_answer(&raw)),
            source_documents: format_sources(&documents),
            error: None,
        })
    }
}

fn build_qa_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try \
         to make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}

/// Reflow raw answer text into sections.
///
/// Numbered points, bullets, emphasized lines, and header lines (ending in
/// `:`) each start a section; consecutive plain lines group into the
/// current section unchanged. Emphasis markers are stripped and the line
/// becomes a bullet. The `**` check runs before the single `*` check so
/// emphasized lines are not mistaken for bullets.
pub fn format_answer(text: &str) -> String {
    let mut formatted: Vec<String> = Vec::new();
    let mut section: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if NUMBERED_POINT.is_match(line) {
            formatted.append(&mut section);
            formatted.push(format!("\n{line}"));
        } else if line.starts_with("**") {
            formatted.append(&mut section);
            formatted.push(format!("• {}", line.replace("**", "")));
        } else if line.starts_with('•') || line.starts_with('*') {
            formatted.append(&mut section);
            formatted.push(line.to_owned());
        } else if line.ends_with(':') {
            formatted.append(&mut section);
            formatted.push(format!("\n{line}"));
        } else if !line.is_empty() {
            section.push(line.to_owned());
        }
    }
    formatted.append(&mut section);

    formatted.join("\n")
}

/// Truncate content to `max_chars`, preferring the last sentence boundary.
///
/// Counts characters, not bytes, so multi-byte text is never split inside
/// a character. A period at position zero does not count as a boundary.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_owned();
    }

    let truncated: String = content.chars().take(max_chars).collect();
    match truncated.rfind('.') {
        Some(idx) if idx > 0 => truncated[..=idx].to_owned(),
        _ => truncated + "...",
    }
}

/// Build ranked citations: truncate content, label unnamed sources by
/// their retrieval position, sort by score descending, keep the top 3.
pub fn format_sources(documents: &[SourceDocument]) -> Vec<SourceCitation> {
    let mut citations: Vec<SourceCitation> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| SourceCitation {
            content: truncate_content(&doc.content, MAX_SOURCE_CHARS),
            metadata: SourceMetadata {
                location: doc
                    .location
                    .clone()
                    .unwrap_or_else(|| format!("Source {}", i + 1)),
                score: doc.score,
            },
        })
        .collect();

    citations.sort_by(|a, b| {
        b.metadata
            .score
            .partial_cmp(&a.metadata.score)
            .unwrap_or(Ordering::Equal)
    });
    citations.truncate(MAX_SOURCES);
    citations
}
